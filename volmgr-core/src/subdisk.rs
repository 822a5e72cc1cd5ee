// SPDX-License-Identifier: GPL-3.0-only

//! Subdisk transition rules.
//!
//! Administrative requests go through [`decide_subdisk_transition`], a pure
//! function of the current state, the target, the drive, the plex placement
//! and the force flag. Drive changes use the unconditional drive-driven rule.

use volmgr_contracts::StateError;
use volmgr_types::{
    DriveState, ObjectRef, PlexOrganization, StateFlag, StateFlags, SubdiskId, SubdiskState,
};

use crate::dispatch::StateChange;
use crate::registry::Configuration;

/// Where a subdisk sits, as far as the transition rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Unattached,
    Plex {
        organization: PlexOrganization,
        /// The plex belongs to a volume that has no other plex.
        sole_plex: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdiskRequest {
    pub current: SubdiskState,
    pub target: SubdiskState,
    pub drive: DriveState,
    pub attachment: Attachment,
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdiskDecision {
    Unchanged,
    Accept,
    Reject(&'static str),
    /// Declined, but the subdisk is still marked stale.
    RejectAsStale,
}

pub fn decide_subdisk_transition(request: SubdiskRequest) -> SubdiskDecision {
    let SubdiskRequest {
        current,
        target,
        drive,
        attachment,
        force,
    } = request;

    if current == target {
        return SubdiskDecision::Unchanged;
    }

    match target {
        SubdiskState::Down => {
            if force || attachment == Attachment::Unattached {
                SubdiskDecision::Accept
            } else {
                SubdiskDecision::Reject("subdisk is part of a plex; use force")
            }
        }
        SubdiskState::Up => {
            if drive != DriveState::Up {
                return SubdiskDecision::Reject("drive is not up");
            }
            match (current, attachment) {
                (SubdiskState::Reviving | SubdiskState::Initializing, _) => SubdiskDecision::Accept,
                (SubdiskState::Down, Attachment::Unattached) => SubdiskDecision::Accept,
                (SubdiskState::Down, Attachment::Plex { organization, .. }) => {
                    if !organization.is_raid5() || force {
                        SubdiskDecision::Accept
                    } else {
                        SubdiskDecision::RejectAsStale
                    }
                }
                (SubdiskState::Stale, Attachment::Unattached) => SubdiskDecision::Accept,
                (SubdiskState::Stale, _) if force => SubdiskDecision::Accept,
                (
                    SubdiskState::Stale,
                    Attachment::Plex {
                        organization,
                        sole_plex: true,
                    },
                ) if !organization.is_raid5() => SubdiskDecision::Accept,
                (SubdiskState::Stale, _) => {
                    SubdiskDecision::Reject("stale subdisk must be revived first")
                }
                (SubdiskState::Up, _) => SubdiskDecision::Unchanged,
            }
        }
        SubdiskState::Stale | SubdiskState::Initializing | SubdiskState::Reviving => {
            if force {
                SubdiskDecision::Accept
            } else {
                SubdiskDecision::Reject("transition requires force")
            }
        }
    }
}

impl Configuration {
    fn attachment(&self, id: SubdiskId) -> Attachment {
        let Some(plex_id) = self.subdisks[id.index()].plex else {
            return Attachment::Unattached;
        };
        let plex = &self.plexes[plex_id.index()];
        let sole_plex = plex
            .volume
            .is_some_and(|volume| self.volumes[volume.index()].plexes.len() == 1);

        Attachment::Plex {
            organization: plex.organization,
            sole_plex,
        }
    }

    /// Apply an administrative state request to a subdisk.
    ///
    /// The owning plex is recomputed whatever the outcome. A rejected up
    /// request on a down raid5 member still leaves the member stale.
    pub fn set_subdisk_state(
        &mut self,
        id: SubdiskId,
        target: SubdiskState,
        flags: StateFlags,
    ) -> Result<StateChange, StateError> {
        let subdisk = self
            .subdisks
            .get(id.index())
            .ok_or_else(|| StateError::not_found(&format!("subdisk #{}", id.index())))?;

        let decision = decide_subdisk_transition(SubdiskRequest {
            current: subdisk.state,
            target,
            drive: self.drives[subdisk.drive.index()].state,
            attachment: self.attachment(id),
            force: flags.contains(StateFlag::Force),
        });
        let plex = subdisk.plex;

        let subdisk = &mut self.subdisks[id.index()];
        let previous = subdisk.state;
        let result = match decision {
            SubdiskDecision::Unchanged => {
                tracing::debug!("Subdisk {} already {target}", subdisk.name);
                return Ok(StateChange::unchanged(ObjectRef::Subdisk(id)));
            }
            SubdiskDecision::Accept => {
                subdisk.state = target;
                if target == SubdiskState::Up {
                    subdisk.newborn = false;
                }
                tracing::info!("Subdisk {} changed from {previous} to {target}", subdisk.name);
                Ok(StateChange::applied(ObjectRef::Subdisk(id), flags))
            }
            SubdiskDecision::Reject(reason) => {
                tracing::warn!("Subdisk {} refused {previous} -> {target}: {reason}", subdisk.name);
                Err(StateError::rejected(format!(
                    "subdisk {}: {previous} -> {target}: {reason}",
                    subdisk.name
                )))
            }
            SubdiskDecision::RejectAsStale => {
                subdisk.state = SubdiskState::Stale;
                tracing::warn!(
                    "Subdisk {} refused {previous} -> {target} on a raid5 plex; marked stale",
                    subdisk.name
                );
                Err(StateError::rejected(format!(
                    "subdisk {}: raid5 member must be revived, marked stale",
                    subdisk.name
                )))
            }
        };

        if let Some(plex) = plex {
            self.recompute_plex(plex);
        }
        result
    }

    /// Re-derive a subdisk after its drive changed. Never rejected.
    pub(crate) fn update_subdisk_from_drive(&mut self, id: SubdiskId) {
        let drive_state = self.drives[self.subdisks[id.index()].drive.index()].state;
        let subdisk = &mut self.subdisks[id.index()];
        let previous = subdisk.state;

        subdisk.state = if drive_state != DriveState::Up {
            SubdiskState::Down
        } else if subdisk.newborn {
            subdisk.newborn = false;
            SubdiskState::Up
        } else if subdisk.state != SubdiskState::Up {
            SubdiskState::Stale
        } else {
            SubdiskState::Up
        };

        if previous != subdisk.state {
            tracing::debug!(
                "Subdisk {} follows its drive: {previous} -> {}",
                subdisk.name,
                subdisk.state
            );
        }

        let plex = subdisk.plex;
        if let Some(plex) = plex {
            self.recompute_plex(plex);
        }
    }
}
