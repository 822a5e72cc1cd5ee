// SPDX-License-Identifier: GPL-3.0-only

//! Plex state derivation.

use volmgr_types::{PlexId, PlexOrganization, PlexState, SubdiskState};

use crate::registry::Configuration;

/// Result of deriving a plex state from its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlexDerivation {
    pub state: PlexState,
    pub down_count: usize,
}

/// Derive a plex state from the states of its subdisks.
///
/// A plex without members is down: an empty state set is not "all up".
pub fn derive_plex_state(
    organization: PlexOrganization,
    syncing: bool,
    members: impl IntoIterator<Item = SubdiskState>,
) -> PlexDerivation {
    let mut total = 0;
    let mut up = 0;
    let mut down_count = 0;
    let mut initializing = false;

    for state in members {
        total += 1;
        if state == SubdiskState::Up {
            up += 1;
        }
        if state.is_unusable() {
            down_count += 1;
        }
        if state.is_initializing() {
            initializing = true;
        }
    }

    let state = if total > 0 && up == total {
        PlexState::Up
    } else if down_count >= 1 {
        if organization.is_raid5() && down_count == 1 {
            PlexState::Degraded
        } else {
            PlexState::Down
        }
    } else if initializing && syncing {
        PlexState::Degraded
    } else {
        PlexState::Down
    };

    PlexDerivation { state, down_count }
}

impl Configuration {
    /// Recompute a plex from its members, cascading to its volume on change.
    ///
    /// Returns `None` for an unknown ID.
    pub fn recompute_plex(&mut self, id: PlexId) -> Option<PlexState> {
        let plex = self.plexes.get(id.index())?;
        let derived = derive_plex_state(
            plex.organization,
            plex.syncing,
            plex.subdisks
                .iter()
                .map(|subdisk| self.subdisks[subdisk.index()].state),
        );

        let plex = &mut self.plexes[id.index()];
        plex.down_count = derived.down_count;
        let previous = std::mem::replace(&mut plex.state, derived.state);
        let volume = plex.volume;

        if previous != derived.state {
            tracing::debug!(
                "Plex {} changed from {previous} to {} ({} members down)",
                plex.name,
                derived.state,
                derived.down_count
            );
            if let Some(volume) = volume {
                self.recompute_volume(volume);
            }
        }

        Some(derived.state)
    }

    /// Set the externally managed syncing flag and recompute the plex.
    ///
    /// Returns whether the flag changed, or `None` for an unknown ID.
    pub fn set_plex_syncing(&mut self, id: PlexId, syncing: bool) -> Option<bool> {
        let plex = self.plexes.get_mut(id.index())?;
        if plex.syncing == syncing {
            return Some(false);
        }
        plex.syncing = syncing;
        tracing::info!("Plex {} syncing set to {syncing}", plex.name);

        self.recompute_plex(id);
        Some(true)
    }
}
