// SPDX-License-Identifier: GPL-3.0-only

//! Name-based entry points used by the administrative layer.

use serde::{Deserialize, Serialize};
use volmgr_contracts::{DriveUsage, StateError};
use volmgr_types::{
    DriveState, ObjectKind, ObjectRef, StateFlag, StateFlags, SubdiskState, state_flags,
};

use crate::registry::Configuration;

/// Outcome of a state request that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub object: ObjectRef,
    /// False when the object already was in the requested state.
    pub changed: bool,
    /// The change was applied and the caller asked for it to be saved.
    pub persist_requested: bool,
}

impl StateChange {
    pub fn unchanged(object: ObjectRef) -> Self {
        Self {
            object,
            changed: false,
            persist_requested: false,
        }
    }

    pub fn applied(object: ObjectRef, flags: StateFlags) -> Self {
        Self {
            object,
            changed: true,
            persist_requested: flags.contains(StateFlag::Persist),
        }
    }
}

/// `SetState(objectName, targetState, {force, persist})`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStateRequest {
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub persist: bool,
}

impl SetStateRequest {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            force: false,
            persist: false,
        }
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn persist(mut self) -> Self {
        self.persist = true;
        self
    }

    pub fn flags(&self) -> StateFlags {
        state_flags(self.force, self.persist)
    }
}

impl Configuration {
    /// Resolve, parse and route a state request to the drive or subdisk manager.
    pub fn set_state(
        &mut self,
        request: &SetStateRequest,
        usage: &dyn DriveUsage,
    ) -> Result<StateChange, StateError> {
        let target = request.state.as_str();
        match self.resolve(&request.name)? {
            ObjectRef::Drive(id) => {
                let state = target
                    .parse::<DriveState>()
                    .map_err(|_| StateError::invalid_state(ObjectKind::Drive, target))?;
                self.set_drive_state(id, state, request.flags(), usage)
            }
            ObjectRef::Subdisk(id) => {
                let state = target
                    .parse::<SubdiskState>()
                    .map_err(|_| StateError::invalid_state(ObjectKind::Subdisk, target))?;
                self.set_subdisk_state(id, state, request.flags())
            }
            other => Err(StateError::unsupported(other.kind(), &request.name)),
        }
    }

    /// Toggle the syncing flag of a plex by name.
    pub fn set_syncing(
        &mut self,
        name: &str,
        syncing: bool,
        flags: StateFlags,
    ) -> Result<StateChange, StateError> {
        let object = self.resolve(name)?;
        let ObjectRef::Plex(id) = object else {
            return Err(StateError::unsupported(object.kind(), name));
        };

        match self.set_plex_syncing(id, syncing) {
            Some(true) => Ok(StateChange::applied(object, flags)),
            Some(false) => Ok(StateChange::unchanged(object)),
            None => Err(StateError::not_found(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use volmgr_contracts::{NeverOpen, StateErrorKind};
    use volmgr_types::PlexOrganization;

    use super::*;

    fn config() -> Configuration {
        let mut config = Configuration::new();
        let drive = config.add_drive("d0", "/dev/sdb", DriveState::Up).expect("d0");
        let volume = config.add_volume("vol0").expect("vol0");
        let plex = config
            .add_plex("vol0.p0", PlexOrganization::Striped, Some(volume))
            .expect("plex");
        config
            .add_subdisk("vol0.p0.s0", drive, Some(plex), None)
            .expect("subdisk");
        config
    }

    #[test]
    fn unknown_object_is_reported_first() {
        let mut config = config();
        let error = config
            .set_state(&SetStateRequest::new("ghost", "bogus"), &NeverOpen)
            .expect_err("unknown object");
        assert_eq!(error.kind, StateErrorKind::ObjectNotFound);
    }

    #[test]
    fn target_is_parsed_against_the_object_kind() {
        let mut config = config();

        let error = config
            .set_state(&SetStateRequest::new("d0", "stale"), &NeverOpen)
            .expect_err("drives have no stale state");
        assert_eq!(error.kind, StateErrorKind::InvalidState);

        let error = config
            .set_state(&SetStateRequest::new("vol0.p0.s0", "degraded"), &NeverOpen)
            .expect_err("subdisks have no degraded state");
        assert_eq!(error.kind, StateErrorKind::InvalidState);
    }

    #[test]
    fn derived_objects_cannot_be_targeted() {
        let mut config = config();
        for name in ["vol0", "vol0.p0"] {
            let error = config
                .set_state(&SetStateRequest::new(name, "up"), &NeverOpen)
                .expect_err("derived state");
            assert_eq!(error.kind, StateErrorKind::Unsupported);
        }
    }

    #[test]
    fn persist_is_requested_only_for_applied_changes() {
        let mut config = config();

        let change = config
            .set_state(&SetStateRequest::new("vol0.p0.s0", "up").persist(), &NeverOpen)
            .expect("already up");
        assert!(!change.persist_requested);

        let change = config
            .set_state(
                &SetStateRequest::new("vol0.p0.s0", "down").force().persist(),
                &NeverOpen,
            )
            .expect("forced down");
        assert!(change.changed);
        assert!(change.persist_requested);
    }

    #[test]
    fn syncing_targets_plexes_only() {
        let mut config = config();

        let change = config
            .set_syncing("vol0.p0", true, StateFlags::empty())
            .expect("plex");
        assert!(change.changed);

        let error = config
            .set_syncing("d0", true, StateFlags::empty())
            .expect_err("drive");
        assert_eq!(error.kind, StateErrorKind::Unsupported);
    }
}
