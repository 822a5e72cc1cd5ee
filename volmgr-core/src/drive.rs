// SPDX-License-Identifier: GPL-3.0-only

use volmgr_contracts::{DriveUsage, StateError};
use volmgr_types::{DriveId, DriveState, ObjectRef, StateFlag, StateFlags};

use crate::dispatch::StateChange;
use crate::registry::Configuration;

impl Configuration {
    /// Apply an administrative state request to a drive.
    ///
    /// Taking an open drive down requires force. Every subdisk on the drive
    /// is then re-derived, which cascades to plexes and volumes.
    pub fn set_drive_state(
        &mut self,
        id: DriveId,
        target: DriveState,
        flags: StateFlags,
        usage: &dyn DriveUsage,
    ) -> Result<StateChange, StateError> {
        let drive = self
            .drives
            .get_mut(id.index())
            .ok_or_else(|| StateError::not_found(&format!("drive #{}", id.index())))?;

        if drive.state == target {
            tracing::debug!("Drive {} already {target}", drive.name);
            return Ok(StateChange::unchanged(ObjectRef::Drive(id)));
        }

        if target == DriveState::Down
            && !flags.contains(StateFlag::Force)
            && usage.is_open(&drive.name, &drive.device)
        {
            tracing::warn!("Drive {} is open; refusing to take it down", drive.name);
            return Err(StateError::rejected(format!(
                "drive {} is open; use force",
                drive.name
            )));
        }

        let previous = std::mem::replace(&mut drive.state, target);
        tracing::info!(
            "Drive {} changed from {previous} to {target}; updating {} subdisks",
            drive.name,
            drive.subdisks.len()
        );

        let subdisks = drive.subdisks.clone();
        for subdisk in subdisks {
            self.update_subdisk_from_drive(subdisk);
        }

        Ok(StateChange::applied(ObjectRef::Drive(id), flags))
    }
}
