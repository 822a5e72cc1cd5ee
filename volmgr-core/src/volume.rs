// SPDX-License-Identifier: GPL-3.0-only

use volmgr_types::{PlexOrganization, PlexState, VolumeId, VolumeState};

use crate::registry::Configuration;

/// A volume is up while any plex can serve the whole address space.
pub fn derive_volume_state(
    plexes: impl IntoIterator<Item = (PlexOrganization, PlexState)>,
) -> VolumeState {
    let serving = plexes.into_iter().any(|(organization, state)| {
        state == PlexState::Up || (organization.is_raid5() && state == PlexState::Degraded)
    });

    if serving {
        VolumeState::Up
    } else {
        VolumeState::Down
    }
}

impl Configuration {
    /// Recompute a volume from its plexes. Returns `None` for an unknown ID.
    pub fn recompute_volume(&mut self, id: VolumeId) -> Option<VolumeState> {
        let volume = self.volumes.get(id.index())?;
        let derived = derive_volume_state(volume.plexes.iter().map(|plex| {
            let plex = &self.plexes[plex.index()];
            (plex.organization, plex.state)
        }));

        let volume = &mut self.volumes[id.index()];
        if volume.state != derived {
            tracing::info!("Volume {} is now {derived}", volume.name);
            volume.state = derived;
        }
        Some(derived)
    }
}
