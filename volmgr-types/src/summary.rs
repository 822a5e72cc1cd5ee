// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use crate::config::ConfigDescription;
use crate::state::{DriveState, PlexState, SubdiskState, VolumeState};

/// Aggregate health counters for a configuration graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateSummary {
    pub drive_count: usize,
    pub drives_down: usize,
    pub subdisk_count: usize,
    pub subdisks_stale: usize,
    pub subdisks_down: usize,
    pub plex_count: usize,
    pub plexes_up: usize,
    pub plexes_degraded: usize,
    pub plexes_down: usize,
    pub volume_count: usize,
    pub volumes_up: usize,
    pub volumes_down: usize,
}

impl StateSummary {
    /// True when every volume is up and no plex runs with reduced redundancy.
    pub fn is_healthy(&self) -> bool {
        self.volumes_down == 0 && self.plexes_degraded == 0 && self.plexes_down == 0
    }
}

/// Count states across a described graph.
///
/// Plexes and volumes without a recorded state are counted as down.
pub fn summarize_config(description: &ConfigDescription) -> StateSummary {
    let mut summary = StateSummary {
        drive_count: description.drives.len(),
        subdisk_count: description.subdisks.len(),
        plex_count: description.plexes.len(),
        volume_count: description.volumes.len(),
        ..Default::default()
    };

    summary.drives_down = description
        .drives
        .iter()
        .filter(|drive| drive.state == DriveState::Down)
        .count();

    for subdisk in &description.subdisks {
        match subdisk.state {
            Some(SubdiskState::Stale) => summary.subdisks_stale += 1,
            Some(SubdiskState::Down) | None => summary.subdisks_down += 1,
            Some(_) => {}
        }
    }

    for plex in &description.plexes {
        match plex.state.unwrap_or_default() {
            PlexState::Up => summary.plexes_up += 1,
            PlexState::Degraded => summary.plexes_degraded += 1,
            PlexState::Down => summary.plexes_down += 1,
        }
    }

    for volume in &description.volumes {
        match volume.state.unwrap_or_default() {
            VolumeState::Up => summary.volumes_up += 1,
            VolumeState::Down => summary.volumes_down += 1,
        }
    }

    summary
}
