// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Write;

use volmgr_types::{ConfigDescription, StateSummary};

fn state_or_unknown<T: std::fmt::Display>(state: Option<T>) -> String {
    state.map_or_else(|| "-".to_string(), |state| state.to_string())
}

/// One line per object, drives first.
pub fn render_list(description: &ConfigDescription) -> String {
    let mut out = String::new();

    for drive in &description.drives {
        let _ = writeln!(
            out,
            "D {:<24} State: {:<12} Device: {}",
            drive.name, drive.state, drive.device
        );
    }

    for volume in &description.volumes {
        let plexes = description
            .plexes
            .iter()
            .filter(|plex| plex.volume.as_deref() == Some(volume.name.as_str()))
            .count();
        let _ = writeln!(
            out,
            "V {:<24} State: {:<12} Plexes: {plexes}",
            volume.name,
            state_or_unknown(volume.state)
        );
    }

    for plex in &description.plexes {
        let members = description
            .subdisks
            .iter()
            .filter(|subdisk| subdisk.plex.as_deref() == Some(plex.name.as_str()))
            .count();
        let syncing = if plex.syncing { " syncing" } else { "" };
        let _ = writeln!(
            out,
            "P {:<24} State: {:<12} Org: {:<8} Subdisks: {members}{syncing}",
            plex.name,
            state_or_unknown(plex.state),
            plex.organization
        );
    }

    for subdisk in &description.subdisks {
        let _ = writeln!(
            out,
            "S {:<24} State: {:<12} Drive: {}",
            subdisk.name,
            state_or_unknown(subdisk.state),
            subdisk.drive
        );
    }

    out
}

pub fn render_summary(summary: &StateSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} drives ({} down)",
        summary.drive_count, summary.drives_down
    );
    let _ = writeln!(
        out,
        "{} subdisks ({} down, {} stale)",
        summary.subdisk_count, summary.subdisks_down, summary.subdisks_stale
    );
    let _ = writeln!(
        out,
        "{} plexes ({} up, {} degraded, {} down)",
        summary.plex_count, summary.plexes_up, summary.plexes_degraded, summary.plexes_down
    );
    let _ = writeln!(
        out,
        "{} volumes ({} up, {} down)",
        summary.volume_count, summary.volumes_up, summary.volumes_down
    );
    let _ = writeln!(
        out,
        "health: {}",
        if summary.is_healthy() { "ok" } else { "attention" }
    );
    out
}

#[cfg(test)]
mod tests {
    use volmgr_types::{
        DriveDesc, DriveState, PlexDesc, PlexOrganization, PlexState, SubdiskDesc, SubdiskState,
        VolumeDesc, VolumeState,
    };

    use super::*;

    #[test]
    fn lists_every_object_with_its_state() {
        let description = ConfigDescription {
            saved_at: None,
            drives: vec![DriveDesc {
                name: "d0".to_string(),
                device: "/dev/sdb".to_string(),
                state: DriveState::Up,
            }],
            volumes: vec![VolumeDesc {
                name: "vol0".to_string(),
                state: Some(VolumeState::Up),
            }],
            plexes: vec![PlexDesc {
                name: "vol0.p0".to_string(),
                organization: PlexOrganization::Raid5,
                volume: Some("vol0".to_string()),
                syncing: true,
                state: Some(PlexState::Degraded),
            }],
            subdisks: vec![SubdiskDesc {
                name: "vol0.p0.s0".to_string(),
                drive: "d0".to_string(),
                plex: Some("vol0.p0".to_string()),
                state: Some(SubdiskState::Stale),
            }],
        };

        let rendered = render_list(&description);
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("D d0"));
        assert!(lines[1].contains("Plexes: 1"));
        assert!(lines[2].contains("degraded"));
        assert!(lines[2].ends_with("Subdisks: 1 syncing"));
        assert!(lines[3].contains("stale"));
    }

    #[test]
    fn summary_flags_attention() {
        let summary = StateSummary {
            volume_count: 1,
            volumes_down: 1,
            ..Default::default()
        };
        assert!(render_summary(&summary).ends_with("health: attention\n"));
        assert!(render_summary(&StateSummary::default()).ends_with("health: ok\n"));
    }
}
