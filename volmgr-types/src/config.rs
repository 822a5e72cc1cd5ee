// SPDX-License-Identifier: GPL-3.0-only

//! Serializable description of a whole configuration graph.
//!
//! Objects reference each other by name. This is the form the graph is loaded
//! from and handed to the persist action; the in-memory arena is rebuilt from
//! it and derived plex/volume states are recomputed on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{DriveState, PlexOrganization, PlexState, SubdiskState, VolumeState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigDescription {
    /// Set by the persister when the graph is written out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    #[serde(default, rename = "drive", skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<DriveDesc>,

    #[serde(default, rename = "volume", skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeDesc>,

    #[serde(default, rename = "plex", skip_serializing_if = "Vec::is_empty")]
    pub plexes: Vec<PlexDesc>,

    /// Subdisk order within a plex follows the order of this list.
    #[serde(default, rename = "subdisk", skip_serializing_if = "Vec::is_empty")]
    pub subdisks: Vec<SubdiskDesc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveDesc {
    pub name: String,

    /// Backing device path (e.g. "/dev/sdb")
    pub device: String,

    #[serde(default)]
    pub state: DriveState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDesc {
    pub name: String,

    /// Written for display only; recomputed on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<VolumeState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlexDesc {
    pub name: String,

    #[serde(default)]
    pub organization: PlexOrganization,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    #[serde(default)]
    pub syncing: bool,

    /// Written for display only; recomputed on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PlexState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdiskDesc {
    pub name: String,

    pub drive: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plex: Option<String>,

    /// Absent for a freshly defined subdisk; its state then follows its drive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SubdiskState>,
}
