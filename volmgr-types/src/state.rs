// SPDX-License-Identifier: GPL-3.0-only

//! Liveness states for every layer of the volume hierarchy.
//!
//! Drive and subdisk states are requested by administrators; plex and volume
//! states are always derived from the layer below and are never set directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Liveness of a physical backing extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveState {
    Up,
    #[default]
    Down,
}

impl DriveState {
    pub fn name(self) -> &'static str {
        match self {
            DriveState::Up => "up",
            DriveState::Down => "down",
        }
    }
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for DriveState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(DriveState::Up),
            "down" => Ok(DriveState::Down),
            _ => Err(format!("Invalid drive state: {s}")),
        }
    }
}

/// Liveness of a logical extent carved from a drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubdiskState {
    Up,
    #[default]
    Down,
    /// Present, but contents are not known to be current.
    Stale,
    Initializing,
    Reviving,
}

impl SubdiskState {
    pub const ALL: [SubdiskState; 5] = [
        SubdiskState::Up,
        SubdiskState::Down,
        SubdiskState::Stale,
        SubdiskState::Initializing,
        SubdiskState::Reviving,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SubdiskState::Up => "up",
            SubdiskState::Down => "down",
            SubdiskState::Stale => "stale",
            SubdiskState::Initializing => "initializing",
            SubdiskState::Reviving => "reviving",
        }
    }

    /// Members in these states cannot serve reads for their plex.
    pub fn is_unusable(self) -> bool {
        matches!(
            self,
            SubdiskState::Down | SubdiskState::Stale | SubdiskState::Reviving
        )
    }

    pub fn is_initializing(self) -> bool {
        matches!(self, SubdiskState::Initializing | SubdiskState::Reviving)
    }
}

impl fmt::Display for SubdiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for SubdiskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(SubdiskState::Up),
            "down" => Ok(SubdiskState::Down),
            "stale" => Ok(SubdiskState::Stale),
            "initializing" => Ok(SubdiskState::Initializing),
            "reviving" => Ok(SubdiskState::Reviving),
            _ => Err(format!("Invalid subdisk state: {s}")),
        }
    }
}

/// Derived state of a redundancy group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlexState {
    Up,
    Degraded,
    #[default]
    Down,
}

impl PlexState {
    pub fn name(self) -> &'static str {
        match self {
            PlexState::Up => "up",
            PlexState::Degraded => "degraded",
            PlexState::Down => "down",
        }
    }
}

impl fmt::Display for PlexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for PlexState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(PlexState::Up),
            "degraded" => Ok(PlexState::Degraded),
            "down" => Ok(PlexState::Down),
            _ => Err(format!("Invalid plex state: {s}")),
        }
    }
}

/// Derived state of an exposed volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeState {
    Up,
    #[default]
    Down,
}

impl VolumeState {
    pub fn name(self) -> &'static str {
        match self {
            VolumeState::Up => "up",
            VolumeState::Down => "down",
        }
    }
}

impl fmt::Display for VolumeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for VolumeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(VolumeState::Up),
            "down" => Ok(VolumeState::Down),
            _ => Err(format!("Invalid volume state: {s}")),
        }
    }
}

/// How a plex lays its subdisks out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlexOrganization {
    #[default]
    Concat,
    Striped,
    Raid5,
}

impl PlexOrganization {
    pub fn name(self) -> &'static str {
        match self {
            PlexOrganization::Concat => "concat",
            PlexOrganization::Striped => "striped",
            PlexOrganization::Raid5 => "raid5",
        }
    }

    pub fn is_raid5(self) -> bool {
        self == PlexOrganization::Raid5
    }
}

impl fmt::Display for PlexOrganization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for PlexOrganization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concat" => Ok(PlexOrganization::Concat),
            "striped" => Ok(PlexOrganization::Striped),
            "raid5" => Ok(PlexOrganization::Raid5),
            _ => Err(format!("Invalid plex organization: {s}")),
        }
    }
}
