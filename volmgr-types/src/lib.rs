// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the volmgr state engine
//!
//! The hierarchy is Drive → Subdisk → Plex → Volume:
//!
//! - **Drive**: a physical backing extent
//! - **Subdisk**: a logical extent carved from a drive, optionally placed in a plex
//! - **Plex**: a redundancy group (concat, striped, raid5), one full copy of a volume
//! - **Volume**: the exposed logical device, made of one or more mirrored plexes
//!
//! Drive and subdisk states are requested; plex and volume states are derived.

pub mod config;
pub mod flags;
pub mod object;
pub mod state;
pub mod summary;

pub use config::{ConfigDescription, DriveDesc, PlexDesc, SubdiskDesc, VolumeDesc};
pub use flags::{StateFlag, StateFlags, state_flags};
pub use object::{DriveId, ObjectKind, ObjectRef, PlexId, SubdiskId, VolumeId};
pub use state::{DriveState, PlexOrganization, PlexState, SubdiskState, VolumeState};
pub use summary::{StateSummary, summarize_config};
