// SPDX-License-Identifier: GPL-3.0-only

//! State-consistency engine for the volume hierarchy
//!
//! Drives and subdisks accept administrative state requests; plexes and
//! volumes derive their state from the layer below. Every accepted change
//! (and the one side-effecting rejection of a down raid5 member) cascades
//! upward inline: subdisk → plex → volume.
//!
//! [`Configuration`] owns the whole graph as an arena addressed by typed IDs.
//! [`StateService`] serializes requests against one configuration and runs
//! the persist action under the same lock.

pub mod dispatch;
mod drive;
pub mod error;
pub mod plex;
pub mod registry;
pub mod service;
pub mod subdisk;
pub mod volume;

pub use dispatch::{SetStateRequest, StateChange};
pub use error::ConfigError;
pub use plex::{PlexDerivation, derive_plex_state};
pub use registry::{Configuration, Drive, Plex, Subdisk, Volume};
pub use service::{SetStateOutcome, StateService};
pub use subdisk::{Attachment, SubdiskDecision, SubdiskRequest, decide_subdisk_transition};
pub use volume::derive_volume_state;
