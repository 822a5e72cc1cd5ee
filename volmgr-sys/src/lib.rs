// SPDX-License-Identifier: GPL-3.0-only

//! System-facing collaborators for the volmgr state engine
//!
//! - Drive usage from the kernel mount table (`/proc/self/mountinfo`)
//! - Loading and atomically saving the configuration graph as TOML
//!
//! The state engine only sees these through the `DriveUsage` and
//! `ConfigPersister` contracts.

pub mod error;
pub mod graph;
pub mod mounts;

pub use error::{Result, SysError};
pub use graph::{TomlFilePersister, load_graph, parse_graph};
pub use mounts::{MountTableUsage, parse_mount_sources};
