// SPDX-License-Identifier: GPL-3.0-only

pub mod persist;
pub mod usage;

pub use persist::ConfigPersister;
pub use usage::{DriveUsage, NeverOpen};
