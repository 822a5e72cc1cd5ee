// SPDX-License-Identifier: GPL-3.0-only

pub mod protocol;
pub mod traits;

pub use protocol::{PersistError, RequestId, StateError, StateErrorKind};
pub use traits::{ConfigPersister, DriveUsage, NeverOpen};
