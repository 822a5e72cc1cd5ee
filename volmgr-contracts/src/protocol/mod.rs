// SPDX-License-Identifier: GPL-3.0-only

pub mod error;
pub mod id;

pub use error::{PersistError, StateError, StateErrorKind};
pub use id::RequestId;
