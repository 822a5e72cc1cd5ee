// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;
use volmgr_contracts::{StateError, StateErrorKind};
use volmgr_types::ObjectKind;

/// Errors raised while building a configuration graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Object name must not be empty")]
    EmptyName,

    #[error("Duplicate object name: {0}")]
    DuplicateName(String),

    #[error("{kind} '{name}' references unknown {target_kind} '{target}'")]
    UnknownReference {
        kind: ObjectKind,
        name: String,
        target_kind: ObjectKind,
        target: String,
    },

    #[error("No room for another {0}")]
    CapacityExceeded(ObjectKind),
}

impl From<ConfigError> for StateError {
    fn from(err: ConfigError) -> Self {
        StateError::new(StateErrorKind::InvalidInput, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
