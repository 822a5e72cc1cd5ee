// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};
use thiserror::Error;
use volmgr_types::ObjectKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateErrorKind {
    /// The requested state name does not exist for the object kind.
    InvalidState,
    ObjectNotFound,
    /// The transition table declined the request.
    TransitionRejected,
    /// Plex and volume states are derived and cannot be requested.
    Unsupported,
    InvalidInput,
}

impl StateErrorKind {
    pub fn code(self) -> u16 {
        match self {
            Self::InvalidState => 400,
            Self::InvalidInput => 422,
            Self::ObjectNotFound => 404,
            Self::TransitionRejected => 409,
            Self::Unsupported => 501,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct StateError {
    pub kind: StateErrorKind,
    pub message: String,
}

impl StateError {
    pub fn new(kind: StateErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_state(kind: ObjectKind, state: &str) -> Self {
        Self::new(
            StateErrorKind::InvalidState,
            format!("'{state}' is not a {kind} state"),
        )
    }

    pub fn not_found(name: &str) -> Self {
        Self::new(StateErrorKind::ObjectNotFound, format!("no object named '{name}'"))
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(StateErrorKind::TransitionRejected, message)
    }

    pub fn unsupported(kind: ObjectKind, name: &str) -> Self {
        Self::new(
            StateErrorKind::Unsupported,
            format!("{kind} '{name}' has a derived state and cannot be set"),
        )
    }
}

/// Failure of the persist action. Never affects the in-memory state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_error_roundtrips() {
        let error = StateError::rejected("drive d0 is open");
        let json = serde_json::to_string(&error).expect("serialize error");
        let parsed: StateError = serde_json::from_str(&json).expect("deserialize error");
        assert_eq!(parsed, error);
        assert_eq!(parsed.kind.code(), 409);
    }

    #[test]
    fn constructors_pick_the_matching_kind() {
        assert_eq!(
            StateError::invalid_state(ObjectKind::Drive, "stale").kind,
            StateErrorKind::InvalidState
        );
        assert_eq!(StateError::not_found("x").kind.code(), 404);
        assert_eq!(
            StateError::unsupported(ObjectKind::Plex, "p0").message,
            "plex 'p0' has a derived state and cannot be set"
        );
    }
}
