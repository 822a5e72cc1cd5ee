// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use thiserror::Error;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("Failed to read {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Invalid configuration in {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Invalid mountinfo line: {0}")]
    InvalidMountInfoLine(String),
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
