// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const SETTINGS_ENV: &str = "VOLMGR_SETTINGS";
const DEFAULT_SETTINGS_PATH: &str = "/etc/volmgr/volmgr.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Configuration graph file, read on start and replaced on persist.
    pub graph_path: PathBuf,
    /// Drives that are always treated as open.
    pub open_drives: Vec<String>,
    /// Consult the kernel mount table when deciding whether a drive is open.
    pub use_mount_table: bool,
    /// Used when RUST_LOG is not set.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from("/etc/volmgr/graph.toml"),
            open_drives: Vec::new(),
            use_mount_table: true,
            log_filter: "volmgr=info,volmgr_core=info,volmgr_sys=info,warn".to_string(),
        }
    }
}

/// Pick the settings file: explicit flag, then the environment, then the
/// system default if it exists.
pub fn settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(value) = std::env::var(SETTINGS_ENV)
        && !value.trim().is_empty()
    {
        return Some(PathBuf::from(value));
    }

    let default = PathBuf::from(DEFAULT_SETTINGS_PATH);
    default.exists().then_some(default)
}

pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    match settings_path(explicit) {
        Some(path) => load_from(&path),
        None => Ok(Settings::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing settings {}", path.display()))
}
