// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use volmgr_contracts::{ConfigPersister, PersistError};
use volmgr_types::ConfigDescription;

use crate::error::{Result, SysError};

/// Read a configuration graph from a TOML file.
pub fn load_graph(path: &Path) -> Result<ConfigDescription> {
    let raw = fs::read_to_string(path).map_err(|error| SysError::Read {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    parse_graph(&raw, path)
}

pub fn parse_graph(raw: &str, path: &Path) -> Result<ConfigDescription> {
    toml::from_str(raw).map_err(|error| SysError::InvalidConfig {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

/// Saves the graph as TOML, replacing the target file atomically.
#[derive(Debug, Clone)]
pub struct TomlFilePersister {
    path: PathBuf,
}

impl TomlFilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl ConfigPersister for TomlFilePersister {
    async fn persist(&self, description: &ConfigDescription) -> std::result::Result<(), PersistError> {
        let mut description = description.clone();
        description.saved_at = Some(chrono::Utc::now());

        let content = toml::to_string_pretty(&description)
            .map_err(|error| PersistError::Serialize(error.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| self.io_error(error))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|error| self.io_error(error))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|error| self.io_error(error))?;

        tracing::debug!("Wrote configuration to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use volmgr_types::{DriveDesc, DriveState, SubdiskDesc, SubdiskState};

    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("volmgr-{label}-{}", std::process::id()))
    }

    #[test]
    fn invalid_graph_names_the_file() {
        let error = parse_graph("[[drive]]\nname = 3\n", Path::new("/etc/volmgr/graph.toml"))
            .expect_err("bad graph");
        assert!(error.to_string().contains("/etc/volmgr/graph.toml"));
    }

    #[test]
    fn temp_file_sits_next_to_target() {
        let persister = TomlFilePersister::new("/var/lib/volmgr/graph.toml");
        assert_eq!(
            persister.temp_path(),
            PathBuf::from("/var/lib/volmgr/graph.toml.tmp")
        );
    }

    #[tokio::test]
    async fn persist_then_load_roundtrip() {
        let dir = scratch_dir("persist");
        let path = dir.join("nested/graph.toml");
        let persister = TomlFilePersister::new(&path);

        let description = ConfigDescription {
            drives: vec![DriveDesc {
                name: "d0".to_string(),
                device: "/dev/sdb".to_string(),
                state: DriveState::Up,
            }],
            subdisks: vec![SubdiskDesc {
                name: "s0".to_string(),
                drive: "d0".to_string(),
                plex: None,
                state: Some(SubdiskState::Stale),
            }],
            ..Default::default()
        };

        persister.persist(&description).await.expect("persist");
        let loaded = load_graph(&path).expect("load");

        assert!(loaded.saved_at.is_some());
        assert_eq!(loaded.drives, description.drives);
        assert_eq!(loaded.subdisks, description.subdisks);
        assert!(!persister.temp_path().exists());

        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
