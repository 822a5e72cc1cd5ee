// SPDX-License-Identifier: GPL-3.0-only

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use volmgr_contracts::DriveUsage;

use crate::error::{Result, SysError};

const MOUNTINFO_PATH: &str = "/proc/self/mountinfo";

/// Reports a drive open while it, or one of its partitions, is mounted.
#[derive(Debug, Clone)]
pub struct MountTableUsage {
    mountinfo_path: PathBuf,
    always_open: BTreeSet<String>,
    use_mount_table: bool,
}

impl MountTableUsage {
    pub fn new() -> Self {
        Self {
            mountinfo_path: PathBuf::from(MOUNTINFO_PATH),
            always_open: BTreeSet::new(),
            use_mount_table: true,
        }
    }

    /// Drive names that are treated as open regardless of the mount table.
    pub fn with_open_drives(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.always_open.extend(names);
        self
    }

    pub fn with_mount_table(mut self, enabled: bool) -> Self {
        self.use_mount_table = enabled;
        self
    }

    pub fn with_mountinfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mountinfo_path = path.into();
        self
    }

    fn mount_sources(&self) -> Result<Vec<String>> {
        let raw = fs::read_to_string(&self.mountinfo_path).map_err(|error| SysError::Read {
            path: self.mountinfo_path.clone(),
            reason: error.to_string(),
        })?;
        parse_mount_sources(&raw)
    }
}

impl Default for MountTableUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveUsage for MountTableUsage {
    fn is_open(&self, name: &str, device: &str) -> bool {
        if self.always_open.contains(name) {
            return true;
        }
        if !self.use_mount_table {
            return false;
        }

        match self.mount_sources() {
            Ok(sources) => sources.iter().any(|source| is_device_or_partition(device, source)),
            Err(error) => {
                // An unreadable mount table cannot prove the drive idle.
                tracing::warn!("Treating drive {name} as open: {error}");
                true
            }
        }
    }
}

/// Extract the mount source of every mountinfo entry.
pub fn parse_mount_sources(input: &str) -> Result<Vec<String>> {
    let mut sources = Vec::new();

    for line in input.lines().filter(|line| !line.trim().is_empty()) {
        let (_, right) = line
            .split_once(" - ")
            .ok_or_else(|| SysError::InvalidMountInfoLine(line.to_string()))?;

        let mut right_fields = right.split_whitespace();
        let _fs_type = right_fields.next();
        let source = right_fields
            .next()
            .ok_or_else(|| SysError::InvalidMountInfoLine(line.to_string()))?;

        sources.push(source.to_string());
    }

    Ok(sources)
}

/// `/dev/sdb` matches `/dev/sdb` and `/dev/sdb1`; `/dev/nvme0n1` matches `/dev/nvme0n1p2`.
fn is_device_or_partition(device: &str, source: &str) -> bool {
    let Some(suffix) = source.strip_prefix(device) else {
        return false;
    };
    let digits = suffix.strip_prefix('p').unwrap_or(suffix);

    suffix.is_empty()
        || (!digits.is_empty()
            && digits.chars().all(|c| c.is_ascii_digit())
            && (suffix.starts_with('p') == device.ends_with(|c: char| c.is_ascii_digit())))
}
