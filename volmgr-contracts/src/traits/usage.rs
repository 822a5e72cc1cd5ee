// SPDX-License-Identifier: GPL-3.0-only

/// Answers whether a drive currently has active consumers.
///
/// Consulted before a drive is taken down without force.
pub trait DriveUsage: Send + Sync {
    fn is_open(&self, name: &str, device: &str) -> bool;
}

/// Usage source for configurations that are not backed by live devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOpen;

impl DriveUsage for NeverOpen {
    fn is_open(&self, _name: &str, _device: &str) -> bool {
        false
    }
}
