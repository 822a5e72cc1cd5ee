// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use volmgr_types::ConfigDescription;

use crate::PersistError;

/// Saves the whole configuration graph.
#[async_trait]
pub trait ConfigPersister: Send + Sync {
    async fn persist(&self, description: &ConfigDescription) -> Result<(), PersistError>;
}
