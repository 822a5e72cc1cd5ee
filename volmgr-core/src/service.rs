// SPDX-License-Identifier: GPL-3.0-only

//! Serialized access to one configuration graph.
//!
//! Every request holds the configuration lock from resolution through the
//! cascade and the persist action, so requests apply in a total order.

use std::sync::Arc;

use tokio::sync::Mutex;
use volmgr_contracts::{ConfigPersister, DriveUsage, RequestId, StateError};
use volmgr_types::{ConfigDescription, StateSummary, state_flags, summarize_config};

use crate::dispatch::{SetStateRequest, StateChange};
use crate::registry::Configuration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetStateOutcome {
    pub request_id: RequestId,
    pub change: StateChange,
    /// Set when the change stands but could not be saved.
    pub persist_warning: Option<String>,
}

pub struct StateService {
    config: Mutex<Configuration>,
    usage: Arc<dyn DriveUsage>,
    persister: Arc<dyn ConfigPersister>,
}

impl StateService {
    pub fn new(
        config: Configuration,
        usage: Arc<dyn DriveUsage>,
        persister: Arc<dyn ConfigPersister>,
    ) -> Self {
        Self {
            config: Mutex::new(config),
            usage,
            persister,
        }
    }

    pub async fn set_state(&self, request: &SetStateRequest) -> Result<SetStateOutcome, StateError> {
        let request_id = RequestId::new();
        tracing::debug!(
            "[{request_id}] set {} to {} (force={}, persist={})",
            request.name,
            request.state,
            request.force,
            request.persist
        );

        let mut config = self.config.lock().await;
        let change = config.set_state(request, self.usage.as_ref()).map_err(|error| {
            tracing::warn!("[{request_id}] {error}");
            error
        })?;

        let persist_warning = self.persist_if_requested(&config, &change, request_id).await;
        Ok(SetStateOutcome {
            request_id,
            change,
            persist_warning,
        })
    }

    pub async fn set_plex_syncing(
        &self,
        name: &str,
        syncing: bool,
        persist: bool,
    ) -> Result<SetStateOutcome, StateError> {
        let request_id = RequestId::new();
        let mut config = self.config.lock().await;
        let change = config.set_syncing(name, syncing, state_flags(false, persist))?;

        let persist_warning = self.persist_if_requested(&config, &change, request_id).await;
        Ok(SetStateOutcome {
            request_id,
            change,
            persist_warning,
        })
    }

    /// Runs under the caller's lock. Failures are reported, never rolled back.
    async fn persist_if_requested(
        &self,
        config: &Configuration,
        change: &StateChange,
        request_id: RequestId,
    ) -> Option<String> {
        if !change.persist_requested {
            return None;
        }

        match self.persister.persist(&config.describe()).await {
            Ok(()) => {
                tracing::info!("[{request_id}] configuration saved");
                None
            }
            Err(error) => {
                tracing::warn!("[{request_id}] failed to save configuration: {error}");
                Some(error.to_string())
            }
        }
    }

    pub async fn describe(&self) -> ConfigDescription {
        self.config.lock().await.describe()
    }

    pub async fn summary(&self) -> StateSummary {
        summarize_config(&self.describe().await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use volmgr_contracts::{NeverOpen, PersistError, StateErrorKind};
    use volmgr_types::{DriveState, PlexOrganization, PlexState, SubdiskState, VolumeState};

    use super::*;

    #[derive(Default)]
    struct RecordingPersister {
        saved: StdMutex<Vec<ConfigDescription>>,
        fail: bool,
    }

    impl RecordingPersister {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn saved(&self) -> Vec<ConfigDescription> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConfigPersister for RecordingPersister {
        async fn persist(&self, description: &ConfigDescription) -> Result<(), PersistError> {
            self.saved.lock().unwrap().push(description.clone());
            if self.fail {
                return Err(PersistError::Io {
                    path: "/nonexistent/volmgr.conf".to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                });
            }
            Ok(())
        }
    }

    fn service(persister: Arc<RecordingPersister>) -> StateService {
        let mut config = Configuration::new();
        let drive = config.add_drive("d0", "/dev/sdb", DriveState::Up).expect("d0");
        let volume = config.add_volume("vol0").expect("vol0");
        let plex = config
            .add_plex("vol0.p0", PlexOrganization::Concat, Some(volume))
            .expect("plex");
        config
            .add_subdisk("vol0.p0.s0", drive, Some(plex), None)
            .expect("subdisk");

        StateService::new(config, Arc::new(NeverOpen), persister)
    }

    #[tokio::test]
    async fn persists_whole_graph_after_applied_change() {
        let persister = Arc::new(RecordingPersister::default());
        let service = service(persister.clone());

        let outcome = service
            .set_state(&SetStateRequest::new("d0", "down").persist())
            .await
            .expect("drive down");

        assert!(outcome.change.changed);
        assert_eq!(outcome.persist_warning, None);
        let saved = persister.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].subdisks[0].state, Some(SubdiskState::Down));
        assert_eq!(service.summary().await.volumes_down, 1);
    }

    #[tokio::test]
    async fn persist_failure_is_a_warning() {
        let persister = Arc::new(RecordingPersister::failing());
        let service = service(persister.clone());

        let outcome = service
            .set_state(&SetStateRequest::new("vol0.p0.s0", "down").force().persist())
            .await
            .expect("state change stands");

        assert!(outcome.persist_warning.is_some());
        let description = service.describe().await;
        assert_eq!(description.subdisks[0].state, Some(SubdiskState::Down));
    }

    #[tokio::test]
    async fn rejected_requests_are_not_persisted() {
        let persister = Arc::new(RecordingPersister::default());
        let service = service(persister.clone());

        let error = service
            .set_state(&SetStateRequest::new("vol0.p0.s0", "down").persist())
            .await
            .expect_err("attached subdisk without force");

        assert_eq!(error.kind, StateErrorKind::TransitionRejected);
        assert!(persister.saved().is_empty());
    }

    /// The single-mirror graph from `service()` agrees with itself.
    fn assert_consistent(description: &ConfigDescription) {
        let subdisk = description.subdisks[0].state;
        let plex = description.plexes[0].state;
        match description.drives[0].state {
            DriveState::Down => assert_eq!(subdisk, Some(SubdiskState::Down)),
            DriveState::Up => assert!(matches!(
                subdisk,
                Some(SubdiskState::Up) | Some(SubdiskState::Stale)
            )),
        }
        assert_eq!(plex == Some(PlexState::Up), subdisk == Some(SubdiskState::Up));
        assert_eq!(
            description.volumes[0].state == Some(VolumeState::Up),
            plex == Some(PlexState::Up)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn interleaved_requests_persist_consistent_snapshots() {
        let persister = Arc::new(RecordingPersister::default());
        let service = Arc::new(service(persister.clone()));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                let state = if i % 2 == 0 { "down" } else { "up" };
                tokio::spawn(async move {
                    service
                        .set_state(&SetStateRequest::new("d0", state).persist())
                        .await
                })
            })
            .collect();

        let mut applied = 0;
        for task in tasks {
            let outcome = task.await.expect("join").expect("drive request");
            if outcome.change.changed {
                applied += 1;
            }
        }

        let saved = persister.saved();
        assert!(applied >= 1);
        assert_eq!(saved.len(), applied);
        for snapshot in &saved {
            assert_consistent(snapshot);
        }
        assert_consistent(&service.describe().await);
    }
}
