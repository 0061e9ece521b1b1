// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State store contract and implementations.

use async_trait::async_trait;
use goalrun_core::{DeploymentId, DeploymentRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key-value persistence for deployment records.
///
/// The store is the single source of truth across supervisor restarts and
/// is assumed to serialize concurrent writers for the same deployment id.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn save(&self, record: &DeploymentRecord) -> Result<(), StorageError>;
    async fn load(&self, id: &DeploymentId) -> Result<Option<DeploymentRecord>, StorageError>;
    async fn list(&self) -> Result<Vec<DeploymentId>, StorageError>;
}

/// Filesystem-backed store: `<state_dir>/deployments/<id>.json`.
///
/// Writes go through a temp file and a rename so a crashed writer never
/// leaves a half-written record behind.
pub struct FsStateStore {
    deployments_dir: PathBuf,
}

impl FsStateStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { deployments_dir: state_dir.into().join("deployments") }
    }

    fn record_path(&self, id: &DeploymentId) -> PathBuf {
        self.deployments_dir.join(format!("{}.json", id))
    }
}

#[async_trait]
impl StateStore for FsStateStore {
    async fn save(&self, record: &DeploymentRecord) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.deployments_dir).await?;

        let path = self.record_path(&record.deployment_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(record)?;

        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(deployment_id = %record.deployment_id, status = %record.status, "state saved");
        Ok(())
    }

    async fn load(&self, id: &DeploymentId) -> Result<Option<DeploymentRecord>, StorageError> {
        let path = self.record_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn list(&self) -> Result<Vec<DeploymentId>, StorageError> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.deployments_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) {
                ids.push(DeploymentId::from_string(stem));
            }
        }
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStateStore {
    records: Mutex<HashMap<DeploymentId, DeploymentRecord>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn save(&self, record: &DeploymentRecord) -> Result<(), StorageError> {
        self.records.lock().insert(record.deployment_id.clone(), record.clone());
        Ok(())
    }

    async fn load(&self, id: &DeploymentId) -> Result<Option<DeploymentRecord>, StorageError> {
        Ok(self.records.lock().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<DeploymentId>, StorageError> {
        let mut ids: Vec<_> = self.records.lock().keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
