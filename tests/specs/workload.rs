// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process specs over the workload and filesystem store together.

use goalrun_core::{DeployConfig, DeploymentStatus};
use goalrun_storage::FsStateStore;
use goalrun_workload::{GoalWorkload, LogOptions, ScriptPipeline, Workload};
use serde_json::Map;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn full_verb_sequence_over_the_fs_store() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(FsStateStore::new(root.path().join("state")));
    let workload =
        GoalWorkload::new(root.path().join("work"), store.clone(), Arc::new(ScriptPipeline));

    let errors = workload.validate_config(&DeployConfig::new(Map::new())).await;
    assert!(errors.is_empty());

    let id = workload.deploy(DeployConfig::new(Map::new())).await.unwrap();

    let mut record = workload.get_status(&id).await.unwrap();
    for _ in 0..200 {
        if record.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        record = workload.get_status(&id).await.unwrap();
    }
    assert_eq!(record.status, DeploymentStatus::Completed);

    let mut rx = workload.get_logs(&id, LogOptions::default()).await.unwrap();
    let mut lines = Vec::new();
    while let Some(line) = rx.recv().await {
        lines.push(line);
    }
    assert!(lines.iter().any(|l| l.contains("Starting deployment")));
    assert!(lines.iter().any(|l| l.contains("Goal achieved!")));

    // Terminal deployments get the no-op report
    let report = workload.cleanup(&id).await.unwrap();
    assert_eq!(report.resources_deleted, 0);

    // A still-running deployment gets real teardown, including the temp
    // goal file written for the default goal
    let id = workload.deploy(DeployConfig::new(Map::new())).await.unwrap();
    let report = workload.cleanup(&id).await.unwrap();
    assert!(report.resources_deleted >= 1, "details: {:?}", report.details);

    let raw = std::fs::read_to_string(
        root.path().join("state/deployments").join(format!("{}.json", id)),
    )
    .unwrap();
    assert!(raw.contains("\"cleaned_up\""));
}
