// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for state store implementations

use super::*;
use goalrun_core::DeploymentStatus;
use serde_json::Map;

fn record(id: &str) -> DeploymentRecord {
    DeploymentRecord::new(DeploymentId::from(id), "goal-agent", Map::new())
}

#[tokio::test]
async fn fs_store_round_trips_a_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStateStore::new(dir.path());

    let mut rec = record("goal-agent-11111111");
    rec.status = DeploymentStatus::Running;
    rec.set_agent_pid(999);
    store.save(&rec).await.unwrap();

    let loaded = store.load(&rec.deployment_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, DeploymentStatus::Running);
    assert_eq!(loaded.agent_pid(), Some(999));
}

#[tokio::test]
async fn fs_store_load_missing_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStateStore::new(dir.path());

    let loaded = store.load(&DeploymentId::from("goal-agent-missing0")).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn fs_store_save_overwrites_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStateStore::new(dir.path());

    let mut rec = record("goal-agent-22222222");
    store.save(&rec).await.unwrap();
    rec.status = DeploymentStatus::Stopped;
    store.save(&rec).await.unwrap();

    let loaded = store.load(&rec.deployment_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, DeploymentStatus::Stopped);

    // No temp files left behind after the rename
    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("deployments"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn fs_store_lists_ids_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStateStore::new(dir.path());

    store.save(&record("goal-agent-bbbbbbbb")).await.unwrap();
    store.save(&record("goal-agent-aaaaaaaa")).await.unwrap();

    let ids = store.list().await.unwrap();
    assert_eq!(ids, vec![
        DeploymentId::from("goal-agent-aaaaaaaa"),
        DeploymentId::from("goal-agent-bbbbbbbb"),
    ]);
}

#[tokio::test]
async fn fs_store_list_empty_when_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStateStore::new(dir.path().join("never-created"));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_store_round_trips() {
    let store = MemoryStateStore::new();
    let rec = record("goal-agent-33333333");
    store.save(&rec).await.unwrap();

    assert!(store.load(&rec.deployment_id).await.unwrap().is_some());
    assert_eq!(store.list().await.unwrap().len(), 1);
}
