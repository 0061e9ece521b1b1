// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment record and status machine.
//!
//! A [`DeploymentRecord`] is the durable representation of one launched
//! agent. It is the only state guaranteed to survive a supervisor restart,
//! so everything needed to re-derive liveness (the child's OS pid and the
//! generation output directory) lives in its metadata mapping.

use crate::id::DeploymentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;

/// Metadata key: first heading line of the goal file.
pub const META_GOAL_SUMMARY: &str = "goal_summary";
/// Metadata key: SDK the agent was generated for.
pub const META_SDK: &str = "sdk";
/// Metadata key: directory the generation pipeline materialized into.
pub const META_GENERATION_OUTPUT_DIR: &str = "generation_output_dir";
/// Metadata key: turn budget passed to the agent.
pub const META_MAX_TURNS: &str = "max_turns";
/// Metadata key: OS pid of the detached child. Written once at launch,
/// removed only by cleanup. This is the durable stand-in for the in-memory
/// process handle after a supervisor restart.
pub const META_AGENT_PID: &str = "agent_pid";
/// Alias key added to `get_status` responses for callers that predate the
/// `generation_output_dir` name.
pub const META_AGENT_DIR_ALIAS: &str = "agent_dir";

/// Lifecycle status of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Accepted but not yet launched
    Pending,
    /// Detached agent process launched
    Running,
    /// Stopped by request; not resumable
    Stopped,
    /// Cleanup in progress (transient)
    CleaningUp,
    /// Agent finished successfully, or deployment was cleaned up
    Completed,
    /// Agent exited nonzero, vanished without evidence of success, or
    /// never launched
    Failed,
}

impl DeploymentStatus {
    /// Terminal statuses are absorbing: no operation moves a record out of
    /// them except a brand-new deploy producing a new record.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentStatus::Completed | DeploymentStatus::Failed)
    }

    /// Statuses from which `stop` is accepted.
    pub fn is_stoppable(&self) -> bool {
        matches!(self, DeploymentStatus::Running | DeploymentStatus::Pending)
    }
}

crate::simple_display! {
    DeploymentStatus {
        Pending => "pending",
        Running => "running",
        Stopped => "stopped",
        CleaningUp => "cleaning_up",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Durable state for one deployment, keyed by [`DeploymentId`] in the
/// host platform's state store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployment_id: DeploymentId,
    pub workload_name: String,
    pub status: DeploymentStatus,
    /// Human-readable sub-state label ("executing", "cleaned_up", ...).
    /// Informational only; never consulted by transition logic.
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Caller-supplied configuration, immutable once set.
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Mutable metadata; the sole channel by which liveness information
    /// survives a supervisor restart.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Failure description, set only when status becomes `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeploymentRecord {
    pub fn new(
        deployment_id: DeploymentId,
        workload_name: impl Into<String>,
        config: Map<String, Value>,
    ) -> Self {
        Self {
            deployment_id,
            workload_name: workload_name.into(),
            status: DeploymentStatus::Pending,
            phase: "pending".to_string(),
            started_at: None,
            stopped_at: None,
            completed_at: None,
            config,
            metadata: Map::new(),
            error: None,
        }
    }

    /// OS pid of the detached child, if one was launched.
    pub fn agent_pid(&self) -> Option<i32> {
        self.metadata
            .get(META_AGENT_PID)
            .and_then(Value::as_i64)
            .and_then(|pid| i32::try_from(pid).ok())
    }

    pub fn set_agent_pid(&mut self, pid: i32) {
        self.metadata.insert(META_AGENT_PID.to_string(), Value::from(pid));
    }

    /// Directory the generation pipeline wrote the agent bundle into.
    pub fn generation_output_dir(&self) -> Option<PathBuf> {
        self.metadata
            .get(META_GENERATION_OUTPUT_DIR)
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }

    pub fn set_generation_output_dir(&mut self, dir: &std::path::Path) {
        self.metadata.insert(
            META_GENERATION_OUTPUT_DIR.to_string(),
            Value::from(dir.display().to_string()),
        );
    }

    /// Record a transition into a terminal status, stamping `completed_at`.
    pub fn finish(&mut self, status: DeploymentStatus, phase: &str, error: Option<String>) {
        self.status = status;
        self.phase = phase.to_string();
        self.completed_at = Some(Utc::now());
        if status == DeploymentStatus::Failed {
            self.error = error;
        }
    }
}

/// Summary returned by the `cleanup` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    pub deployment_id: DeploymentId,
    pub resources_deleted: u32,
    pub details: Vec<String>,
    #[serde(default)]
    pub duration: Duration,
}

impl CleanupReport {
    /// Report for a deployment already in a terminal state: nothing deleted.
    pub fn already_terminal(deployment_id: DeploymentId, status: DeploymentStatus) -> Self {
        Self {
            deployment_id,
            resources_deleted: 0,
            details: vec![format!("Already in {} state", status)],
            duration: Duration::ZERO,
        }
    }
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
