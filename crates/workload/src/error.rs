// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload error taxonomy.
//!
//! Input and launch problems fail fast toward the caller; process outcomes
//! (nonzero exits, vanished pids) are never raised — they become `Failed`
//! state observed through `get_status`.

use crate::pipeline::PipelineError;
use goalrun_core::DeploymentId;
use goalrun_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Bad caller input (goal path, sdk, max_turns, enable_memory).
    /// Multiple violations are joined into one message.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation referenced an unknown deployment id.
    #[error("deployment {0} not found")]
    NotFound(DeploymentId),

    /// The generated bundle could not be started (entry point missing, or
    /// the OS spawn call failed). Nothing is persisted as running.
    #[error("launch error: {0}")]
    Launch(String),

    /// Opaque failure from the external generation pipeline, propagated
    /// unchanged.
    #[error(transparent)]
    Generation(#[from] PipelineError),

    /// A stopped detached process cannot be resumed; redeploy instead.
    #[error("cannot resume a stopped deployment; redeploy as a new instance")]
    ResumeUnsupported,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
