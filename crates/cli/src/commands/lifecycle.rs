// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `goalrun stop`, `goalrun start`, and `goalrun cleanup`.

use crate::exit_error::{from_workload, ExitError};
use crate::output::{self, OutputFormat};
use goalrun_core::DeploymentId;
use goalrun_workload::{GoalWorkload, Workload};

pub async fn stop(workload: &GoalWorkload, id: &DeploymentId) -> anyhow::Result<()> {
    let stopped = workload.stop(id).await.map_err(from_workload)?;
    if !stopped {
        return Err(ExitError::new(
            1,
            format!("deployment {} cannot be stopped from its current state", id),
        )
        .into());
    }
    println!("Stopped {}", id);
    Ok(())
}

pub async fn start(workload: &GoalWorkload, id: &DeploymentId) -> anyhow::Result<()> {
    // Always refused for this workload; surfaces the redeploy guidance.
    workload.start(id).await.map_err(from_workload)?;
    println!("Started {}", id);
    Ok(())
}

pub async fn cleanup(
    workload: &GoalWorkload,
    id: &DeploymentId,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = workload.cleanup(id).await.map_err(from_workload)?;
    output::print_cleanup_report(&report, format)
}
