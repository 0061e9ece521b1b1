// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `goalrun status` and `goalrun list`.

use crate::exit_error::from_workload;
use crate::output::{self, OutputFormat};
use goalrun_core::DeploymentId;
use goalrun_storage::StateStore;
use goalrun_workload::{GoalWorkload, Workload};

/// Reconcile and show one deployment.
pub async fn status(
    workload: &GoalWorkload,
    id: &DeploymentId,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let record = workload.get_status(id).await.map_err(from_workload)?;
    output::print_record(&record, format)
}

/// List every known deployment, reconciling each on the way.
pub async fn list(
    workload: &GoalWorkload,
    store: &dyn StateStore,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let ids = store.list().await?;

    let mut records = Vec::with_capacity(ids.len());
    for id in &ids {
        records.push(workload.get_status(id).await.map_err(from_workload)?);
    }

    match format {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No deployments");
                return Ok(());
            }
            println!("{}", output::list_header());
            for record in &records {
                println!("{}", output::format_list_row(record));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}
