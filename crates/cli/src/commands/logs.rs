// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `goalrun logs`.

use crate::exit_error::from_workload;
use goalrun_core::DeploymentId;
use goalrun_workload::{GoalWorkload, LogOptions, Workload};

pub async fn logs(
    workload: &GoalWorkload,
    id: &DeploymentId,
    follow: bool,
    lines: usize,
) -> anyhow::Result<()> {
    let mut rx =
        workload.get_logs(id, LogOptions { follow, lines }).await.map_err(from_workload)?;

    if !follow {
        while let Some(line) = rx.recv().await {
            println!("{}", line);
        }
        return Ok(());
    }

    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => println!("{}", line),
                None => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
