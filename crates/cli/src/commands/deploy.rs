// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `goalrun deploy` and `goalrun validate`.

use crate::exit_error::{from_workload, ExitError, EXIT_VALIDATION};
use anyhow::bail;
use goalrun_core::DeployConfig;
use goalrun_workload::{GoalWorkload, Workload};
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;

#[derive(Debug, Default, clap::Args)]
pub struct ConfigArgs {
    /// Path to a markdown or text goal file; omitted means the built-in
    /// default goal
    #[arg(long)]
    pub goal_file: Option<String>,

    /// Target SDK: claude, copilot, microsoft, mini
    #[arg(long)]
    pub sdk: Option<String>,

    /// Agent turn budget (1-100)
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Give the generated agent persistent memory
    #[arg(long)]
    pub enable_memory: bool,

    /// Raw JSON config object; the flags above override its keys
    #[arg(long)]
    pub config: Option<String>,
}

impl ConfigArgs {
    /// Merge `--config` JSON with the individual flags into one mapping.
    pub fn to_config(&self) -> anyhow::Result<DeployConfig> {
        let mut map = match &self.config {
            Some(raw) => match serde_json::from_str::<Value>(raw)? {
                Value::Object(map) => map,
                other => bail!("--config must be a JSON object (got {})", other),
            },
            None => Map::new(),
        };

        if let Some(goal_file) = &self.goal_file {
            map.insert("goal_file".to_string(), Value::from(goal_file.as_str()));
        }
        if let Some(sdk) = &self.sdk {
            map.insert("sdk".to_string(), Value::from(sdk.as_str()));
        }
        if let Some(max_turns) = self.max_turns {
            map.insert("max_turns".to_string(), Value::from(max_turns));
        }
        if self.enable_memory {
            map.insert("enable_memory".to_string(), Value::from(true));
        }

        Ok(DeployConfig::new(map))
    }
}

/// Deploy a new agent; prints the deployment id on success.
pub async fn deploy(workload: &GoalWorkload, args: &ConfigArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;
    let id = workload.deploy(config).await.map_err(from_workload)?;
    println!("{}", id);
    Ok(())
}

/// Check a configuration without deploying anything.
pub async fn validate(workload: &GoalWorkload, args: &ConfigArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;
    let errors = workload.validate_config(&config).await;
    if errors.is_empty() {
        println!("Configuration is valid");
        return Ok(());
    }
    for error in &errors {
        eprintln!("{}", error);
    }
    Err(ExitError::new(EXIT_VALIDATION, format!("{} validation error(s)", errors.len())).into())
}
