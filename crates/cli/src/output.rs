// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting shared across commands.

use clap::ValueEnum;
use goalrun_core::{CleanupReport, DeploymentRecord, META_GOAL_SUMMARY};
use serde_json::Value;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render one deployment record as a multi-line text block.
pub fn format_record(record: &DeploymentRecord) -> String {
    let mut out = format!(
        "{}  {}  ({})",
        record.deployment_id, record.status, record.phase
    );
    if let Some(summary) = record.metadata.get(META_GOAL_SUMMARY).and_then(Value::as_str) {
        out.push_str(&format!("\n  goal:      {}", summary));
    }
    if let Some(pid) = record.agent_pid() {
        out.push_str(&format!("\n  pid:       {}", pid));
    }
    if let Some(dir) = record.generation_output_dir() {
        out.push_str(&format!("\n  agent dir: {}", dir.display()));
    }
    if let Some(started) = record.started_at {
        out.push_str(&format!("\n  started:   {}", started.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(error) = &record.error {
        out.push_str(&format!("\n  error:     {}", error));
    }
    out
}

/// One row of `goalrun list`.
pub fn format_list_row(record: &DeploymentRecord) -> String {
    let started = record
        .started_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<24} {:<12} {:<14} {}",
        record.deployment_id.as_str(),
        record.status.to_string(),
        record.phase,
        started
    )
}

pub fn list_header() -> String {
    format!("{:<24} {:<12} {:<14} {}", "DEPLOYMENT", "STATUS", "PHASE", "STARTED")
}

pub fn print_record(record: &DeploymentRecord, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{}", format_record(record)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
    }
    Ok(())
}

pub fn print_cleanup_report(report: &CleanupReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for detail in &report.details {
                println!("{}", detail);
            }
            println!("{} resource(s) deleted", report.resources_deleted);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
