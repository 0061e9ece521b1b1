// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Goal file resolution.
//!
//! A deploy either names a goal markdown file or gets the built-in default,
//! written to a temp location and registered for deletion at cleanup.

use crate::error::WorkloadError;
use goalrun_core::{resolve_against_cwd, DeploymentId, GOAL_FILE_EXTENSIONS};
use std::path::{Component, Path, PathBuf};

/// Goal used when the caller supplies no `goal_file`.
pub const DEFAULT_GOAL: &str = "\
# Default Goal

## Goal
Process sample data items and produce a summary report.

## Constraints
- Complete within 5 minutes
- No external API calls required

## Success Criteria
- All items processed
- Summary report generated
";

/// A concrete goal file ready for the generation pipeline.
#[derive(Debug, Clone)]
pub struct ResolvedGoal {
    pub path: PathBuf,
    /// True when the file was generated by the resolver and should be
    /// deleted at cleanup.
    pub temp: bool,
}

impl ResolvedGoal {
    /// First heading line of the goal text, used as the deployment's
    /// `goal_summary` metadata.
    pub fn summary(&self) -> String {
        let text = std::fs::read_to_string(&self.path).unwrap_or_default();
        let first = text.lines().next().unwrap_or("");
        let summary = first.trim_start_matches('#').trim();
        if summary.is_empty() {
            "Goal agent".to_string()
        } else {
            summary.to_string()
        }
    }
}

/// Validate and locate the goal input for a deployment.
///
/// With no path, writes [`DEFAULT_GOAL`] to a process-private temp file.
/// With a path: rejects `..` components, resolves relative paths against
/// the current working directory, and requires an existing file with a
/// plain-text markup extension.
pub fn resolve_goal(
    raw: Option<&str>,
    deployment_id: &DeploymentId,
) -> Result<ResolvedGoal, WorkloadError> {
    let Some(raw) = raw else {
        let path = std::env::temp_dir().join(format!("goalrun-{}-goal.md", deployment_id));
        std::fs::write(&path, DEFAULT_GOAL)?;
        tracing::debug!(deployment_id = %deployment_id, path = %path.display(), "wrote default goal");
        return Ok(ResolvedGoal { path, temp: true });
    };

    let given = Path::new(raw);
    if given.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(WorkloadError::Validation(format!(
            "goal_file must not contain '..' components: {}",
            raw
        )));
    }

    let path = resolve_against_cwd(given);
    if !path.exists() {
        return Err(WorkloadError::Validation(format!("Goal file not found: {}", path.display())));
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !GOAL_FILE_EXTENSIONS.contains(&ext) {
        return Err(WorkloadError::Validation(format!(
            "goal_file must be a markdown or text file (.md, .markdown, .txt): {}",
            raw
        )));
    }

    Ok(ResolvedGoal { path, temp: false })
}

#[cfg(test)]
#[path = "goal_tests.rs"]
mod tests;
