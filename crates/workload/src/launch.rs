// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detached agent process launch.
//!
//! The child is placed in its own process group with stdout and stderr
//! redirected into a durable `agent.log`, so it survives supervisor exit
//! and its output survives the child. The supervisor that launched it
//! keeps the `Child` handle as a fast path; everything needed after a
//! restart (pid, output directory) goes into the deployment record.

use crate::error::WorkloadError;
use goalrun_core::DeploymentId;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Well-known entry point filename inside a generated bundle.
pub const ENTRY_POINT: &str = "run.sh";
/// Combined stdout+stderr log inside the bundle directory.
pub const AGENT_LOG_FILE: &str = "agent.log";

/// A freshly launched detached agent.
#[derive(Debug)]
pub struct LaunchedAgent {
    pub child: Child,
    pub pid: i32,
    pub log_file: File,
    pub log_path: PathBuf,
}

/// Launch the bundle's entry point as a detached child.
///
/// The entry-point check runs before any file descriptor is opened so a
/// failed launch never leaks a log file with no consumer. On a spawn
/// failure the opened log file is closed and removed; no process or file
/// state survives.
pub fn launch(
    id: &DeploymentId,
    output_dir: &Path,
    max_turns: u32,
) -> Result<LaunchedAgent, WorkloadError> {
    let entry = output_dir.join(ENTRY_POINT);
    if !entry.is_file() {
        return Err(WorkloadError::Launch(format!(
            "agent entry point {} not found in {}",
            ENTRY_POINT,
            output_dir.display()
        )));
    }

    let log_path = output_dir.join(AGENT_LOG_FILE);
    let log_file = File::create(&log_path)?;
    // One descriptor duplicated into both child streams: stdout and stderr
    // interleave in a single file, complete lines untorn.
    let stdout = log_file.try_clone()?;
    let stderr = log_file.try_clone()?;

    let spawned = spawn_detached(id, output_dir, max_turns, stdout, stderr);

    let child = match spawned {
        Ok(child) => child,
        Err(e) => {
            drop(log_file);
            let _ = std::fs::remove_file(&log_path);
            return Err(WorkloadError::Launch(format!("failed to spawn {}: {}", ENTRY_POINT, e)));
        }
    };

    let pid = child.id() as i32;
    tracing::info!(deployment_id = %id, pid, dir = %output_dir.display(), "agent launched detached");

    Ok(LaunchedAgent { child, pid, log_file, log_path })
}

#[cfg(unix)]
fn spawn_detached(
    id: &DeploymentId,
    output_dir: &Path,
    max_turns: u32,
    stdout: File,
    stderr: File,
) -> std::io::Result<Child> {
    use std::os::unix::process::CommandExt;

    Command::new("sh")
        .arg(ENTRY_POINT)
        .current_dir(output_dir)
        // Own process group: not reaped or signalled when the supervisor
        // exits or is reparented.
        .process_group(0)
        .env("GOALRUN_DEPLOYMENT_ID", id.as_str())
        .env("GOALRUN_MAX_TURNS", max_turns.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .spawn()
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
