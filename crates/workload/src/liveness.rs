// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness reconciliation for detached agents.
//!
//! Derives the current lifecycle status from whatever evidence exists, in
//! priority order: the in-memory child handle (same supervisor instance
//! only), an OS-level pid probe against the durable `agent_pid`, then the
//! tail of `agent.log`. A dead pid with no evidence of success is reported
//! as failed — a supervisor must never mask failure as completion.

use crate::launch::AGENT_LOG_FILE;
use goalrun_core::{DeploymentRecord, DeploymentStatus};
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::path::Path;
use std::process::Child;

/// Outcome of probing a pid with signal 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidLiveness {
    Alive,
    Dead,
    /// Probe was denied (EPERM): the pid exists but belongs to someone
    /// else, possibly recycled. Treated as alive — assuming death here
    /// would be unsafe.
    Ambiguous,
}

/// Query-only liveness probe against an OS pid.
pub fn probe_pid(pid: i32) -> PidLiveness {
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => PidLiveness::Alive,
        Err(Errno::ESRCH) => PidLiveness::Dead,
        Err(Errno::EPERM) => PidLiveness::Ambiguous,
        Err(errno) => {
            tracing::warn!(pid, %errno, "unexpected errno from liveness probe");
            PidLiveness::Ambiguous
        }
    }
}

/// Classification of the last non-empty `agent.log` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogVerdict {
    Completed,
    Failed(String),
    Inconclusive,
}

/// Classify the tail of an agent log. Inconclusive content never forces a
/// terminal state on its own.
pub fn classify_log_tail(log_path: &Path) -> LogVerdict {
    let Ok(text) = std::fs::read_to_string(log_path) else {
        return LogVerdict::Inconclusive;
    };
    let Some(last) = text.lines().rev().find(|l| !l.trim().is_empty()) else {
        return LogVerdict::Inconclusive;
    };

    let lower = last.to_lowercase();
    if lower.contains("goal achieved") {
        LogVerdict::Completed
    } else if lower.contains("exit code") {
        LogVerdict::Failed(last.to_string())
    } else {
        LogVerdict::Inconclusive
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Evidence says the deployment is still running (or there is no
    /// evidence at all).
    Unchanged,
    /// The agent reached a terminal state.
    Finished { status: DeploymentStatus, phase: &'static str, error: Option<String> },
}

impl Verdict {
    fn completed() -> Self {
        Verdict::Finished { status: DeploymentStatus::Completed, phase: "completed", error: None }
    }

    fn failed(error: String) -> Self {
        Verdict::Finished {
            status: DeploymentStatus::Failed,
            phase: "failed",
            error: Some(error),
        }
    }
}

/// Determine the current status of a running deployment.
///
/// `handle` is the launching supervisor's child handle when available; a
/// restarted supervisor passes `None` and the durable evidence decides.
pub fn assess(record: &DeploymentRecord, handle: Option<&mut Child>) -> Verdict {
    // Fast path: the handle knows the exit status exactly.
    if let Some(child) = handle {
        return match child.try_wait() {
            Ok(Some(status)) => match status.code() {
                Some(0) => Verdict::completed(),
                Some(code) => Verdict::failed(format!("Agent exited with code {}", code)),
                None => Verdict::failed("Agent terminated by signal".to_string()),
            },
            Ok(None) => Verdict::Unchanged,
            Err(e) => {
                tracing::warn!(deployment_id = %record.deployment_id, error = %e, "try_wait failed");
                Verdict::Unchanged
            }
        };
    }

    let log_path = record.generation_output_dir().map(|dir| dir.join(AGENT_LOG_FILE));

    // No handle (supervisor restarted): probe the stored pid.
    if let Some(pid) = record.agent_pid() {
        return match probe_pid(pid) {
            PidLiveness::Alive | PidLiveness::Ambiguous => Verdict::Unchanged,
            PidLiveness::Dead => {
                // The exit code is unrecoverable; the log tail is the only
                // remaining evidence. Inconclusive evidence means failed,
                // never completed.
                match log_path.as_deref().map(classify_log_tail) {
                    Some(LogVerdict::Completed) => Verdict::completed(),
                    Some(LogVerdict::Failed(line)) => Verdict::failed(line),
                    Some(LogVerdict::Inconclusive) | None => {
                        Verdict::failed(format!("Agent process {} no longer exists", pid))
                    }
                }
            }
        };
    }

    // Legacy records with no pid: the log tail alone may classify, but
    // inconclusive content leaves the record untouched.
    match log_path.as_deref().map(classify_log_tail) {
        Some(LogVerdict::Completed) => Verdict::completed(),
        Some(LogVerdict::Failed(line)) => Verdict::failed(line),
        Some(LogVerdict::Inconclusive) | None => Verdict::Unchanged,
    }
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
