// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process termination with signal escalation.
//!
//! SIGTERM first, bounded wait, then SIGKILL, bounded wait. A process
//! that survives both gets a warning, not a blocked supervisor. Whatever
//! happens, the entry leaves the tracking table and its log descriptor
//! closes.

use goalrun_core::DeploymentId;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use std::process::Child;
use std::sync::Arc;
use std::time::Duration;

/// Bounds for the graceful/forceful termination steps.
#[derive(Debug, Clone, Copy)]
pub struct TerminateTimeouts {
    pub graceful: Duration,
    pub forceful: Duration,
    /// Exit-poll interval within each wait.
    pub poll: Duration,
}

impl Default for TerminateTimeouts {
    fn default() -> Self {
        Self {
            graceful: Duration::from_secs(10),
            forceful: Duration::from_secs(5),
            poll: Duration::from_millis(100),
        }
    }
}

/// In-memory state for one launched child. Exists only in the supervisor
/// instance that spawned it; never serialized.
pub struct ProcessEntry {
    pub child: Child,
    /// Held open so the descriptor lifetime is explicit; dropped (closed)
    /// when the entry leaves the table.
    pub log_file: Option<File>,
    pub log_path: PathBuf,
}

/// Tracking table for live children, owned by one supervisor instance.
#[derive(Clone, Default)]
pub struct ProcessTable {
    inner: Arc<Mutex<HashMap<DeploymentId, ProcessEntry>>>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: DeploymentId, entry: ProcessEntry) {
        self.inner.lock().insert(id, entry);
    }

    pub fn remove(&self, id: &DeploymentId) -> Option<ProcessEntry> {
        self.inner.lock().remove(id)
    }

    pub fn contains(&self, id: &DeploymentId) -> bool {
        self.inner.lock().contains_key(id)
    }

    /// Run a closure against a tracked entry, if present. The table lock
    /// is held for the duration; callers must not block inside.
    pub fn with_entry_mut<R>(
        &self,
        id: &DeploymentId,
        f: impl FnOnce(&mut ProcessEntry) -> R,
    ) -> Option<R> {
        self.inner.lock().get_mut(id).map(f)
    }

    /// The log path recorded at launch, if this instance launched the
    /// deployment.
    pub fn log_path(&self, id: &DeploymentId) -> Option<PathBuf> {
        self.inner.lock().get(id).map(|e| e.log_path.clone())
    }

    pub fn ids(&self) -> Vec<DeploymentId> {
        self.inner.lock().keys().cloned().collect()
    }

    /// Take every entry out of the table (shutdown sweep).
    pub fn drain(&self) -> Vec<(DeploymentId, ProcessEntry)> {
        self.inner.lock().drain().collect()
    }
}

/// How a termination attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// Nothing tracked for this id in this supervisor instance.
    NotTracked,
    /// The child had already exited before any signal was sent.
    AlreadyExited,
    /// Exited within the graceful window after SIGTERM.
    Terminated,
    /// Needed SIGKILL, then exited within the forceful window.
    Killed,
    /// Survived both signals; abandoned rather than blocking further.
    Unreaped,
}

/// Terminate a tracked child with escalation.
///
/// Signals go to the child's process group (it leads its own, created at
/// launch) so grandchildren die with it. Unconditionally untracks the
/// entry and closes its log descriptor.
pub async fn terminate(
    table: &ProcessTable,
    id: &DeploymentId,
    timeouts: &TerminateTimeouts,
) -> TerminateOutcome {
    let Some(mut entry) = table.remove(id) else {
        return TerminateOutcome::NotTracked;
    };

    let outcome = terminate_child(id, &mut entry.child, timeouts).await;

    // Entry drop closes the log descriptor; closing twice cannot happen
    // because remove() above is the only way out of the table.
    drop(entry);
    outcome
}

async fn terminate_child(
    id: &DeploymentId,
    child: &mut Child,
    timeouts: &TerminateTimeouts,
) -> TerminateOutcome {
    if matches!(child.try_wait(), Ok(Some(_))) {
        return TerminateOutcome::AlreadyExited;
    }

    let pid = child.id() as i32;
    // Negative pid: signal the whole process group.
    let group = Pid::from_raw(-pid);

    if let Err(e) = kill(group, Signal::SIGTERM) {
        tracing::warn!(deployment_id = %id, pid, error = %e, "SIGTERM failed");
    }
    if wait_for_exit(child, timeouts.graceful, timeouts.poll).await {
        tracing::info!(deployment_id = %id, pid, "agent exited after SIGTERM");
        return TerminateOutcome::Terminated;
    }

    tracing::warn!(deployment_id = %id, pid, "graceful stop timed out, escalating to SIGKILL");
    if let Err(e) = kill(group, Signal::SIGKILL) {
        tracing::warn!(deployment_id = %id, pid, error = %e, "SIGKILL failed");
    }
    if wait_for_exit(child, timeouts.forceful, timeouts.poll).await {
        return TerminateOutcome::Killed;
    }

    tracing::warn!(deployment_id = %id, pid, "agent survived SIGKILL window, abandoning wait");
    TerminateOutcome::Unreaped
}

async fn wait_for_exit(child: &mut Child, timeout: Duration, poll: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if matches!(child.try_wait(), Ok(Some(_))) {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
#[path = "terminate_tests.rs"]
mod tests;
