// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor log buffers and durable log tailing.
//!
//! Two distinct streams exist per deployment: the in-memory buffer holds
//! supervisor-authored status lines, and `agent.log` holds the detached
//! child's raw output. `get_logs` presents them concatenated, not
//! interleaved by timestamp.

use goalrun_core::DeploymentId;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

/// Retention bound per deployment; oldest lines are evicted first.
pub const MAX_LOG_LINES: usize = 10_000;

/// Bounded FIFO of supervisor-authored log lines.
#[derive(Debug, Default)]
struct LogBuffer {
    lines: VecDeque<String>,
    /// Total lines ever appended, so followers can track a stable offset
    /// across evictions.
    appended: usize,
}

impl LogBuffer {
    fn push(&mut self, line: String) {
        self.lines.push_back(line);
        self.appended += 1;
        while self.lines.len() > MAX_LOG_LINES {
            self.lines.pop_front();
        }
    }

    fn tail(&self, n: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }

    /// Lines appended at or after the given absolute offset.
    fn since(&self, offset: usize) -> Vec<String> {
        let evicted = self.appended - self.lines.len();
        let skip = offset.saturating_sub(evicted);
        self.lines.iter().skip(skip).cloned().collect()
    }
}

/// Per-deployment supervisor log buffers, owned by one supervisor instance.
#[derive(Clone, Default)]
pub struct DeploymentLogs {
    inner: Arc<Mutex<HashMap<DeploymentId, LogBuffer>>>,
}

impl DeploymentLogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a timestamped status line for a deployment.
    pub fn append(&self, id: &DeploymentId, message: impl AsRef<str>) {
        let message = message.as_ref();
        let line = format!("[{}] {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"), message);
        self.inner.lock().entry(id.clone()).or_default().push(line);
        tracing::info!(deployment_id = %id, "{}", message);
    }

    /// Last `n` buffered lines.
    pub fn tail(&self, id: &DeploymentId, n: usize) -> Vec<String> {
        self.inner.lock().get(id).map(|buf| buf.tail(n)).unwrap_or_default()
    }

    /// Total lines ever appended for a deployment (follow-mode cursor).
    pub fn appended(&self, id: &DeploymentId) -> usize {
        self.inner.lock().get(id).map(|buf| buf.appended).unwrap_or(0)
    }

    /// Buffered lines at or after an absolute offset.
    pub fn since(&self, id: &DeploymentId, offset: usize) -> Vec<String> {
        self.inner.lock().get(id).map(|buf| buf.since(offset)).unwrap_or_default()
    }

    /// Currently retained line count (tests).
    pub fn retained(&self, id: &DeploymentId) -> usize {
        self.inner.lock().get(id).map(|buf| buf.lines.len()).unwrap_or(0)
    }

    /// Drop a deployment's buffer. Returns true if one existed.
    pub fn drop_buffer(&self, id: &DeploymentId) -> bool {
        self.inner.lock().remove(id).is_some()
    }
}

/// Last `n` lines of a file. Missing file reads as empty.
pub fn tail_lines(path: &Path, n: usize) -> Vec<String> {
    let lines = read_all_lines(path);
    let skip = lines.len().saturating_sub(n);
    lines.into_iter().skip(skip).collect()
}

/// Lines at or after a line offset (follow-mode cursor into `agent.log`).
pub fn lines_from(path: &Path, offset: usize) -> Vec<String> {
    read_all_lines(path).into_iter().skip(offset).collect()
}

fn read_all_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
