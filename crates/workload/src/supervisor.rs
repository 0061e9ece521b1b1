// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle supervisor: the five workload verbs plus log streaming.
//!
//! One [`GoalWorkload`] instance owns its tracking tables (processes,
//! log buffers, temp goal files) for its own lifetime; nothing is module
//! global, so independent instances coexist in tests and multi-tenant
//! hosts. The durable record in the state store is the source of truth
//! across instances — in-memory handles are only a fast path.

use crate::error::WorkloadError;
use crate::goal::resolve_goal;
use crate::launch::{launch, AGENT_LOG_FILE};
use crate::liveness::{assess, Verdict};
use crate::logs::{lines_from, tail_lines, DeploymentLogs};
use crate::pipeline::{generate_agent, GoalPipeline};
use crate::terminate::{
    terminate, ProcessEntry, ProcessTable, TerminateOutcome, TerminateTimeouts,
};
use async_trait::async_trait;
use chrono::Utc;
use goalrun_core::{
    CleanupReport, Clock, DeployConfig, DeploymentId, DeploymentRecord, DeploymentStatus,
    SystemClock, META_AGENT_DIR_ALIAS, META_GOAL_SUMMARY, META_MAX_TURNS, META_SDK,
    WORKLOAD_NAME,
};
use goalrun_storage::StateStore;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Options for `get_logs`.
#[derive(Debug, Clone, Copy)]
pub struct LogOptions {
    pub follow: bool,
    /// Tail length applied to each of the two streams (supervisor buffer,
    /// durable agent log).
    pub lines: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { follow: false, lines: 100 }
    }
}

/// Workload plugin surface exposed to the host platform.
#[async_trait]
pub trait Workload: Send + Sync {
    fn name(&self) -> &str;

    /// Generate and launch an agent; returns before the agent finishes.
    async fn deploy(&self, config: DeployConfig) -> Result<DeploymentId, WorkloadError>;

    /// Reconcile and return the current record.
    async fn get_status(&self, id: &DeploymentId) -> Result<DeploymentRecord, WorkloadError>;

    /// Stop a running deployment. `Ok(false)` when the status is not
    /// stoppable; `Ok(true)` (idempotent) when already stopped.
    async fn stop(&self, id: &DeploymentId) -> Result<bool, WorkloadError>;

    /// Resume a stopped deployment. Never succeeds for this workload.
    async fn start(&self, id: &DeploymentId) -> Result<bool, WorkloadError>;

    /// Destructive teardown; always succeeds and is idempotent.
    async fn cleanup(&self, id: &DeploymentId) -> Result<CleanupReport, WorkloadError>;

    /// Stream log lines: supervisor-authored status lines first, then the
    /// durable agent log.
    async fn get_logs(
        &self,
        id: &DeploymentId,
        opts: LogOptions,
    ) -> Result<mpsc::Receiver<String>, WorkloadError>;

    async fn validate_config(&self, config: &DeployConfig) -> Vec<String>;
}

/// Supervisor for goal-generated agents running as detached processes.
pub struct GoalWorkload<C: Clock = SystemClock> {
    name: String,
    workdir: PathBuf,
    store: Arc<dyn StateStore>,
    pipeline: Arc<dyn GoalPipeline>,
    procs: ProcessTable,
    logs: DeploymentLogs,
    temp_goals: Mutex<HashMap<DeploymentId, PathBuf>>,
    timeouts: TerminateTimeouts,
    shutdown: CancellationToken,
    clock: C,
}

impl GoalWorkload {
    pub fn new(
        workdir: impl Into<PathBuf>,
        store: Arc<dyn StateStore>,
        pipeline: Arc<dyn GoalPipeline>,
    ) -> Self {
        Self::with_clock(workdir, store, pipeline, SystemClock)
    }
}

impl<C: Clock> GoalWorkload<C> {
    /// Like [`GoalWorkload::new`] with an injected clock.
    pub fn with_clock(
        workdir: impl Into<PathBuf>,
        store: Arc<dyn StateStore>,
        pipeline: Arc<dyn GoalPipeline>,
        clock: C,
    ) -> Self {
        Self {
            name: WORKLOAD_NAME.to_string(),
            workdir: workdir.into(),
            store,
            pipeline,
            procs: ProcessTable::new(),
            logs: DeploymentLogs::new(),
            temp_goals: Mutex::new(HashMap::new()),
            timeouts: TerminateTimeouts::default(),
            shutdown: CancellationToken::new(),
            clock,
        }
    }

    pub fn with_timeouts(mut self, timeouts: TerminateTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Directory the generation pipeline materializes bundles into.
    pub fn generated_dir(&self, id: &DeploymentId) -> PathBuf {
        self.workdir.join(".generated").join(id.as_str())
    }

    /// Terminate every still-tracked child and cancel follow streams.
    ///
    /// The scoped counterpart of a process-exit hook: callers that own a
    /// supervisor call this at their own shutdown boundary. Detached
    /// children of a *crashed* supervisor are not swept — that is the
    /// point of detaching — and are handled by reconciliation instead.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        for id in self.procs.ids() {
            let outcome = terminate(&self.procs, &id, &self.timeouts).await;
            tracing::info!(deployment_id = %id, ?outcome, "shutdown sweep");
        }
    }

    async fn load(&self, id: &DeploymentId) -> Result<DeploymentRecord, WorkloadError> {
        self.store.load(id).await?.ok_or_else(|| WorkloadError::NotFound(id.clone()))
    }

    fn discard_temp_goal(&self, id: &DeploymentId) {
        if let Some(path) = self.temp_goals.lock().remove(id) {
            let _ = std::fs::remove_file(path);
        }
    }

    /// Durable agent log location: the launch-time path when this
    /// instance launched the agent, otherwise derived from metadata so
    /// logs survive a supervisor restart.
    fn agent_log_path(&self, id: &DeploymentId, record: &DeploymentRecord) -> Option<PathBuf> {
        self.procs
            .log_path(id)
            .or_else(|| record.generation_output_dir().map(|dir| dir.join(AGENT_LOG_FILE)))
    }

    async fn deploy_inner(
        &self,
        id: &DeploymentId,
        config: &DeployConfig,
    ) -> Result<(), WorkloadError> {
        self.logs.append(id, format!("Starting deployment {}", id));

        let goal = resolve_goal(config.goal_file(), id)?;
        if goal.temp {
            self.temp_goals.lock().insert(id.clone(), goal.path.clone());
            self.logs.append(id, "Using default goal (no goal_file specified)");
        } else {
            self.logs.append(id, format!("Using goal: {}", goal.path.display()));
        }

        self.logs.append(id, "Generating agent from goal prompt...");
        let output_dir = self.generated_dir(id);
        let agent_dir = generate_agent(
            self.pipeline.as_ref(),
            id,
            &goal.path,
            config.sdk(),
            config.enable_memory(),
            &output_dir,
            &self.logs,
        )
        .await?;
        self.logs.append(id, format!("Agent generated in {}", agent_dir.display()));

        let goal_summary = goal.summary();
        let max_turns = config.max_turns();

        let launched = launch(id, &agent_dir, max_turns)?;
        let mut child = launched.child;

        let mut record = DeploymentRecord::new(id.clone(), &self.name, config.raw().clone());
        record.status = DeploymentStatus::Running;
        record.phase = "executing".to_string();
        record.started_at = Some(Utc::now());
        record.metadata.insert(META_GOAL_SUMMARY.to_string(), Value::from(goal_summary));
        record.metadata.insert(META_SDK.to_string(), Value::from(config.sdk().to_string()));
        record.metadata.insert(META_MAX_TURNS.to_string(), Value::from(max_turns));
        record.set_generation_output_dir(&agent_dir);
        record.set_agent_pid(launched.pid);

        // The pid must be durable before deploy returns: a supervisor that
        // restarts between now and the first status check reconciles from
        // the record alone.
        if let Err(e) = self.store.save(&record).await {
            kill_group(&mut child);
            return Err(e.into());
        }

        self.procs.insert(
            id.clone(),
            ProcessEntry { child, log_file: Some(launched.log_file), log_path: launched.log_path },
        );
        self.logs.append(id, format!("Executing agent (max_turns={})", max_turns));
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> Workload for GoalWorkload<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deploy(&self, config: DeployConfig) -> Result<DeploymentId, WorkloadError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(WorkloadError::Validation(errors.join("; ")));
        }

        let id = DeploymentId::generate(&self.name);
        let span = tracing::info_span!("workload.deploy", deployment_id = %id);
        async {
            match self.deploy_inner(&id, &config).await {
                Ok(()) => Ok(id.clone()),
                Err(e) => {
                    self.discard_temp_goal(&id);
                    tracing::error!(error = %e, "deploy failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn get_status(&self, id: &DeploymentId) -> Result<DeploymentRecord, WorkloadError> {
        let mut record = self.load(id).await?;

        // Only running records reconcile; terminal and stopped statuses
        // are absorbing.
        if record.status == DeploymentStatus::Running {
            let verdict = match self
                .procs
                .with_entry_mut(id, |entry| assess(&record, Some(&mut entry.child)))
            {
                Some(verdict) => verdict,
                None => assess(&record, None),
            };

            if let Verdict::Finished { status, phase, error } = verdict {
                match &error {
                    Some(message) => self.logs.append(id, message),
                    None => self.logs.append(id, "Agent finished: goal achieved"),
                }
                record.finish(status, phase, error);
                self.store.save(&record).await?;
                // The handle is spent; untracking closes the log descriptor.
                drop(self.procs.remove(id));
            }
        }

        if let Some(dir) = record.generation_output_dir() {
            record
                .metadata
                .insert(META_AGENT_DIR_ALIAS.to_string(), Value::from(dir.display().to_string()));
        }
        Ok(record)
    }

    async fn stop(&self, id: &DeploymentId) -> Result<bool, WorkloadError> {
        let mut record = self.load(id).await?;
        if record.status == DeploymentStatus::Stopped {
            return Ok(true);
        }
        if !record.status.is_stoppable() {
            return Ok(false);
        }

        let outcome = terminate(&self.procs, id, &self.timeouts).await;
        if outcome == TerminateOutcome::NotTracked {
            // Launched by a previous supervisor instance; cross-restart
            // termination is out of scope for stop.
            tracing::warn!(deployment_id = %id, "no tracked process to signal");
        } else {
            self.logs.append(id, "Agent process terminated");
        }

        record.status = DeploymentStatus::Stopped;
        record.phase = "stopped".to_string();
        record.stopped_at = Some(Utc::now());
        self.store.save(&record).await?;
        Ok(true)
    }

    async fn start(&self, id: &DeploymentId) -> Result<bool, WorkloadError> {
        // A detached child that stopped is gone; there is nothing to
        // resume. Deploy a new instance instead.
        let _ = self.load(id).await?;
        Err(WorkloadError::ResumeUnsupported)
    }

    async fn cleanup(&self, id: &DeploymentId) -> Result<CleanupReport, WorkloadError> {
        let mut record = self.load(id).await?;
        if record.status.is_terminal() {
            return Ok(CleanupReport::already_terminal(id.clone(), record.status));
        }

        let start = self.clock.now();
        record.status = DeploymentStatus::CleaningUp;
        record.phase = "cleaning_up".to_string();
        self.store.save(&record).await?;

        let mut details = Vec::new();
        let mut deleted = 0u32;

        let outcome = terminate(&self.procs, id, &self.timeouts).await;
        if !matches!(outcome, TerminateOutcome::NotTracked | TerminateOutcome::AlreadyExited) {
            deleted += 1;
            details.push("Terminated agent process".to_string());
        }

        if let Some(path) = self.temp_goals.lock().remove(id) {
            if std::fs::remove_file(&path).is_ok() {
                deleted += 1;
                details.push("Deleted temporary goal file".to_string());
            }
        }

        if self.logs.drop_buffer(id) {
            details.push("Dropped in-memory logs".to_string());
        }

        record.finish(DeploymentStatus::Completed, "cleaned_up", None);
        self.store.save(&record).await?;

        details.push(format!("Cleaned up deployment {}", id));
        Ok(CleanupReport {
            deployment_id: id.clone(),
            resources_deleted: deleted,
            details,
            duration: self.clock.now() - start,
        })
    }

    async fn get_logs(
        &self,
        id: &DeploymentId,
        opts: LogOptions,
    ) -> Result<mpsc::Receiver<String>, WorkloadError> {
        let record = self.load(id).await?;
        let log_path = self.agent_log_path(id, &record);

        if !opts.follow {
            let mut lines = self.logs.tail(id, opts.lines);
            if let Some(path) = &log_path {
                lines.extend(tail_lines(path, opts.lines));
            }
            let (tx, rx) = mpsc::channel(lines.len().max(1));
            for line in lines {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            return Ok(rx);
        }

        let (tx, rx) = mpsc::channel(256);
        let token = self.shutdown.child_token();
        let store = Arc::clone(&self.store);
        let logs = self.logs.clone();
        let id = id.clone();
        let tail = opts.lines;

        tokio::spawn(async move {
            let mut buf_seen = logs.appended(&id);
            for line in logs.tail(&id, tail) {
                if tx.send(line).await.is_err() {
                    return;
                }
            }

            let mut file_seen = 0usize;
            if let Some(path) = &log_path {
                let initial = tail_lines(path, tail);
                file_seen = lines_from(path, 0).len();
                for line in initial {
                    if tx.send(line).await.is_err() {
                        return;
                    }
                }
            }

            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                }

                for line in logs.since(&id, buf_seen) {
                    buf_seen += 1;
                    if tx.send(line).await.is_err() {
                        return;
                    }
                }
                if let Some(path) = &log_path {
                    for line in lines_from(path, file_seen) {
                        file_seen += 1;
                        if tx.send(line).await.is_err() {
                            return;
                        }
                    }
                }

                let done = match store.load(&id).await {
                    Ok(Some(record)) => record.status.is_terminal(),
                    Ok(None) | Err(_) => true,
                };
                if done {
                    for line in logs.since(&id, buf_seen) {
                        buf_seen += 1;
                        let _ = tx.send(line).await;
                    }
                    if let Some(path) = &log_path {
                        for line in lines_from(path, file_seen) {
                            file_seen += 1;
                            let _ = tx.send(line).await;
                        }
                    }
                    return;
                }
            }
        });

        Ok(rx)
    }

    async fn validate_config(&self, config: &DeployConfig) -> Vec<String> {
        config.validate()
    }
}

impl<C: Clock> Drop for GoalWorkload<C> {
    fn drop(&mut self) {
        // Children are detached on purpose and keep running when the
        // supervisor goes away; only already-exited ones are reaped here
        // so their pids are freed for the next instance's probes. Hosts
        // that want teardown call `shutdown()` first.
        self.shutdown.cancel();
        for (id, mut entry) in self.procs.drain() {
            if matches!(entry.child.try_wait(), Ok(None)) {
                tracing::debug!(deployment_id = %id, "leaving detached agent running");
            }
        }
    }
}

/// SIGKILL a child's whole process group and reap it.
fn kill_group(child: &mut std::process::Child) {
    let _ = kill(Pid::from_raw(-(child.id() as i32)), Signal::SIGKILL);
    let _ = child.wait();
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
