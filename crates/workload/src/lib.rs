// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Goal-agent workload: generates a runnable agent from a natural-language
//! goal, launches it as a detached process, and supervises its lifecycle.
//!
//! The center of gravity is the detached-process supervision path: the
//! launcher puts the child in its own process group so it outlives the
//! supervisor, the reconciler re-derives liveness from durable state alone
//! (pid probe, log tail) after a restart, and the terminator escalates from
//! SIGTERM to SIGKILL under bounded timeouts.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod goal;
mod launch;
mod liveness;
mod logs;
mod pipeline;
mod supervisor;
mod terminate;

pub use error::WorkloadError;
pub use goal::{resolve_goal, ResolvedGoal, DEFAULT_GOAL};
pub use launch::{launch, LaunchedAgent, AGENT_LOG_FILE, ENTRY_POINT};
pub use liveness::{assess, classify_log_tail, probe_pid, LogVerdict, PidLiveness, Verdict};
pub use logs::{lines_from, tail_lines, DeploymentLogs, MAX_LOG_LINES};
pub use pipeline::{
    generate_agent, AgentBundle, BundleSpec, ExecutionPlan, GoalAnalysis, GoalPipeline,
    PipelineError, ScriptPipeline, SkillSynthesis,
};
pub use supervisor::{GoalWorkload, LogOptions, Workload};
pub use terminate::{
    terminate, ProcessEntry, ProcessTable, TerminateOutcome, TerminateTimeouts,
};
