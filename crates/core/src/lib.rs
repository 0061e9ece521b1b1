// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core types for the goalrun workload: deployment identifiers, the
//! deployment record and status machine, deploy-time configuration, and
//! clock abstractions.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod clock;
mod config;
mod deployment;
mod id;
mod macros;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{resolve_against_cwd, DeployConfig, Sdk, DEFAULT_MAX_TURNS, GOAL_FILE_EXTENSIONS};
pub use deployment::{
    CleanupReport, DeploymentRecord, DeploymentStatus, META_AGENT_DIR_ALIAS, META_AGENT_PID,
    META_GENERATION_OUTPUT_DIR, META_GOAL_SUMMARY, META_MAX_TURNS, META_SDK,
};
pub use id::DeploymentId;

/// Name under which this workload registers with the host platform.
pub const WORKLOAD_NAME: &str = "goal-agent";
