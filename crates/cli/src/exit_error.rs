// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use goalrun_workload::WorkloadError;
use std::fmt;

/// Exit code for configuration and input validation failures.
pub const EXIT_VALIDATION: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Map workload failures onto exit codes: validation problems are the
/// caller's fault (exit 2), everything else is an operational failure.
pub fn from_workload(e: WorkloadError) -> anyhow::Error {
    match e {
        WorkloadError::Validation(_) => ExitError::new(EXIT_VALIDATION, e.to_string()).into(),
        WorkloadError::NotFound(_) | WorkloadError::ResumeUnsupported => {
            ExitError::new(1, e.to_string()).into()
        }
        other => other.into(),
    }
}
