// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup for the `goalrun` binary.
//!
//! Diagnostics go to stderr so stdout stays reserved for command output
//! (deployment ids, records, streamed log lines). The level comes from
//! `GOALRUN_LOG`, defaulting to `warn`; supervisor status lines are
//! surfaced through `goalrun logs`, not the subscriber.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter =
        EnvFilter::try_from_env("GOALRUN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
