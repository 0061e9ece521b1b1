// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable state storage for goalrun deployments.
//!
//! The host platform owns deployment records; this crate provides the
//! narrow load/save contract the workload consumes, plus a filesystem
//! implementation (one JSON file per record) and an in-memory one for
//! tests and multi-instance supervisor scenarios.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod store;

pub use store::{FsStateStore, MemoryStateStore, StateStore, StorageError};
