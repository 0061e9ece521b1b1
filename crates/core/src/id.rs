// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment identifier generation.

use serde::{Deserialize, Serialize};

/// Unique identifier for one deployed agent instance.
///
/// Format is `<workload-name>-<8 hex chars>`, e.g. `goal-agent-3fa8c21d`.
/// The suffix is drawn from a v4 UUID, so ids are unique per deploy call
/// without any coordination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(String);

impl DeploymentId {
    /// Generate a fresh id for the given workload name.
    pub fn generate(workload_name: &str) -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", workload_name, &hex[..8]))
    }

    /// Create an id from an existing string (parsing, deserialization).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeploymentId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for DeploymentId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for DeploymentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DeploymentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DeploymentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for DeploymentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
