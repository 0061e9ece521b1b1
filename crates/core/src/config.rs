// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deploy-time configuration and validation.
//!
//! The host platform hands the workload an untyped JSON mapping. Every key
//! is optional with a default, but present values are checked strictly: a
//! numeric string is not an integer, and a bool is not a turn count.

use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Accepted goal-file extensions (plain-text markup only).
pub const GOAL_FILE_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Default agent turn budget.
pub const DEFAULT_MAX_TURNS: u32 = 15;

const MIN_MAX_TURNS: i64 = 1;
const MAX_MAX_TURNS: i64 = 100;

/// SDK the generated agent targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sdk {
    #[default]
    Claude,
    Copilot,
    Microsoft,
    Mini,
}

impl Sdk {
    pub const ALL: &'static [Sdk] = &[Sdk::Claude, Sdk::Copilot, Sdk::Microsoft, Sdk::Mini];
}

crate::simple_display! {
    Sdk {
        Claude => "claude",
        Copilot => "copilot",
        Microsoft => "microsoft",
        Mini => "mini",
    }
}

impl FromStr for Sdk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(Sdk::Claude),
            "copilot" => Ok(Sdk::Copilot),
            "microsoft" => Ok(Sdk::Microsoft),
            "mini" => Ok(Sdk::Mini),
            other => Err(format!(
                "sdk must be one of: claude, copilot, microsoft, mini (got '{}')",
                other
            )),
        }
    }
}

/// Typed view over the caller-supplied configuration mapping.
#[derive(Debug, Clone, Default)]
pub struct DeployConfig {
    raw: Map<String, Value>,
}

impl DeployConfig {
    pub fn new(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    /// The raw mapping, persisted verbatim into the deployment record.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// `goal_file` as supplied, without existence checks.
    pub fn goal_file(&self) -> Option<&str> {
        self.raw.get("goal_file").and_then(Value::as_str)
    }

    /// `sdk`, defaulting to claude. Invalid values surface in [`Self::validate`].
    pub fn sdk(&self) -> Sdk {
        self.raw
            .get("sdk")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// `enable_memory`, defaulting to false.
    pub fn enable_memory(&self) -> bool {
        self.raw.get("enable_memory").and_then(Value::as_bool).unwrap_or(false)
    }

    /// `max_turns`, defaulting to 15.
    pub fn max_turns(&self) -> u32 {
        match self.raw.get("max_turns").and_then(strict_integer) {
            Some(n) if (MIN_MAX_TURNS..=MAX_MAX_TURNS).contains(&n) => n as u32,
            _ => DEFAULT_MAX_TURNS,
        }
    }

    /// Check every key, collecting one message per violation. An empty
    /// result means the config is deployable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(value) = self.raw.get("goal_file") {
            match value.as_str() {
                Some(path) => validate_goal_path(path, &mut errors),
                None => errors.push(format!("goal_file must be a string path (got {})", value)),
            }
        }

        if let Some(value) = self.raw.get("sdk") {
            match value.as_str() {
                Some(s) => {
                    if let Err(e) = Sdk::from_str(s) {
                        errors.push(e);
                    }
                }
                None => errors.push(format!("sdk must be a string (got {})", value)),
            }
        }

        if let Some(value) = self.raw.get("enable_memory") {
            if !value.is_boolean() {
                errors.push(format!("enable_memory must be a boolean (got {})", value));
            }
        }

        if let Some(value) = self.raw.get("max_turns") {
            match strict_integer(value) {
                Some(n) if (MIN_MAX_TURNS..=MAX_MAX_TURNS).contains(&n) => {}
                Some(n) => errors.push(format!(
                    "max_turns must be between {} and {} (got {})",
                    MIN_MAX_TURNS, MAX_MAX_TURNS, n
                )),
                None => errors.push(format!("max_turns must be an integer (got {})", value)),
            }
        }

        errors
    }
}

/// Integer extraction that rejects floats, bools, and numeric strings.
fn strict_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if !n.is_f64() => n.as_i64(),
        _ => None,
    }
}

fn validate_goal_path(raw: &str, errors: &mut Vec<String>) {
    let path = Path::new(raw);

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        errors.push(format!("goal_file must not contain '..' components: {}", raw));
        return;
    }

    let resolved = resolve_against_cwd(path);
    if !resolved.exists() {
        errors.push(format!("goal_file not found: {}", resolved.display()));
        return;
    }

    let ext = resolved.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !GOAL_FILE_EXTENSIONS.contains(&ext) {
        errors.push(format!(
            "goal_file must be a markdown or text file (.md, .markdown, .txt): {}",
            raw
        ));
    }
}

/// Resolve a possibly-relative path against the current working directory.
pub fn resolve_against_cwd(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
