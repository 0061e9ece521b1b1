// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI surface specs: help, validation, exit codes.

use crate::specs::prelude::*;

#[test]
fn help_lists_every_verb() {
    let out = Project::empty().goalrun().args(&["--help"]).passes();
    for verb in ["deploy", "validate", "status", "list", "stop", "start", "cleanup", "logs"] {
        assert!(out.contains(verb), "help missing verb '{}':\n{}", verb, out);
    }
}

#[test]
fn validate_accepts_a_good_config() {
    let project = Project::empty();
    project.file("goal.md", "# Sort the inbox\n");

    let out = project
        .goalrun()
        .args(&["validate", "--goal-file", "goal.md", "--sdk", "mini", "--max-turns", "20"])
        .passes();
    assert!(out.contains("Configuration is valid"));
}

#[test]
fn validate_reports_every_violation_and_exits_2() {
    let err = Project::empty()
        .goalrun()
        .args(&["validate", "--config", r#"{"sdk": "emacs", "max_turns": 0}"#])
        .fails(2);
    assert!(err.contains("sdk must be one of"), "stderr: {}", err);
    assert!(err.contains("max_turns"), "stderr: {}", err);
}

#[test]
fn deploy_rejects_invalid_config_with_exit_2() {
    let err = Project::empty()
        .goalrun()
        .args(&["deploy", "--goal-file", "does-not-exist.md"])
        .fails(2);
    assert!(err.contains("not found"), "stderr: {}", err);
}

#[test]
fn status_of_unknown_deployment_exits_1() {
    let err = Project::empty()
        .goalrun()
        .args(&["status", "goal-agent-00000000"])
        .fails(1);
    assert!(err.contains("not found"), "stderr: {}", err);
}

#[test]
fn list_is_empty_before_any_deploy() {
    let out = Project::empty().goalrun().args(&["list"]).passes();
    assert!(out.contains("No deployments"));
}
