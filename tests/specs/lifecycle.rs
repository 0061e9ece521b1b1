// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full lifecycle specs driven through the CLI.

use crate::specs::prelude::*;

#[test]
fn deploy_runs_the_agent_to_completion() {
    let project = Project::empty();
    project.file("goal.md", "# Summarize the weekly report\n\nKeep it short.\n");

    let id = project
        .goalrun()
        .args(&["deploy", "--goal-file", "goal.md"])
        .passes()
        .trim()
        .to_string();

    // Record is durable immediately
    assert!(project.state_dir().join("deployments").join(format!("{}.json", id)).is_file());

    wait_for_status(&project, &id, "completed");

    let record = status_json(&project, &id);
    assert_eq!(record["metadata"]["goal_summary"], "Summarize the weekly report");
    assert_eq!(record["metadata"]["agent_dir"], record["metadata"]["generation_output_dir"]);

    // The generated bundle and its artifacts exist under the workdir
    let agent_dir = record["metadata"]["generation_output_dir"].as_str().unwrap();
    for artifact in ["run.sh", "prompt.md", "agent-config.json", "agent.log"] {
        assert!(
            std::path::Path::new(agent_dir).join(artifact).is_file(),
            "missing artifact {}",
            artifact
        );
    }
}

#[test]
fn logs_show_progress_lines_and_agent_output() {
    let project = Project::empty();
    let id = deploy(&project);
    wait_for_status(&project, &id, "completed");

    let out = project.goalrun().args(&["logs", &id]).passes();
    assert!(out.contains("Goal achieved!"), "logs: {}", out);
    // Agent output lines are raw; only supervisor lines in the launching
    // process carry the timestamp prefix, and this is a fresh process
    assert!(out.contains(&format!("Agent {} starting", id)), "logs: {}", out);
}

#[test]
fn stop_marks_the_deployment_stopped() {
    let project = Project::empty();
    let id = deploy(&project);

    let out = project.goalrun().args(&["stop", &id]).passes();
    assert!(out.contains(&format!("Stopped {}", id)));

    assert_eq!(status_json(&project, &id)["status"], "stopped");

    // Idempotent
    project.goalrun().args(&["stop", &id]).passes();
}

#[test]
fn start_is_refused_with_redeploy_guidance() {
    let project = Project::empty();
    let id = deploy(&project);
    project.goalrun().args(&["stop", &id]).passes();

    let err = project.goalrun().args(&["start", &id]).fails(1);
    assert!(err.contains("redeploy"), "stderr: {}", err);
}

#[test]
fn cleanup_finalizes_and_is_idempotent() {
    let project = Project::empty();
    let id = deploy(&project);

    let out = project.goalrun().args(&["cleanup", &id]).passes();
    assert!(out.contains(&format!("Cleaned up deployment {}", id)));

    assert_eq!(status_json(&project, &id)["status"], "completed");
    assert_eq!(status_json(&project, &id)["phase"], "cleaned_up");

    let again = project.goalrun().args(&["cleanup", &id]).passes();
    assert!(again.contains("Already in completed state"));
    assert!(again.contains("0 resource(s) deleted"));
}

#[test]
fn list_shows_deployments_across_invocations() {
    let project = Project::empty();
    let id = deploy(&project);
    wait_for_status(&project, &id, "completed");

    let out = project.goalrun().args(&["list"]).passes();
    assert!(out.contains("DEPLOYMENT"));
    assert!(out.contains(&id));
    assert!(out.contains("completed"));
}
