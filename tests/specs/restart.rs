// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor-restart specs.
//!
//! Every `goalrun` invocation is a fresh supervisor with empty in-memory
//! tables, so these exercise reconciliation from durable state alone.

use crate::specs::prelude::*;

/// A pid that is all but guaranteed to be free.
fn dead_pid() -> i32 {
    let mut child = std::process::Command::new("true").spawn().expect("spawn true");
    let pid = child.id() as i32;
    let _ = child.wait();
    pid
}

/// Plant a running-state record the way a vanished supervisor would have
/// left it: pid and agent dir in metadata, nothing in memory anywhere.
fn plant_record(project: &Project, id: &str, pid: i32, log_content: &str) {
    let agent_dir = project.path().join(".generated").join(id);
    std::fs::create_dir_all(&agent_dir).expect("agent dir");
    std::fs::write(agent_dir.join("agent.log"), log_content).expect("agent log");

    let record = serde_json::json!({
        "deployment_id": id,
        "workload_name": "goal-agent",
        "status": "running",
        "phase": "executing",
        "config": {},
        "metadata": {
            "agent_pid": pid,
            "generation_output_dir": agent_dir.display().to_string(),
        },
    });
    project.file(
        &format!("state/deployments/{}.json", id),
        &serde_json::to_string_pretty(&record).expect("record json"),
    );
}

#[test]
fn agent_outlives_the_deploying_process() {
    let project = Project::empty();

    // The deploy invocation has exited by the time passes() returns; the
    // agent keeps running detached and a later invocation finds its outcome
    let id = deploy(&project);
    wait_for_status(&project, &id, "completed");
}

#[test]
fn dead_pid_with_success_marker_reconciles_to_completed() {
    let project = Project::empty();
    plant_record(&project, "goal-agent-0badc0de", dead_pid(), "working\nGoal achieved!\n");

    let record = status_json(&project, "goal-agent-0badc0de");
    assert_eq!(record["status"], "completed");
}

#[test]
fn dead_pid_without_evidence_reconciles_to_failed() {
    let project = Project::empty();
    plant_record(&project, "goal-agent-0badc0de", dead_pid(), "halfway through\n");

    let record = status_json(&project, "goal-agent-0badc0de");
    assert_eq!(record["status"], "failed");
    assert!(
        record["error"].as_str().unwrap().contains("no longer exists"),
        "error: {}",
        record["error"]
    );
}

#[test]
fn live_pid_stays_running() {
    let project = Project::empty();
    // Our own pid is definitely alive
    plant_record(&project, "goal-agent-0badc0de", std::process::id() as i32, "working\n");

    let record = status_json(&project, "goal-agent-0badc0de");
    assert_eq!(record["status"], "running");
}

#[test]
fn terminal_status_does_not_regress() {
    let project = Project::empty();
    let id = deploy(&project);
    wait_for_status(&project, &id, "completed");

    // Repeated checks leave a terminal record untouched
    let record = status_json(&project, &id);
    assert_eq!(record["status"], "completed");
    let record = status_json(&project, &id);
    assert_eq!(record["status"], "completed");
}
