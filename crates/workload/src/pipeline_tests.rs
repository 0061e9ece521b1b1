// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the generation adapter and built-in pipeline

use super::*;

fn id() -> DeploymentId {
    DeploymentId::from("goal-agent-abcd1234")
}

fn goal_file(dir: &Path) -> PathBuf {
    let path = dir.join("goal.md");
    std::fs::write(&path, "# Collect data\n\n## Goal\nCollect and summarize.\n")
        .expect("write goal");
    path
}

#[tokio::test]
async fn adapter_sequences_stages_and_logs_progress() {
    let dir = tempfile::tempdir().unwrap();
    let goal = goal_file(dir.path());
    let logs = DeploymentLogs::new();
    let id = id();
    let output = dir.path().join(".generated").join(id.as_str());

    let agent_dir =
        generate_agent(&ScriptPipeline, &id, &goal, Sdk::Claude, false, &output, &logs)
            .await
            .unwrap();

    assert_eq!(agent_dir, output);
    assert!(agent_dir.join(ENTRY_POINT).exists());
    assert!(agent_dir.join(EXECUTION_CONFIG_FILE).exists());
    assert!(agent_dir.join(PROMPT_FILE).exists());

    let progress = logs.tail(&id, 10).join("\n");
    assert!(progress.contains("Goal analyzed: domain=general"));
    assert!(progress.contains("Execution plan: 3 phases"));
    assert!(progress.contains("Matched 2 skills, 2 SDK tools"));
    assert!(progress.contains("Agent bundle packaged"));
}

#[tokio::test]
async fn packaged_config_records_sdk_and_memory_flag() {
    let dir = tempfile::tempdir().unwrap();
    let goal = goal_file(dir.path());
    let logs = DeploymentLogs::new();
    let id = id();
    let output = dir.path().join("out");

    generate_agent(&ScriptPipeline, &id, &goal, Sdk::Copilot, true, &output, &logs)
        .await
        .unwrap();

    let config: serde_json::Value = serde_json::from_slice(
        &std::fs::read(output.join(EXECUTION_CONFIG_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(config["sdk"], "copilot");
    assert_eq!(config["enable_memory"], true);
    assert_eq!(config["name"], id.as_str());
}

#[tokio::test]
async fn prompt_artifact_carries_goal_text() {
    let dir = tempfile::tempdir().unwrap();
    let goal = goal_file(dir.path());
    let logs = DeploymentLogs::new();
    let output = dir.path().join("out");

    generate_agent(&ScriptPipeline, &id(), &goal, Sdk::Claude, false, &output, &logs)
        .await
        .unwrap();

    let prompt = std::fs::read_to_string(output.join(PROMPT_FILE)).unwrap();
    assert!(prompt.starts_with("# Collect data"));
}

struct FailingPipeline;

#[async_trait]
impl GoalPipeline for FailingPipeline {
    async fn analyze(&self, _goal_path: &Path) -> Result<GoalAnalysis, PipelineError> {
        Ok(GoalAnalysis { domain: "general".into(), complexity: "low".into() })
    }

    async fn plan(&self, _analysis: &GoalAnalysis) -> Result<ExecutionPlan, PipelineError> {
        Err(PipelineError("planner unavailable".into()))
    }

    async fn synthesize(
        &self,
        _plan: &ExecutionPlan,
        _sdk: Sdk,
    ) -> Result<SkillSynthesis, PipelineError> {
        unreachable!("synthesize should not be reached after plan fails")
    }

    async fn assemble(
        &self,
        _analysis: &GoalAnalysis,
        _plan: &ExecutionPlan,
        _synthesis: &SkillSynthesis,
        _spec: BundleSpec<'_>,
    ) -> Result<AgentBundle, PipelineError> {
        unreachable!()
    }

    async fn package(
        &self,
        _bundle: &AgentBundle,
        _output_dir: &Path,
    ) -> Result<PathBuf, PipelineError> {
        unreachable!()
    }
}

#[tokio::test]
async fn stage_failure_propagates_and_keeps_prior_progress() {
    let dir = tempfile::tempdir().unwrap();
    let goal = goal_file(dir.path());
    let logs = DeploymentLogs::new();
    let id = id();

    let err = generate_agent(
        &FailingPipeline,
        &id,
        &goal,
        Sdk::Claude,
        false,
        &dir.path().join("out"),
        &logs,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("planner unavailable"));
    // The analyze progress line survives for diagnosis
    assert!(logs.tail(&id, 10).join("\n").contains("Goal analyzed"));
}
