// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent generation adapter.
//!
//! The goal-to-agent pipeline is an external collaborator; this module owns
//! only its seam: the [`GoalPipeline`] trait, the adapter that sequences
//! its stages and emits progress lines, and a minimal built-in
//! implementation so the workload runs end to end without the external
//! system.

use crate::launch::ENTRY_POINT;
use crate::logs::DeploymentLogs;
use async_trait::async_trait;
use goalrun_core::{DeploymentId, Sdk};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Execution-config artifact written into the bundle directory.
pub const EXECUTION_CONFIG_FILE: &str = "agent-config.json";
/// Prompt artifact written into the bundle directory.
pub const PROMPT_FILE: &str = "prompt.md";

/// Opaque failure from a generation stage. No local recovery; the adapter
/// propagates it unchanged.
#[derive(Debug, Error)]
#[error("generation pipeline error: {0}")]
pub struct PipelineError(pub String);

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        Self(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct GoalAnalysis {
    pub domain: String,
    pub complexity: String,
}

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub phases: Vec<String>,
    pub total_estimated_duration: String,
}

#[derive(Debug, Clone)]
pub struct SkillSynthesis {
    pub skills: Vec<String>,
    pub sdk_tools: Vec<String>,
}

/// Assembled agent bundle, ready for packaging.
#[derive(Debug, Clone)]
pub struct AgentBundle {
    pub name: String,
    pub sdk: Sdk,
    pub enable_memory: bool,
    pub goal_text: String,
    pub phases: Vec<String>,
    pub skills: Vec<String>,
    pub sdk_tools: Vec<String>,
}

/// Inputs to bundle assembly beyond the earlier stage outputs.
#[derive(Debug, Clone, Copy)]
pub struct BundleSpec<'a> {
    pub name: &'a str,
    pub sdk: Sdk,
    pub enable_memory: bool,
    pub goal_path: &'a Path,
}

/// The external generation pipeline, stage by stage.
#[async_trait]
pub trait GoalPipeline: Send + Sync {
    async fn analyze(&self, goal_path: &Path) -> Result<GoalAnalysis, PipelineError>;
    async fn plan(&self, analysis: &GoalAnalysis) -> Result<ExecutionPlan, PipelineError>;
    async fn synthesize(
        &self,
        plan: &ExecutionPlan,
        sdk: Sdk,
    ) -> Result<SkillSynthesis, PipelineError>;
    async fn assemble(
        &self,
        analysis: &GoalAnalysis,
        plan: &ExecutionPlan,
        synthesis: &SkillSynthesis,
        spec: BundleSpec<'_>,
    ) -> Result<AgentBundle, PipelineError>;
    /// Materialize the bundle into `output_dir`, returning the directory
    /// containing the entry point.
    async fn package(
        &self,
        bundle: &AgentBundle,
        output_dir: &Path,
    ) -> Result<PathBuf, PipelineError>;
}

/// Drive the pipeline stages in order, appending a progress line after
/// each. Stage failures propagate unchanged; lines appended before the
/// failure remain in the buffer for diagnosis.
pub async fn generate_agent(
    pipeline: &dyn GoalPipeline,
    id: &DeploymentId,
    goal_path: &Path,
    sdk: Sdk,
    enable_memory: bool,
    output_dir: &Path,
    logs: &DeploymentLogs,
) -> Result<PathBuf, PipelineError> {
    let analysis = pipeline.analyze(goal_path).await?;
    logs.append(
        id,
        format!("Goal analyzed: domain={}, complexity={}", analysis.domain, analysis.complexity),
    );

    let plan = pipeline.plan(&analysis).await?;
    logs.append(
        id,
        format!(
            "Execution plan: {} phases, est. {}",
            plan.phases.len(),
            plan.total_estimated_duration
        ),
    );

    let synthesis = pipeline.synthesize(&plan, sdk).await?;
    logs.append(
        id,
        format!(
            "Matched {} skills, {} SDK tools",
            synthesis.skills.len(),
            synthesis.sdk_tools.len()
        ),
    );

    let spec = BundleSpec { name: id.as_str(), sdk, enable_memory, goal_path };
    let bundle = pipeline.assemble(&analysis, &plan, &synthesis, spec).await?;

    let agent_dir = pipeline.package(&bundle, output_dir).await?;
    logs.append(id, "Agent bundle packaged");

    Ok(agent_dir)
}

/// Built-in pipeline producing a minimal runnable bundle: a shell entry
/// point that prints the prompt and reports completion, plus the config
/// and prompt artifacts. Stands in for the external generator in local
/// runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptPipeline;

#[async_trait]
impl GoalPipeline for ScriptPipeline {
    async fn analyze(&self, goal_path: &Path) -> Result<GoalAnalysis, PipelineError> {
        let text = tokio::fs::read_to_string(goal_path).await?;
        let line_count = text.lines().count();
        let complexity = if line_count > 40 {
            "high"
        } else if line_count > 15 {
            "medium"
        } else {
            "low"
        };
        Ok(GoalAnalysis { domain: "general".to_string(), complexity: complexity.to_string() })
    }

    async fn plan(&self, _analysis: &GoalAnalysis) -> Result<ExecutionPlan, PipelineError> {
        let phases = vec!["gather".to_string(), "execute".to_string(), "report".to_string()];
        let total_estimated_duration = format!("{}m", phases.len() * 5);
        Ok(ExecutionPlan { phases, total_estimated_duration })
    }

    async fn synthesize(
        &self,
        _plan: &ExecutionPlan,
        sdk: Sdk,
    ) -> Result<SkillSynthesis, PipelineError> {
        Ok(SkillSynthesis {
            skills: vec!["file-io".to_string(), "summarize".to_string()],
            sdk_tools: vec![format!("{}-bash", sdk), format!("{}-read", sdk)],
        })
    }

    async fn assemble(
        &self,
        _analysis: &GoalAnalysis,
        plan: &ExecutionPlan,
        synthesis: &SkillSynthesis,
        spec: BundleSpec<'_>,
    ) -> Result<AgentBundle, PipelineError> {
        let goal_text = tokio::fs::read_to_string(spec.goal_path).await?;
        Ok(AgentBundle {
            name: spec.name.to_string(),
            sdk: spec.sdk,
            enable_memory: spec.enable_memory,
            goal_text,
            phases: plan.phases.clone(),
            skills: synthesis.skills.clone(),
            sdk_tools: synthesis.sdk_tools.clone(),
        })
    }

    async fn package(
        &self,
        bundle: &AgentBundle,
        output_dir: &Path,
    ) -> Result<PathBuf, PipelineError> {
        tokio::fs::create_dir_all(output_dir).await?;

        tokio::fs::write(output_dir.join(PROMPT_FILE), &bundle.goal_text).await?;

        let config = serde_json::json!({
            "name": bundle.name,
            "sdk": bundle.sdk.to_string(),
            "enable_memory": bundle.enable_memory,
            "phases": bundle.phases,
            "skills": bundle.skills,
            "sdk_tools": bundle.sdk_tools,
        });
        let config_json =
            serde_json::to_vec_pretty(&config).map_err(|e| PipelineError(e.to_string()))?;
        tokio::fs::write(output_dir.join(EXECUTION_CONFIG_FILE), config_json).await?;

        let script = "#!/bin/sh\n\
            echo \"Agent ${GOALRUN_DEPLOYMENT_ID:-unknown} starting (max turns: ${GOALRUN_MAX_TURNS:-15})\"\n\
            cat prompt.md\n\
            echo \"Goal achieved!\"\n";
        let entry = output_dir.join(ENTRY_POINT);
        tokio::fs::write(&entry, script).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&entry, std::fs::Permissions::from_mode(0o755)).await?;
        }

        Ok(output_dir.to_path_buf())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
