// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `goalrun` — deploy goal-driven agents as detached processes and manage
//! their lifecycle.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod exit_error;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use goalrun_core::DeploymentId;
use goalrun_storage::FsStateStore;
use goalrun_workload::{GoalWorkload, ScriptPipeline};
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "goalrun", version, about = "Deploy and supervise goal-driven agents")]
struct Cli {
    /// Directory agent bundles are generated under
    #[arg(long, global = true, default_value = ".")]
    workdir: PathBuf,

    /// Where deployment records live (defaults to the platform state dir)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an agent from a goal and launch it detached
    Deploy(commands::deploy::ConfigArgs),
    /// Check a deploy configuration without launching anything
    Validate(commands::deploy::ConfigArgs),
    /// Show one deployment, reconciling its liveness first
    Status {
        deployment_id: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List all known deployments
    List {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Stop a running deployment (SIGTERM, then SIGKILL)
    Stop { deployment_id: String },
    /// Resume a stopped deployment (always refused; redeploy instead)
    Start { deployment_id: String },
    /// Tear down a deployment's process, temp files, and log buffers
    Cleanup {
        deployment_id: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print or follow a deployment's logs
    Logs {
        deployment_id: String,
        /// Keep streaming until the deployment reaches a terminal status
        #[arg(short, long)]
        follow: bool,
        /// Tail length per stream
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                ExitCode::from(exit.code.clamp(1, 255) as u8)
            }
            None => {
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state_dir = match &cli.state_dir {
        Some(dir) => dir.clone(),
        None => default_state_dir()?,
    };
    let store = Arc::new(FsStateStore::new(state_dir));
    let workload = GoalWorkload::new(cli.workdir.clone(), store.clone(), Arc::new(ScriptPipeline));

    match cli.command {
        Command::Deploy(args) => commands::deploy::deploy(&workload, &args).await,
        Command::Validate(args) => commands::deploy::validate(&workload, &args).await,
        Command::Status { deployment_id, format } => {
            commands::status::status(&workload, &DeploymentId::from_string(deployment_id), format)
                .await
        }
        Command::List { format } => {
            commands::status::list(&workload, store.as_ref(), format).await
        }
        Command::Stop { deployment_id } => {
            commands::lifecycle::stop(&workload, &DeploymentId::from_string(deployment_id)).await
        }
        Command::Start { deployment_id } => {
            commands::lifecycle::start(&workload, &DeploymentId::from_string(deployment_id)).await
        }
        Command::Cleanup { deployment_id, format } => {
            commands::lifecycle::cleanup(
                &workload,
                &DeploymentId::from_string(deployment_id),
                format,
            )
            .await
        }
        Command::Logs { deployment_id, follow, lines } => {
            commands::logs::logs(
                &workload,
                &DeploymentId::from_string(deployment_id),
                follow,
                lines,
            )
            .await
        }
    }
}

fn default_state_dir() -> anyhow::Result<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("goalrun"))
        .ok_or_else(|| anyhow::anyhow!("could not determine a state directory; pass --state-dir"))
}
