// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft deploy`

use anyhow::Result;
use clap::Args;
use stagecraft_config::ProjectConfig;
use stagecraft_core::{RandomPlanIds, RunStatus, StageError};
use stagecraft_engine::{build_plan, builtin_executors, run_plan, ActionContext, PlanOptions};
use stagecraft_providers::{register_builtins, Registries};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct DeployArgs {
    /// Target environment
    #[arg(short = 'e', long)]
    pub environment: String,

    /// Base compose document, relative to the project root
    #[arg(long, default_value = "compose.yml")]
    pub base_compose: String,
}

pub async fn run(args: &DeployArgs, config_path: &Path, json: bool) -> Result<()> {
    let config = ProjectConfig::load(config_path)?;
    let options = PlanOptions {
        base_compose_path: args.base_compose.clone(),
        ..Default::default()
    };
    let plan = build_plan(&config, &args.environment, &options, &RandomPlanIds)?;

    let registries = Registries::new();
    register_builtins(&registries);
    let context = Arc::new(ActionContext {
        project_root: std::env::current_dir()?,
        environment: args.environment.clone(),
        config,
        registries: Arc::new(registries),
    });
    let executors = Arc::new(builtin_executors(context));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; cancelling");
                cancel.cancel();
            }
        });
    }

    let report = run_plan(&cancel, &plan, executors).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("plan {} {}", report.plan_id, report.status);
        for host in &report.hosts {
            println!("  host {} {}", host.host, host.status);
            for step in &host.steps {
                match &step.error {
                    Some(error) => println!(
                        "    {} {} [{}] {}",
                        step.step_id, step.status, error.code, error.message,
                    ),
                    None => println!("    {} {}", step.step_id, step.status),
                }
            }
        }
    }

    match report.status {
        RunStatus::Succeeded => Ok(()),
        status => Err(StageError::ExecutionError(format!("deploy {}", status)).into()),
    }
}
