// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft plan`

use anyhow::{Context, Result};
use clap::Args;
use stagecraft_config::ProjectConfig;
use stagecraft_context::write_atomic;
use stagecraft_core::RandomPlanIds;
use stagecraft_engine::{build_plan, PlanOptions};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PlanArgs {
    /// Target environment
    #[arg(short = 'e', long)]
    pub environment: String,

    /// Base compose document, relative to the project root
    #[arg(long, default_value = "compose.yml")]
    pub base_compose: String,

    /// Write the plan as JSON to this path
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub fn run(args: &PlanArgs, config_path: &Path, json: bool) -> Result<()> {
    let config = ProjectConfig::load(config_path)?;
    let options = PlanOptions {
        base_compose_path: args.base_compose.clone(),
        ..Default::default()
    };
    let plan = build_plan(&config, &args.environment, &options, &RandomPlanIds)?;

    if let Some(out) = &args.out {
        let mut bytes = serde_json::to_vec_pretty(&plan)?;
        bytes.push(b'\n');
        write_atomic(out, &bytes)
            .with_context(|| format!("failed to write {}", out.display()))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("plan {} for {}", plan.id, plan.environment);
        println!("digest {}", plan.digest);
        for host_plan in &plan.host_plans {
            println!("  host {} ({} steps)", host_plan.host.id, host_plan.steps.len());
            for step in &host_plan.steps {
                println!("    {:>2}. {} [{}]", step.index + 1, step.id, step.action);
            }
        }
    }
    Ok(())
}
