// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft migrate`

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use stagecraft_config::ProjectConfig;
use stagecraft_core::inputs::Selection;
use stagecraft_core::StageError;
use stagecraft_providers::{register_builtins, MigrationRequest, Registries};
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    /// List the selected migrations
    List(CommonArgs),
    /// Show what apply would do, without touching the database
    Plan(CommonArgs),
    /// Apply the selected migrations
    Apply(CommonArgs),
}

#[derive(Args)]
pub struct CommonArgs {
    /// Target environment
    #[arg(short = 'e', long)]
    pub environment: String,

    /// Database name from configuration
    #[arg(short = 'd', long)]
    pub database: String,

    /// Select specific migration ids (repeatable); default: all
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Select migrations bearing a tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Fail when the selection matches nothing
    #[arg(long)]
    pub require_match: bool,

    /// Bound each engine operation, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl CommonArgs {
    fn selection(&self) -> Selection {
        if self.ids.is_empty() && self.tags.is_empty() {
            Selection::all()
        } else {
            let mut selection = Selection {
                all: false,
                ids: self.ids.clone(),
                tags: self.tags.clone(),
            };
            selection.normalize();
            selection
        }
    }

    fn request(&self, config: &ProjectConfig) -> Result<(String, MigrationRequest)> {
        config.environment(&self.environment)?;
        let Some(db) = config.databases.get(&self.database) else {
            bail!("unknown database `{}`", self.database);
        };
        let request = MigrationRequest {
            environment: self.environment.clone(),
            database: self.database.clone(),
            connection_env: db.connection_env.clone(),
            migrations_path: db.migrations.clone(),
            selection: self.selection(),
            fail_fast: true,
            allow_noop: !self.require_match,
            timeout_seconds: self.timeout,
            config: serde_json::Value::Object(serde_json::Map::new()),
        };
        Ok((db.engine.clone(), request))
    }
}

pub async fn run(args: &MigrateArgs, config_path: &Path, json: bool) -> Result<()> {
    let config = ProjectConfig::load(config_path)?;
    let registries = Registries::new();
    register_builtins(&registries);
    let cancel = CancellationToken::new();

    let common = match &args.command {
        MigrateCommand::List(common)
        | MigrateCommand::Plan(common)
        | MigrateCommand::Apply(common) => common,
    };
    let (engine_id, request) = common.request(&config)?;
    let engine = registries.migration.get(&engine_id)?;

    match &args.command {
        MigrateCommand::List(_) => {
            let migrations = engine.list(&cancel, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&migrations)?);
            } else {
                for migration in &migrations {
                    println!("{}", migration.id);
                }
            }
        }
        MigrateCommand::Plan(_) => {
            let plan = engine.plan(&cancel, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                for step in &plan.steps {
                    println!("{} {} {}", step.id, step.outcome, step.message);
                }
                println!(
                    "total {} applied {} skipped {}",
                    plan.summary.total, plan.summary.applied, plan.summary.skipped,
                );
            }
        }
        MigrateCommand::Apply(_) => {
            let result = engine.apply(&cancel, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for step in &result.steps {
                    println!("{} {} {}", step.id, step.outcome, step.message);
                }
                println!(
                    "total {} applied {} skipped {} failed {}",
                    result.summary.total,
                    result.summary.applied,
                    result.summary.skipped,
                    result.summary.failed,
                );
            }
            if result.summary.failed > 0 {
                return Err(StageError::MigrationFailed(format!(
                    "{} migration step(s) failed",
                    result.summary.failed,
                ))
                .into());
            }
        }
    }
    Ok(())
}
