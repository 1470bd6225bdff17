// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stagecraft - deployment orchestration CLI

mod commands;
mod exit;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, context, deploy, index, migrate, plan, providers, render};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stagecraft",
    version,
    about = "Turn a declarative project description into deterministic deployments"
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Project configuration file
    #[arg(long, global = true, default_value = "stagecraft.yml", value_name = "PATH")]
    config: PathBuf,

    /// Emit JSON instead of text where applicable
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the execution plan for an environment
    Plan(plan::PlanArgs),
    /// Execute the plan for an environment
    Deploy(deploy::DeployArgs),
    /// Render the compose document for one host
    Render(render::RenderArgs),
    /// Migration operations
    Migrate(migrate::MigrateArgs),
    /// Build the .ai-context bundle
    Context(context::ContextArgs),
    /// Build the repository index
    Index(index::IndexArgs),
    /// Governance checks
    Check(check::CheckArgs),
    /// List registered providers per kind
    Providers(providers::ProvidersArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("stagecraft: {:#}", err);
            exit::exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)?;
    }
    match &cli.command {
        Commands::Plan(args) => plan::run(args, &cli.config, cli.json),
        Commands::Deploy(args) => block_on(deploy::run(args, &cli.config, cli.json)),
        Commands::Render(args) => render::run(args, &cli.config),
        Commands::Migrate(args) => block_on(migrate::run(args, &cli.config, cli.json)),
        Commands::Context(args) => context::run(args),
        Commands::Index(args) => index::run(args, cli.json),
        Commands::Check(args) => check::run(args, &cli.config, cli.json),
        Commands::Providers(args) => providers::run(args, cli.json),
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(fut: F) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(fut)
}
