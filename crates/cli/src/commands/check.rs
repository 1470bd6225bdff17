// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft check`

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use stagecraft_config::ProjectConfig;
use stagecraft_governance::{
    analyze, parse_frontmatter, render_json, render_text, validate_commit_subject,
    FeatureRegistry, Severity,
};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct CheckArgs {
    #[command(subcommand)]
    pub command: CheckCommand,
}

#[derive(Subcommand)]
pub enum CheckCommand {
    /// Validate stagecraft.yml without executing anything
    Config,
    /// Cross-reference the feature registry against the tree
    Features {
        /// Feature registry file
        #[arg(long, default_value = "spec/features.yaml", value_name = "PATH")]
        registry: PathBuf,
    },
    /// Validate a commit message subject
    Commit {
        /// The commit subject line
        subject: String,
        /// Current branch name, for the branch/feature cross-check
        #[arg(long, value_name = "BRANCH")]
        branch: Option<String>,
        /// Feature registry file
        #[arg(long, default_value = "spec/features.yaml", value_name = "PATH")]
        registry: PathBuf,
    },
    /// Validate a spec file's frontmatter
    Spec {
        /// Spec file to validate
        path: PathBuf,
        /// Root of the spec tree
        #[arg(long, default_value = "spec", value_name = "DIR")]
        spec_root: PathBuf,
    },
}

pub fn run(args: &CheckArgs, config_path: &Path, json: bool) -> Result<()> {
    match &args.command {
        CheckCommand::Config => {
            let config = ProjectConfig::load(config_path)?;
            println!(
                "ok: {} environment(s), {} service(s), {} database(s)",
                config.environments.len(),
                config.services.len(),
                config.databases.len(),
            );
            Ok(())
        }
        CheckCommand::Features { registry } => {
            let registry = FeatureRegistry::load(registry)?;
            let report = analyze(Path::new("."), &registry, &Default::default())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for mapping in &report.features {
                    println!(
                        "{} {} spec={} impl={} tests={}",
                        mapping.id,
                        mapping.status,
                        mapping.spec_present,
                        mapping.impl_files.len(),
                        mapping.test_files.len(),
                    );
                }
                for violation in &report.violations {
                    println!(
                        "{} {} {} {}",
                        violation.code, violation.feature, violation.path, violation.message,
                    );
                }
            }
            if !report.violations.is_empty() {
                bail!("{} violation(s)", report.violations.len());
            }
            Ok(())
        }
        CheckCommand::Commit {
            subject,
            branch,
            registry,
        } => {
            let registry = FeatureRegistry::load(registry)?;
            let violations = validate_commit_subject(subject, &registry, branch.as_deref());
            if json {
                println!("{}", serde_json::to_string(&render_json(&violations))?);
            } else {
                print!("{}", render_text(&violations));
            }
            if violations.iter().any(|v| v.severity == Severity::Error) {
                bail!("commit message rejected");
            }
            Ok(())
        }
        CheckCommand::Spec { path, spec_root } => {
            let text = std::fs::read_to_string(path)?;
            let frontmatter = parse_frontmatter(&text)?;
            let relative = path
                .strip_prefix(spec_root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            let problems = frontmatter.validate(&relative);
            for problem in &problems {
                println!("{}", problem);
            }
            if !problems.is_empty() {
                bail!("{} problem(s)", problems.len());
            }
            println!("ok: {} {}", frontmatter.feature, frontmatter.version);
            Ok(())
        }
    }
}
