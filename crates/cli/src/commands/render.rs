// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft render`

use anyhow::{bail, Context, Result};
use clap::Args;
use stagecraft_compose::{render, ComposeDocument, RenderOptions};
use stagecraft_config::ProjectConfig;
use stagecraft_context::write_atomic;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct RenderArgs {
    /// Target environment
    #[arg(short = 'e', long)]
    pub environment: String,

    /// Render for this host's roles (default: no role filtering)
    #[arg(long, value_name = "HOST_ID")]
    pub host: Option<String>,

    /// Base compose document
    #[arg(long, default_value = "compose.yml")]
    pub base_compose: PathBuf,

    /// Write the rendered document here instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Fail unless the emitted bytes hash to this SHA-256
    #[arg(long, value_name = "HEX64")]
    pub expect_hash: Option<String>,
}

pub fn run(args: &RenderArgs, config_path: &Path) -> Result<()> {
    let config = ProjectConfig::load(config_path)?;
    let env = config.environment(&args.environment)?;

    let host_roles: Vec<String> = match &args.host {
        Some(id) => {
            let Some(host) = env.hosts.iter().find(|h| h.id == id.as_str()) else {
                bail!("host `{}` is not in environment `{}`", id, args.environment);
            };
            host.roles.clone()
        }
        None => Vec::new(),
    };

    let base = ComposeDocument::from_file(&args.base_compose)?;
    let opts = RenderOptions {
        vars: &env.vars,
        optional: &env.optional,
        host_roles: &host_roles,
    };
    let rendered = render(&base, &[], &opts)?;
    if let Some(expected) = &args.expect_hash {
        rendered.verify(expected)?;
    }

    match &args.out {
        Some(out) => {
            write_atomic(out, rendered.yaml.as_bytes())
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("{}  {}", rendered.sha256, out.display());
        }
        None => {
            print!("{}", rendered.yaml);
            eprintln!("sha256 {}", rendered.sha256);
        }
    }
    Ok(())
}
