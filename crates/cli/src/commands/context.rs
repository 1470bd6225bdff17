// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft context`

use anyhow::Result;
use clap::Args;
use stagecraft_context::{build_bundle, build_index, IndexOptions};
use std::path::PathBuf;

#[derive(Args)]
pub struct ContextArgs {
    /// Repository root
    #[arg(default_value = ".")]
    pub root: PathBuf,
}

pub fn run(args: &ContextArgs) -> Result<()> {
    let root = args.root.canonicalize()?;
    let index = build_index(&root, &IndexOptions::default())?;
    let paths = build_bundle(&root, &index)?;
    let digest = std::fs::read_to_string(&paths.digest)?;
    println!("{} files, digest {}", index.file_count, digest.trim());
    println!("{}", paths.dir.display());
    Ok(())
}
