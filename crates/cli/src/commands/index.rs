// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft index`

use anyhow::Result;
use clap::Args;
use stagecraft_context::{build_index, write_index, IndexOptions};
use std::path::PathBuf;

#[derive(Args)]
pub struct IndexArgs {
    /// Repository root
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Cache directory receiving `<repo>/data/index.json`
    #[arg(long, default_value = ".xraycache", value_name = "DIR")]
    pub cache_root: PathBuf,

    /// Extra ignore file (one path prefix per line)
    #[arg(long, value_name = "PATH")]
    pub ignore_file: Option<PathBuf>,
}

pub fn run(args: &IndexArgs, json: bool) -> Result<()> {
    let root = args.root.canonicalize()?;
    let options = IndexOptions {
        ignore_file: args.ignore_file.clone(),
        ..Default::default()
    };
    let index = build_index(&root, &options)?;
    let path = write_index(&index, &args.cache_root)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
    } else {
        println!(
            "{} files, {} bytes, digest {}",
            index.file_count, index.total_size, index.digest,
        );
        println!("{}", path.display());
    }
    Ok(())
}
