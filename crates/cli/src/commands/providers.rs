// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stagecraft providers`

use anyhow::Result;
use clap::Args;
use stagecraft_providers::{register_builtins, Registries};

#[derive(Args)]
pub struct ProvidersArgs {}

pub fn run(_args: &ProvidersArgs, json: bool) -> Result<()> {
    let registries = Registries::new();
    register_builtins(&registries);

    let kinds = [
        ("backend", registries.backend.ids()),
        ("migration", registries.migration.ids()),
        ("cloud", registries.cloud.ids()),
        ("secrets", registries.secrets.ids()),
        ("network", registries.network.ids()),
    ];

    if json {
        let value: serde_json::Map<String, serde_json::Value> = kinds
            .iter()
            .map(|(kind, ids)| (kind.to_string(), serde_json::json!(ids)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for (kind, ids) in &kinds {
            if ids.is_empty() {
                println!("{}: (none)", kind);
            } else {
                println!("{}: {}", kind, ids.join(", "));
            }
        }
    }
    Ok(())
}
