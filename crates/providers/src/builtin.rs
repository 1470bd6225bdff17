// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bundled providers: the `generic` docker backend and the `sql`
//! migration engine.
//!
//! Registration is explicit via [`register_builtins`], called once at
//! program start.

use crate::migration::{
    check_noop, resolve_selection, summarize, Migration, MigrationApplyResult, MigrationEngine,
    MigrationOutcome, MigrationPlan, MigrationRequest, MigrationStepResult,
};
use crate::process::{
    check_status, run_cancellable, COMPOSE_COMMAND_TIMEOUT, MIGRATION_COMMAND_TIMEOUT,
};
use crate::provider::{BackendProvider, BuildRequest, Provider, Registries};
use async_trait::async_trait;
use serde::Deserialize;
use stagecraft_core::{Fact, StageError};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Register the bundled providers into the given registries.
pub fn register_builtins(registries: &Registries) {
    registries.backend.register(Arc::new(GenericBackend));
    registries.migration.register(Arc::new(SqlEngine));
}

/// Backend provider that shells out to `docker build`.
pub struct GenericBackend;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct GenericBackendConfig {
    build_tool: String,
}

impl Default for GenericBackendConfig {
    fn default() -> Self {
        Self {
            build_tool: "docker".to_string(),
        }
    }
}

impl Provider for GenericBackend {
    fn id(&self) -> &str {
        "generic"
    }
}

#[async_trait]
impl BackendProvider for GenericBackend {
    async fn build(
        &self,
        ctx: &CancellationToken,
        req: &BuildRequest,
    ) -> Result<Vec<Fact>, StageError> {
        let config: GenericBackendConfig = serde_json::from_value(req.config.clone())
            .map_err(|e| StageError::InvalidConfig(format!("generic backend config: {}", e)))?;
        let inputs = &req.inputs;
        let tag = inputs
            .image_tag
            .clone()
            .unwrap_or_else(|| format!("{}:latest", inputs.service));

        let mut cmd = Command::new(&config.build_tool);
        cmd.arg("build").arg("-t").arg(&tag);
        if let Some(dockerfile) = &inputs.dockerfile {
            cmd.arg("-f").arg(dockerfile);
        }
        for (key, value) in &inputs.build_args {
            cmd.arg("--build-arg").arg(format!("{}={}", key, value));
        }
        cmd.arg(&inputs.context_dir);

        let description = format!("build {}", inputs.service);
        let output = run_cancellable(ctx, cmd, COMPOSE_COMMAND_TIMEOUT, &description).await?;
        check_status(&output, &description)?;

        Ok(vec![Fact::new(
            format!("service/{}", inputs.service),
            "image",
            serde_json::Value::String(tag),
        )])
    }
}

/// Migration engine over a directory of `.sql` files, applied with
/// `psql`.
///
/// The connection string is read from the environment variable named by
/// the request; it never appears in results.
pub struct SqlEngine;

impl Provider for SqlEngine {
    fn id(&self) -> &str {
        "sql"
    }
}

impl SqlEngine {
    fn discover(&self, req: &MigrationRequest) -> Result<Vec<Migration>, StageError> {
        let entries = std::fs::read_dir(&req.migrations_path).map_err(|e| {
            StageError::InvalidConfig(format!(
                "cannot read migrations dir `{}`: {}",
                req.migrations_path, e,
            ))
        })?;
        let mut migrations = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StageError::InvalidConfig(format!(
                    "cannot read migrations dir `{}`: {}",
                    req.migrations_path, e,
                ))
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sql") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            migrations.push(Migration {
                id: name.to_string(),
                source: format!("{}/{}", req.migrations_path.trim_end_matches('/'), name),
                ..Default::default()
            });
        }
        Ok(resolve_selection(&migrations, &req.selection))
    }

    fn timeout(&self, req: &MigrationRequest) -> Duration {
        req.timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(MIGRATION_COMMAND_TIMEOUT)
    }
}

#[async_trait]
impl MigrationEngine for SqlEngine {
    async fn list(
        &self,
        _ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<Vec<Migration>, StageError> {
        self.discover(req)
    }

    async fn plan(
        &self,
        _ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<MigrationPlan, StageError> {
        let selected = self.discover(req)?;
        check_noop(selected.len(), req.allow_noop)?;
        let steps: Vec<MigrationStepResult> = selected
            .iter()
            .map(|m| MigrationStepResult::new(&m.id, MigrationOutcome::Applied, "would apply"))
            .collect();
        Ok(MigrationPlan {
            engine: self.id().to_string(),
            environment: req.environment.clone(),
            summary: summarize(selected.len(), &steps),
            steps,
        })
    }

    async fn apply(
        &self,
        ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<MigrationApplyResult, StageError> {
        let selected = self.discover(req)?;
        check_noop(selected.len(), req.allow_noop)?;
        let connection = std::env::var(&req.connection_env).map_err(|_| {
            StageError::InvalidConfig(format!(
                "environment variable `{}` is not set",
                req.connection_env,
            ))
        })?;

        let mut steps = Vec::with_capacity(selected.len());
        for migration in &selected {
            let mut cmd = Command::new("psql");
            cmd.arg(&connection)
                .arg("-v")
                .arg("ON_ERROR_STOP=1")
                .arg("-f")
                .arg(&migration.source);
            let description = format!("migration {}", migration.id);
            let applied = match run_cancellable(ctx, cmd, self.timeout(req), &description).await {
                Ok(output) => check_status(&output, &description),
                Err(err) => Err(err),
            };
            match applied {
                Ok(()) => steps.push(MigrationStepResult::new(
                    &migration.id,
                    MigrationOutcome::Applied,
                    "applied",
                )),
                Err(err) => {
                    steps.push(MigrationStepResult::new(
                        &migration.id,
                        MigrationOutcome::Failed,
                        err.to_string(),
                    ));
                    // Remaining steps are absent, not marked skipped
                    if req.fail_fast || !self.supports_continue_on_error() {
                        break;
                    }
                }
            }
        }
        Ok(MigrationApplyResult {
            engine: self.id().to_string(),
            environment: req.environment.clone(),
            summary: summarize(selected.len(), &steps),
            steps,
        })
    }
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
