// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builtin action executors.
//!
//! One executor per [`StepAction`], each re-decoding its inputs
//! strictly, re-validating, and dispatching to the provider registries
//! or the compose engine.

use crate::error::{with_timeout, ActionError};
use crate::executor::{ActionExecutor, ExecutorRegistry};
use async_trait::async_trait;
use stagecraft_compose::{render, ComposeDocument, RenderOptions};
use stagecraft_config::{ProjectConfig, ProviderSection};
use stagecraft_context::write_atomic;
use stagecraft_core::inputs::decode_validated;
use stagecraft_core::{
    ApplyComposeInputs, BuildInputs, HealthCheckInputs, HostPlanStep, MigrateInputs, MigrateMode,
    RenderComposeInputs, RolloutInputs, RolloutStrategy, StageError, StepAction,
};
use stagecraft_providers::process::{check_status, run_cancellable, COMPOSE_COMMAND_TIMEOUT};
use stagecraft_providers::{BuildRequest, MigrationRequest, Registries};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Shared context for one invocation's action executors.
pub struct ActionContext {
    pub project_root: PathBuf,
    pub environment: String,
    pub config: ProjectConfig,
    pub registries: Arc<Registries>,
}

impl ActionContext {
    /// Compose project name: configured project, environment otherwise.
    fn compose_project(&self) -> &str {
        if self.config.project.is_empty() {
            &self.environment
        } else {
            &self.config.project
        }
    }
}

/// Build the full executor registry over one action context.
pub fn builtin_executors(ctx: Arc<ActionContext>) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    registry.insert(StepAction::Build, Arc::new(BuildExecutor { ctx: ctx.clone() }));
    registry.insert(
        StepAction::RenderCompose,
        Arc::new(RenderComposeExecutor { ctx: ctx.clone() }),
    );
    registry.insert(
        StepAction::ApplyCompose,
        Arc::new(ApplyComposeExecutor { ctx: ctx.clone() }),
    );
    registry.insert(StepAction::Migrate, Arc::new(MigrateExecutor { ctx: ctx.clone() }));
    registry.insert(
        StepAction::HealthCheck,
        Arc::new(HealthCheckExecutor { ctx: ctx.clone() }),
    );
    registry.insert(StepAction::Rollout, Arc::new(RolloutExecutor { ctx }));
    registry
}

/// The selected provider's opaque config block, as JSON.
fn provider_config(section: &ProviderSection) -> Result<serde_json::Value, StageError> {
    match section.providers.get(&section.provider) {
        Some(value) => serde_json::to_value(value).map_err(|e| {
            StageError::InvalidConfig(format!(
                "provider `{}` config: {}",
                section.provider, e,
            ))
        }),
        None => Ok(serde_json::Value::Object(serde_json::Map::new())),
    }
}

// --- build ---

pub struct BuildExecutor {
    ctx: Arc<ActionContext>,
}

#[async_trait]
impl ActionExecutor for BuildExecutor {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        _step: &HostPlanStep,
        inputs: &[u8],
    ) -> Result<(), ActionError> {
        let inputs = decode_validated::<BuildInputs>(inputs).map_err(StageError::from)?;
        let section = self.ctx.config.backend.as_ref().ok_or_else(|| {
            StageError::InvalidConfig("no `backend` section configured".to_string())
        })?;
        let provider = self
            .ctx
            .registries
            .backend
            .get(&section.provider)
            .map_err(StageError::from)?;
        let request = BuildRequest {
            environment: self.ctx.environment.clone(),
            inputs,
            config: provider_config(section)?,
        };
        tracing::info!(service = %request.inputs.service, provider = %section.provider, "building");
        let facts = provider.build(cancel, &request).await?;
        tracing::info!(service = %request.inputs.service, facts = facts.len(), "build complete");
        Ok(())
    }
}

// --- render_compose ---

pub struct RenderComposeExecutor {
    ctx: Arc<ActionContext>,
}

#[async_trait]
impl ActionExecutor for RenderComposeExecutor {
    async fn execute(
        &self,
        _cancel: &CancellationToken,
        step: &HostPlanStep,
        inputs: &[u8],
    ) -> Result<(), ActionError> {
        let inputs = decode_validated::<RenderComposeInputs>(inputs).map_err(StageError::from)?;
        let env = self
            .ctx
            .config
            .environment(&inputs.environment)
            .map_err(StageError::from)?;

        let base = match (&inputs.base_compose_path, &inputs.base_compose_inline) {
            (Some(path), _) => ComposeDocument::from_file(&self.ctx.project_root.join(path))
                .map_err(StageError::from)?,
            (_, Some(inline)) => ComposeDocument::parse(inline).map_err(StageError::from)?,
            _ => {
                return Err(StageError::InvalidConfig(
                    "render_compose inputs carry no base document".to_string(),
                )
                .into());
            }
        };

        let mut overlays = Vec::with_capacity(inputs.overlays.len());
        for spec in &inputs.overlays {
            let doc = match (&spec.path, &spec.inline) {
                (Some(path), _) => ComposeDocument::from_file(&self.ctx.project_root.join(path))
                    .map_err(StageError::from)?,
                (_, Some(inline)) => ComposeDocument::parse(inline).map_err(StageError::from)?,
                _ => {
                    return Err(StageError::InvalidConfig(format!(
                        "overlay `{}` carries no document",
                        spec.name,
                    ))
                    .into());
                }
            };
            overlays.push((spec.name.clone(), doc));
        }

        let opts = RenderOptions {
            vars: &env.vars,
            optional: &env.optional,
            host_roles: &inputs.host_roles,
        };
        let rendered = render(&base, &overlays, &opts).map_err(StageError::from)?;
        if let Some(expected) = &inputs.expected_compose_hash {
            rendered.verify(expected).map_err(StageError::from)?;
        }
        if let Some(output_path) = &inputs.output_path {
            let path = self.ctx.project_root.join(output_path);
            write_atomic(&path, rendered.yaml.as_bytes()).map_err(|e| {
                StageError::ExecutionError(format!(
                    "failed to write {}: {}",
                    path.display(),
                    e,
                ))
            })?;
        }
        tracing::info!(step = %step.id, sha256 = %rendered.sha256, "compose rendered");
        Ok(())
    }
}

// --- apply_compose ---

pub struct ApplyComposeExecutor {
    ctx: Arc<ActionContext>,
}

#[async_trait]
impl ActionExecutor for ApplyComposeExecutor {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        _step: &HostPlanStep,
        inputs: &[u8],
    ) -> Result<(), ActionError> {
        let inputs = decode_validated::<ApplyComposeInputs>(inputs).map_err(StageError::from)?;
        let mut cmd = Command::new("docker");
        cmd.arg("compose")
            .arg("-f")
            .arg(self.ctx.project_root.join(&inputs.compose_path))
            .arg("-p")
            .arg(
                inputs
                    .project_name
                    .as_deref()
                    .unwrap_or_else(|| self.ctx.compose_project()),
            )
            .arg("up")
            .arg("-d");
        if inputs.remove_orphans {
            cmd.arg("--remove-orphans");
        }
        for service in &inputs.services {
            cmd.arg(service);
        }
        let output =
            run_cancellable(cancel, cmd, COMPOSE_COMMAND_TIMEOUT, "docker compose up").await?;
        check_status(&output, "docker compose up")?;
        Ok(())
    }
}

// --- migrate ---

pub struct MigrateExecutor {
    ctx: Arc<ActionContext>,
}

#[async_trait]
impl ActionExecutor for MigrateExecutor {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        _step: &HostPlanStep,
        inputs: &[u8],
    ) -> Result<(), ActionError> {
        let inputs = decode_validated::<MigrateInputs>(inputs).map_err(StageError::from)?;
        let db = self.ctx.config.databases.get(&inputs.database).ok_or_else(|| {
            StageError::InvalidConfig(format!("unknown database `{}`", inputs.database))
        })?;
        let engine = self
            .ctx
            .registries
            .migration
            .get(&inputs.engine)
            .map_err(StageError::from)?;
        let request = MigrationRequest {
            environment: self.ctx.environment.clone(),
            database: inputs.database.clone(),
            connection_env: db.connection_env.clone(),
            migrations_path: self
                .ctx
                .project_root
                .join(&db.migrations)
                .display()
                .to_string(),
            selection: inputs.selection.clone(),
            fail_fast: inputs.fail_fast,
            allow_noop: inputs.allow_noop,
            timeout_seconds: inputs.timeout_seconds,
            config: serde_json::Value::Object(serde_json::Map::new()),
        };

        with_timeout(inputs.timeout_seconds, async {
            match inputs.mode {
                MigrateMode::Plan => {
                    let plan = engine.plan(cancel, &request).await?;
                    tracing::info!(
                        engine = %inputs.engine,
                        total = plan.summary.total,
                        applied = plan.summary.applied,
                        skipped = plan.summary.skipped,
                        "migration plan computed"
                    );
                    Ok(())
                }
                MigrateMode::Apply => {
                    let result = engine.apply(cancel, &request).await?;
                    tracing::info!(
                        engine = %inputs.engine,
                        total = result.summary.total,
                        applied = result.summary.applied,
                        failed = result.summary.failed,
                        "migrations applied"
                    );
                    if result.summary.failed > 0 {
                        let message = result
                            .steps
                            .iter()
                            .find(|s| {
                                s.outcome == stagecraft_providers::MigrationOutcome::Failed
                            })
                            .map(|s| s.message.clone())
                            .unwrap_or_else(|| "migration step failed".to_string());
                        return Err(StageError::MigrationFailed(message));
                    }
                    Ok(())
                }
            }
        })
        .await
    }
}

// --- health_check ---

pub struct HealthCheckExecutor {
    ctx: Arc<ActionContext>,
}

impl HealthCheckExecutor {
    /// Names of compose services currently running.
    async fn running_services(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, StageError> {
        let mut cmd = Command::new("docker");
        cmd.arg("compose")
            .arg("-p")
            .arg(self.ctx.compose_project())
            .arg("ps")
            .arg("--services")
            .arg("--status")
            .arg("running");
        let output = run_cancellable(
            cancel,
            cmd,
            stagecraft_providers::process::HEALTH_PROBE_TIMEOUT,
            "docker compose ps",
        )
        .await?;
        check_status(&output, "docker compose ps")?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

#[async_trait]
impl ActionExecutor for HealthCheckExecutor {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        _step: &HostPlanStep,
        inputs: &[u8],
    ) -> Result<(), ActionError> {
        let inputs = decode_validated::<HealthCheckInputs>(inputs).map_err(StageError::from)?;
        if !inputs.endpoints.is_empty() {
            return Err(StageError::Unsupported(
                "endpoint probes require a network provider".to_string(),
            )
            .into());
        }
        let interval = std::time::Duration::from_secs(inputs.interval_seconds.unwrap_or(2));

        with_timeout(inputs.timeout_seconds, async {
            loop {
                let running = self.running_services(cancel).await?;
                let mut missing: Vec<&String> = inputs
                    .services
                    .iter()
                    .filter(|s| !running.contains(s))
                    .collect();
                missing.sort();
                if missing.is_empty() {
                    return Ok(());
                }
                if inputs.timeout_seconds.is_none() {
                    return Err(StageError::ExecutionError(format!(
                        "services not running: {}",
                        missing
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    )));
                }
                tracing::debug!(waiting = missing.len(), "services not healthy yet");
                tokio::time::sleep(interval).await;
            }
        })
        .await
    }
}

// --- rollout ---

pub struct RolloutExecutor {
    ctx: Arc<ActionContext>,
}

#[async_trait]
impl ActionExecutor for RolloutExecutor {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        _step: &HostPlanStep,
        inputs: &[u8],
    ) -> Result<(), ActionError> {
        let inputs = decode_validated::<RolloutInputs>(inputs).map_err(StageError::from)?;
        let batch_size = inputs
            .batch_size
            .map(|b| b as usize)
            .unwrap_or(inputs.services.len().max(1));

        for batch in inputs.services.chunks(batch_size) {
            let mut cmd = Command::new("docker");
            cmd.arg("compose")
                .arg("-p")
                .arg(self.ctx.compose_project())
                .arg("up")
                .arg("-d")
                .arg("--no-deps");
            if inputs.strategy == RolloutStrategy::Recreate {
                cmd.arg("--force-recreate");
            }
            if inputs.health_gate {
                cmd.arg("--wait");
            }
            for service in batch {
                cmd.arg(service);
            }
            let description = format!("rollout batch ({})", batch.join(", "));
            let output =
                run_cancellable(cancel, cmd, COMPOSE_COMMAND_TIMEOUT, &description).await?;
            check_status(&output, &description)?;
            tracing::info!(services = %batch.join(", "), "batch rolled out");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
