// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration engine contract.
//!
//! Engines list, plan, and apply migrations against a database. `plan`
//! never mutates the target; `apply` executes steps in list order and
//! defaults to fail-fast. All messages and warnings are sanitized.

use crate::provider::Provider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stagecraft_core::inputs::Selection;
use stagecraft_core::{sanitize_message, StageError};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// A migration known to an engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Migration {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Source descriptor, typically a repo-relative file path.
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Migration {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Sort the tag set.
    pub fn normalize(&mut self) {
        self.tags.sort();
        self.tags.dedup();
    }
}

/// Outcome of one migration step.
///
/// In a plan, `applied` means "would apply" and `skipped` means "would
/// skip"; `failed` in a plan is reserved for "plan could not be
/// computed" and must propagate as an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    Applied,
    Skipped,
    Failed,
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOutcome::Applied => write!(f, "applied"),
            MigrationOutcome::Skipped => write!(f, "skipped"),
            MigrationOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one step, with sanitized message and sorted warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationStepResult {
    pub id: String,
    pub outcome: MigrationOutcome,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl MigrationStepResult {
    pub fn new(
        id: impl Into<String>,
        outcome: MigrationOutcome,
        message: impl AsRef<str>,
    ) -> Self {
        Self {
            id: id.into(),
            outcome,
            message: sanitize_message(message.as_ref()),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        let mut warnings: Vec<String> =
            warnings.iter().map(|w| sanitize_message(w)).collect();
        warnings.sort();
        self.warnings = warnings;
        self
    }
}

/// Counters over the steps of a plan or apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub total: u64,
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// A computed migration plan (no mutation happened).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub engine: String,
    pub environment: String,
    pub steps: Vec<MigrationStepResult>,
    pub summary: MigrationSummary,
}

/// The result of applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationApplyResult {
    pub engine: String,
    pub environment: String,
    pub steps: Vec<MigrationStepResult>,
    pub summary: MigrationSummary,
}

/// Result of an engine's optional validate operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Everything an engine needs for one operation.
#[derive(Debug, Clone)]
pub struct MigrationRequest {
    pub environment: String,
    pub database: String,
    /// Name of the environment variable holding the connection string.
    /// Engines read the variable themselves; the value never travels
    /// through requests or results.
    pub connection_env: String,
    pub migrations_path: String,
    pub selection: Selection,
    pub fail_fast: bool,
    pub allow_noop: bool,
    pub timeout_seconds: Option<u64>,
    pub config: serde_json::Value,
}

/// The contract every migration engine fulfills.
#[async_trait]
pub trait MigrationEngine: Provider {
    /// Migrations matching the request selection, sorted by id.
    async fn list(
        &self,
        ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<Vec<Migration>, StageError>;

    /// Compute what `apply` would do, without mutating the target.
    async fn plan(
        &self,
        ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<MigrationPlan, StageError>;

    /// Execute the selected migrations in list order.
    async fn apply(
        &self,
        ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<MigrationApplyResult, StageError>;

    /// Optional pre-flight validation of the migration set.
    async fn validate(
        &self,
        _ctx: &CancellationToken,
        _req: &MigrationRequest,
    ) -> Result<ValidationResult, StageError> {
        Err(StageError::Unsupported(format!(
            "engine `{}` does not implement validate",
            self.id(),
        )))
    }

    /// Engines opt in to continuing past failures when they can
    /// guarantee safety; the default is fail-fast.
    fn supports_continue_on_error(&self) -> bool {
        false
    }
}

/// Resolve a selection against the full migration set.
///
/// `all = true` ignores `ids` and `tags`; otherwise the result is the
/// union of id matches and tag matches. The result is sorted by id.
pub fn resolve_selection(migrations: &[Migration], selection: &Selection) -> Vec<Migration> {
    let mut selected: Vec<Migration> = if selection.all {
        migrations.to_vec()
    } else {
        migrations
            .iter()
            .filter(|m| {
                selection.ids.iter().any(|id| id == &m.id)
                    || m.tags.iter().any(|t| selection.tags.contains(t))
            })
            .cloned()
            .collect()
    };
    selected.sort_by(|a, b| a.id.cmp(&b.id));
    selected.dedup_by(|a, b| a.id == b.id);
    selected
}

/// Enforce the no-op policy: an empty selection fails unless allowed.
pub fn check_noop(selected: usize, allow_noop: bool) -> Result<(), StageError> {
    if selected == 0 && !allow_noop {
        return Err(StageError::MigrationFailed(
            "selection matched no migrations and noop is not allowed".to_string(),
        ));
    }
    Ok(())
}

/// Build the summary counters for a step list.
///
/// `total` counts the selected migrations, which can exceed the number
/// of executed steps when a fail-fast apply halted early.
pub fn summarize(total: usize, steps: &[MigrationStepResult]) -> MigrationSummary {
    let mut summary = MigrationSummary {
        total: total as u64,
        ..Default::default()
    };
    for step in steps {
        match step.outcome {
            MigrationOutcome::Applied => summary.applied += 1,
            MigrationOutcome::Skipped => summary.skipped += 1,
            MigrationOutcome::Failed => summary.failed += 1,
        }
    }
    summary
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
