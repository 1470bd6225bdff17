// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake providers and engines for tests.
//!
//! Enabled via the `test-support` feature so downstream crates can
//! exercise registries and the step executor without real
//! infrastructure.

use crate::migration::{
    check_noop, resolve_selection, summarize, Migration, MigrationApplyResult, MigrationEngine,
    MigrationOutcome, MigrationPlan, MigrationRequest, MigrationStepResult,
};
use crate::provider::{BackendProvider, BuildRequest, Provider};
use crate::registry::{ProviderKind, RegistryHooks};
use async_trait::async_trait;
use parking_lot::Mutex;
use stagecraft_core::{Fact, StageError};
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

/// Backend provider fake that records the services it was asked to build.
pub struct FakeBackendProvider {
    id: String,
    pub builds: Mutex<Vec<String>>,
}

impl FakeBackendProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            builds: Mutex::new(Vec::new()),
        }
    }
}

impl Provider for FakeBackendProvider {
    fn id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
impl BackendProvider for FakeBackendProvider {
    async fn build(
        &self,
        _ctx: &CancellationToken,
        req: &BuildRequest,
    ) -> Result<Vec<Fact>, StageError> {
        self.builds.lock().push(req.inputs.service.clone());
        Ok(vec![Fact::new(
            format!("service/{}", req.inputs.service),
            "built",
            serde_json::Value::Bool(true),
        )])
    }
}

/// Migration engine driven by a scripted migration set.
pub struct StaticEngine {
    id: String,
    migrations: Vec<Migration>,
    fail_ids: BTreeSet<String>,
    skip_ids: BTreeSet<String>,
}

impl StaticEngine {
    pub fn new(id: impl Into<String>, migrations: Vec<Migration>) -> Self {
        Self {
            id: id.into(),
            migrations,
            fail_ids: BTreeSet::new(),
            skip_ids: BTreeSet::new(),
        }
    }

    /// Mark a migration as failing during apply.
    pub fn failing(mut self, id: impl Into<String>) -> Self {
        self.fail_ids.insert(id.into());
        self
    }

    /// Mark a migration as already applied (skipped).
    pub fn skipping(mut self, id: impl Into<String>) -> Self {
        self.skip_ids.insert(id.into());
        self
    }
}

impl Provider for StaticEngine {
    fn id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
impl MigrationEngine for StaticEngine {
    async fn list(
        &self,
        _ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<Vec<Migration>, StageError> {
        let mut selected = resolve_selection(&self.migrations, &req.selection);
        for migration in &mut selected {
            migration.normalize();
        }
        Ok(selected)
    }

    async fn plan(
        &self,
        _ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<MigrationPlan, StageError> {
        let selected = resolve_selection(&self.migrations, &req.selection);
        check_noop(selected.len(), req.allow_noop)?;
        let steps: Vec<MigrationStepResult> = selected
            .iter()
            .map(|m| {
                if self.skip_ids.contains(&m.id) {
                    MigrationStepResult::new(&m.id, MigrationOutcome::Skipped, "already applied")
                } else {
                    MigrationStepResult::new(&m.id, MigrationOutcome::Applied, "would apply")
                }
            })
            .collect();
        Ok(MigrationPlan {
            engine: self.id.clone(),
            environment: req.environment.clone(),
            summary: summarize(selected.len(), &steps),
            steps,
        })
    }

    async fn apply(
        &self,
        _ctx: &CancellationToken,
        req: &MigrationRequest,
    ) -> Result<MigrationApplyResult, StageError> {
        let selected = resolve_selection(&self.migrations, &req.selection);
        check_noop(selected.len(), req.allow_noop)?;
        let mut steps = Vec::with_capacity(selected.len());
        for migration in &selected {
            if self.skip_ids.contains(&migration.id) {
                steps.push(MigrationStepResult::new(
                    &migration.id,
                    MigrationOutcome::Skipped,
                    "already applied",
                ));
                continue;
            }
            if self.fail_ids.contains(&migration.id) {
                steps.push(MigrationStepResult::new(
                    &migration.id,
                    MigrationOutcome::Failed,
                    format!("migration {} failed", migration.id),
                ));
                // Remaining steps are absent, not marked skipped
                if req.fail_fast || !self.supports_continue_on_error() {
                    break;
                }
                continue;
            }
            steps.push(MigrationStepResult::new(
                &migration.id,
                MigrationOutcome::Applied,
                "applied",
            ));
        }
        Ok(MigrationApplyResult {
            engine: self.id.clone(),
            environment: req.environment.clone(),
            summary: summarize(selected.len(), &steps),
            steps,
        })
    }
}

/// Registry hooks that record events for assertions.
#[derive(Default)]
pub struct RecordingHooks {
    pub events: Mutex<Vec<String>>,
}

impl RegistryHooks for RecordingHooks {
    fn on_provider_registered(&self, kind: ProviderKind, id: &str) {
        self.events.lock().push(format!("registered {} {}", kind, id));
    }

    fn on_provider_lookup(&self, kind: ProviderKind, id: &str, found: bool) {
        self.events
            .lock()
            .push(format!("lookup {} {} {}", kind, id, found));
    }
}

/// Build a default [`MigrationRequest`] for tests.
pub fn migration_request(selection: stagecraft_core::inputs::Selection) -> MigrationRequest {
    MigrationRequest {
        environment: "production".to_string(),
        database: "app".to_string(),
        connection_env: "DATABASE_URL".to_string(),
        migrations_path: "db/migrations".to_string(),
        selection,
        fail_fast: true,
        allow_noop: true,
        timeout_seconds: None,
        config: serde_json::Value::Object(serde_json::Map::new()),
    }
}
