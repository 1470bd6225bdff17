// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider capability contracts.
//!
//! Each request carries an opaque `config` payload copied from the
//! provider's block in `stagecraft.yml`; implementations re-decode it
//! strictly into their own typed struct and reject unknown keys there.

use crate::migration::MigrationEngine;
use crate::registry::{ProviderKind, Registry};
use async_trait::async_trait;
use stagecraft_core::{BuildInputs, Fact, HostRef, StageError};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Base contract: a provider is a named implementation of a capability.
///
/// Ids are stable and lowercase; uniqueness per kind is enforced by the
/// registry.
pub trait Provider: Send + Sync {
    fn id(&self) -> &str;
}

/// Request to build one service image.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub environment: String,
    pub inputs: BuildInputs,
    pub config: serde_json::Value,
}

/// Builds backend service images.
#[async_trait]
pub trait BackendProvider: Provider {
    async fn build(
        &self,
        ctx: &CancellationToken,
        req: &BuildRequest,
    ) -> Result<Vec<Fact>, StageError>;
}

/// Request to provision (or look up) the hosts of an environment.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub environment: String,
    pub config: serde_json::Value,
}

/// Provisions cloud infrastructure and reports host identities.
#[async_trait]
pub trait CloudProvider: Provider {
    async fn provision(
        &self,
        ctx: &CancellationToken,
        req: &ProvisionRequest,
    ) -> Result<Vec<HostRef>, StageError>;
}

/// Request to resolve a set of secret keys for an environment.
#[derive(Debug, Clone)]
pub struct SecretsRequest {
    pub environment: String,
    pub keys: Vec<String>,
    pub config: serde_json::Value,
}

/// Resolves secrets; values never appear in logs or reports.
#[async_trait]
pub trait SecretsProvider: Provider {
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        req: &SecretsRequest,
    ) -> Result<BTreeMap<String, String>, StageError>;
}

/// Request to ensure mesh connectivity between the given hosts.
#[derive(Debug, Clone)]
pub struct NetworkRequest {
    pub environment: String,
    pub hosts: Vec<HostRef>,
    pub config: serde_json::Value,
}

/// Maintains the overlay network between hosts.
#[async_trait]
pub trait NetworkProvider: Provider {
    async fn ensure(
        &self,
        ctx: &CancellationToken,
        req: &NetworkRequest,
    ) -> Result<(), StageError>;
}

/// One registry per provider kind.
///
/// Constructed once at startup; `register_all`-style functions populate
/// it explicitly before any plan executes.
pub struct Registries {
    pub backend: Registry<dyn BackendProvider>,
    pub migration: Registry<dyn MigrationEngine>,
    pub cloud: Registry<dyn CloudProvider>,
    pub secrets: Registry<dyn SecretsProvider>,
    pub network: Registry<dyn NetworkProvider>,
}

impl Registries {
    pub fn new() -> Self {
        Self {
            backend: Registry::new(ProviderKind::Backend),
            migration: Registry::new(ProviderKind::Migration),
            cloud: Registry::new(ProviderKind::Cloud),
            secrets: Registry::new(ProviderKind::Secrets),
            network: Registry::new(ProviderKind::Network),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}
