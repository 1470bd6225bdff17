// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrency-safe provider registry with deterministic ordering.
//!
//! One registry per provider kind. Reads are shared, registration is
//! exclusive; enumeration is sorted because the backing map is ordered.

use crate::provider::Provider;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The capability a registry holds providers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Backend,
    Migration,
    Cloud,
    Secrets,
    Network,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Backend => "backend",
            ProviderKind::Migration => "migration",
            ProviderKind::Cloud => "cloud",
            ProviderKind::Secrets => "secrets",
            ProviderKind::Network => "network",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur in registry operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("stagecraft-providers: Registry::register: empty {kind} provider id")]
    EmptyProviderId { kind: ProviderKind },
    #[error("stagecraft-providers: Registry::register: duplicate {kind} provider `{id}`")]
    DuplicateProvider { kind: ProviderKind, id: String },
    #[error("unknown {kind} provider `{id}`")]
    UnknownProvider { kind: ProviderKind, id: String },
}

impl From<RegistryError> for stagecraft_core::StageError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownProvider { .. } => {
                stagecraft_core::StageError::UnknownProvider(err.to_string())
            }
            other => stagecraft_core::StageError::Internal(other.to_string()),
        }
    }
}

/// Observation hooks fired on registration and lookup.
pub trait RegistryHooks: Send + Sync {
    fn on_provider_registered(&self, _kind: ProviderKind, _id: &str) {}
    fn on_provider_lookup(&self, _kind: ProviderKind, _id: &str, _found: bool) {}
}

/// Default hooks: structured debug logging.
struct TracingHooks;

impl RegistryHooks for TracingHooks {
    fn on_provider_registered(&self, kind: ProviderKind, id: &str) {
        tracing::debug!(kind = %kind, id, "provider registered");
    }

    fn on_provider_lookup(&self, kind: ProviderKind, id: &str, found: bool) {
        tracing::debug!(kind = %kind, id, found, "provider lookup");
    }
}

/// A named, concurrency-safe lookup for one provider kind.
pub struct Registry<P: Provider + ?Sized> {
    kind: ProviderKind,
    providers: RwLock<BTreeMap<String, Arc<P>>>,
    hooks: Arc<dyn RegistryHooks>,
}

impl<P: Provider + ?Sized> Registry<P> {
    pub fn new(kind: ProviderKind) -> Self {
        Self::with_hooks(kind, Arc::new(TracingHooks))
    }

    pub fn with_hooks(kind: ProviderKind, hooks: Arc<dyn RegistryHooks>) -> Self {
        Self {
            kind,
            providers: RwLock::new(BTreeMap::new()),
            hooks,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Register a provider, rejecting empty and duplicate ids.
    pub fn try_register(&self, provider: Arc<P>) -> Result<(), RegistryError> {
        let id = provider.id().to_string();
        if id.is_empty() {
            return Err(RegistryError::EmptyProviderId { kind: self.kind });
        }
        {
            let mut providers = self.providers.write();
            if providers.contains_key(&id) {
                return Err(RegistryError::DuplicateProvider {
                    kind: self.kind,
                    id,
                });
            }
            providers.insert(id.clone(), provider);
        }
        self.hooks.on_provider_registered(self.kind, &id);
        Ok(())
    }

    /// Register a provider or terminate the process.
    ///
    /// Registration happens once at startup; an empty or duplicate id is
    /// a programmer error, not a runtime condition.
    #[allow(clippy::panic)]
    pub fn register(&self, provider: Arc<P>) {
        if let Err(err) = self.try_register(provider) {
            panic!("{}", err);
        }
    }

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Result<Arc<P>, RegistryError> {
        let found = self.providers.read().get(id).cloned();
        self.hooks.on_provider_lookup(self.kind, id, found.is_some());
        found.ok_or_else(|| RegistryError::UnknownProvider {
            kind: self.kind,
            id: id.to_string(),
        })
    }

    /// Registered ids, sorted lexicographically.
    pub fn ids(&self) -> Vec<String> {
        self.providers.read().keys().cloned().collect()
    }

    /// Registered providers, sorted by id.
    pub fn list(&self) -> Vec<Arc<P>> {
        self.providers.read().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
