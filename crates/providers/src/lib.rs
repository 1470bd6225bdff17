// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stagecraft-providers: provider contracts and the per-kind registry.
//!
//! Providers are registered explicitly at program start via
//! [`Registries`]; nothing registers itself through static
//! initialization, so registration is observable and testable.

pub mod builtin;
pub mod migration;
pub mod process;
pub mod provider;
pub mod registry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use builtin::{register_builtins, GenericBackend, SqlEngine};
pub use migration::{
    check_noop, resolve_selection, summarize, Migration, MigrationApplyResult, MigrationEngine,
    MigrationOutcome, MigrationPlan, MigrationRequest, MigrationStepResult, MigrationSummary,
    ValidationResult,
};
pub use provider::{
    BackendProvider, BuildRequest, CloudProvider, NetworkProvider, NetworkRequest, Provider,
    ProvisionRequest, Registries, SecretsProvider, SecretsRequest,
};
pub use registry::{ProviderKind, Registry, RegistryError, RegistryHooks};
