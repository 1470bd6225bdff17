// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration parsing and validation.
//!
//! `stagecraft.yml` declares the environments (variable tables plus the
//! hosts that receive plans), the provider selection per capability, and
//! the managed databases. Decoding is strict; validation produces
//! messages that list valid alternatives in sorted order.

use serde::{Deserialize, Serialize};
use stagecraft_core::{HostRef, StageError};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for StageError {
    fn from(err: ConfigError) -> Self {
        StageError::InvalidConfig(err.to_string())
    }
}

/// The parsed `stagecraft.yml` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name; used as the default compose project prefix.
    #[serde(default)]
    pub project: String,
    pub environments: BTreeMap<String, EnvironmentConfig>,
    /// Buildable services, keyed by compose service name.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<ProviderSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<ProviderSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<ProviderSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<ProviderSection>,
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,
}

/// One deployment environment: a variable table and its target hosts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Substitution variables for compose rendering.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    /// Variables that may resolve empty when absent from `vars`.
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
}

/// Provider selection for one capability (backend, cloud, secrets, network).
///
/// Per-provider configuration payloads are deliberately opaque here; each
/// provider re-decodes its own block strictly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    pub provider: String,
    #[serde(default)]
    pub providers: BTreeMap<String, serde_yaml::Value>,
}

/// A buildable service: its build context and optional dockerfile/image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_engine() -> String {
    "sql".to_string()
}

/// A managed database: where its connection string lives and where its
/// migrations are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub connection_env: String,
    pub migrations: String,
    /// Migration engine id; must be registered before execution.
    #[serde(default = "default_engine")]
    pub engine: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_env: String::new(),
            migrations: String::new(),
            engine: default_engine(),
        }
    }
}

impl ProjectConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading project config");
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config: ProjectConfig = serde_yaml::from_str(text)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Sort set-like lists and host role sets.
    pub fn normalize(&mut self) {
        for env in self.environments.values_mut() {
            env.optional.sort();
            env.optional.dedup();
            for host in &mut env.hosts {
                host.normalize();
            }
        }
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environments.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one environment is required".to_string(),
            ));
        }
        for (name, env) in &self.environments {
            if name.is_empty() {
                return Err(ConfigError::Invalid("empty environment name".to_string()));
            }
            let mut seen: HashSet<&str> = HashSet::with_capacity(env.hosts.len());
            for host in &env.hosts {
                if host.id.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "environment `{}` has a host with an empty id",
                        name,
                    )));
                }
                if host.address.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "environment `{}` host `{}` has no address",
                        name, host.id,
                    )));
                }
                if !seen.insert(host.id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "environment `{}` lists host `{}` twice",
                        name, host.id,
                    )));
                }
            }
        }
        for (label, section) in [
            ("backend", &self.backend),
            ("cloud", &self.cloud),
            ("secrets", &self.secrets),
            ("network", &self.network),
        ] {
            if let Some(section) = section {
                validate_provider_id(label, &section.provider)?;
            }
        }
        for (name, service) in &self.services {
            if service.context.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "service `{}` has no build context",
                    name,
                )));
            }
        }
        for (name, db) in &self.databases {
            if !is_env_var_name(&db.connection_env) {
                return Err(ConfigError::Invalid(format!(
                    "database `{}`: `{}` is not an environment variable name",
                    name, db.connection_env,
                )));
            }
            if db.migrations.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "database `{}` has no migrations path",
                    name,
                )));
            }
        }
        Ok(())
    }

    /// Look up an environment, listing valid names on a miss.
    pub fn environment(&self, name: &str) -> Result<&EnvironmentConfig, ConfigError> {
        self.environments.get(name).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "unknown environment `{}`; have: {}",
                name,
                sorted_keys(&self.environments),
            ))
        })
    }
}

fn validate_provider_id(section: &str, id: &str) -> Result<(), ConfigError> {
    let valid = !id.is_empty()
        && id.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(ConfigError::Invalid(format!(
            "section `{}`: provider id `{}` must be stable lowercase",
            section, id,
        )));
    }
    Ok(())
}

fn is_env_var_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Sort and join keys from a map for deterministic error messages.
fn sorted_keys<V>(map: &BTreeMap<String, V>) -> String {
    map.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
