// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wire schemas for step inputs.
//!
//! One struct per [`StepAction`]. All structs decode strictly (unknown
//! fields rejected), normalize set-like lists into sorted order, and
//! validate required fields, enum domains, and path hygiene.
//!
//! Ordering contract: callers invoke `normalize()` before `validate()`
//! before marshaling. Executors re-decode strictly and re-validate.

use crate::action::StepAction;
use crate::error::StageError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors produced while decoding or validating step inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputsError {
    #[error("{action} inputs: {message}")]
    Decode { action: StepAction, message: String },
    #[error("{action} inputs: missing required field `{field}`")]
    MissingField {
        action: StepAction,
        field: &'static str,
    },
    #[error("{action} inputs: invalid `{field}`: {message}")]
    InvalidField {
        action: StepAction,
        field: &'static str,
        message: String,
    },
}

impl From<InputsError> for StageError {
    fn from(err: InputsError) -> Self {
        StageError::InvalidConfig(err.to_string())
    }
}

/// Common behavior of every per-action inputs struct.
pub trait StepInputs: Serialize + DeserializeOwned + Sized {
    /// The action this schema belongs to.
    const ACTION: StepAction;

    /// Sort set-like lists so serialization is deterministic.
    fn normalize(&mut self);

    /// Check required fields, enum domains, and path hygiene.
    fn validate(&self) -> Result<(), InputsError>;

    /// Strict JSON decode; unknown fields are an error naming the key.
    fn unmarshal_strict(bytes: &[u8]) -> Result<Self, InputsError> {
        serde_json::from_slice(bytes).map_err(|e| InputsError::Decode {
            action: Self::ACTION,
            message: e.to_string(),
        })
    }

    /// Canonical serialization: struct field order, compact JSON.
    fn marshal(&self) -> Result<Vec<u8>, InputsError> {
        serde_json::to_vec(self).map_err(|e| InputsError::Decode {
            action: Self::ACTION,
            message: e.to_string(),
        })
    }
}

/// Strict decode followed by validation, as executors must do.
pub fn decode_validated<T: StepInputs>(bytes: &[u8]) -> Result<T, InputsError> {
    let inputs = T::unmarshal_strict(bytes)?;
    inputs.validate()?;
    Ok(inputs)
}

fn default_true() -> bool {
    true
}

fn sort_dedup(list: &mut Vec<String>) {
    list.sort();
    list.dedup();
}

fn require(
    action: StepAction,
    field: &'static str,
    value: &str,
) -> Result<(), InputsError> {
    if value.is_empty() {
        return Err(InputsError::MissingField { action, field });
    }
    Ok(())
}

/// Repo-relative path hygiene: forward slashes only, no empty, `.` or
/// `..` segments, no leading slash.
fn check_clean_path(
    action: StepAction,
    field: &'static str,
    path: &str,
) -> Result<(), InputsError> {
    let invalid = |message: String| InputsError::InvalidField {
        action,
        field,
        message,
    };
    if path.is_empty() {
        return Err(InputsError::MissingField { action, field });
    }
    if path.contains('\\') {
        return Err(invalid(format!("`{}` must use forward slashes", path)));
    }
    if path.starts_with('/') {
        return Err(invalid(format!("`{}` must be relative", path)));
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid(format!("`{}` has an invalid path segment", path)));
        }
    }
    Ok(())
}

fn check_hex64(
    action: StepAction,
    field: &'static str,
    value: &str,
) -> Result<(), InputsError> {
    let ok = value.len() == 64
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if !ok {
        return Err(InputsError::InvalidField {
            action,
            field,
            message: "expected 64 lowercase hex characters".to_string(),
        });
    }
    Ok(())
}

fn check_positive(
    action: StepAction,
    field: &'static str,
    value: Option<u64>,
) -> Result<(), InputsError> {
    if value == Some(0) {
        return Err(InputsError::InvalidField {
            action,
            field,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

// --- build ---

/// Inputs for the `build` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildInputs {
    pub service: String,
    pub context_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    #[serde(default)]
    pub build_args: BTreeMap<String, String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

impl StepInputs for BuildInputs {
    const ACTION: StepAction = StepAction::Build;

    fn normalize(&mut self) {
        sort_dedup(&mut self.targets);
    }

    fn validate(&self) -> Result<(), InputsError> {
        require(Self::ACTION, "service", &self.service)?;
        check_clean_path(Self::ACTION, "context_dir", &self.context_dir)?;
        if let Some(dockerfile) = &self.dockerfile {
            check_clean_path(Self::ACTION, "dockerfile", dockerfile)?;
        }
        Ok(())
    }
}

// --- render_compose ---

/// A named compose overlay, sourced from a file or given inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
}

/// Inputs for the `render_compose` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderComposeInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_compose_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_compose_inline: Option<String>,
    pub environment: String,
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,
    #[serde(default)]
    pub host_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_compose_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_alg: Option<String>,
}

impl StepInputs for RenderComposeInputs {
    const ACTION: StepAction = StepAction::RenderCompose;

    fn normalize(&mut self) {
        self.overlays.sort_by(|a, b| a.name.cmp(&b.name));
        sort_dedup(&mut self.host_roles);
    }

    fn validate(&self) -> Result<(), InputsError> {
        require(Self::ACTION, "environment", &self.environment)?;
        match (&self.base_compose_path, &self.base_compose_inline) {
            (Some(_), Some(_)) => {
                return Err(InputsError::InvalidField {
                    action: Self::ACTION,
                    field: "base_compose_path",
                    message: "mutually exclusive with `base_compose_inline`".to_string(),
                });
            }
            (None, None) => {
                return Err(InputsError::MissingField {
                    action: Self::ACTION,
                    field: "base_compose_path",
                });
            }
            (Some(path), None) => check_clean_path(Self::ACTION, "base_compose_path", path)?,
            (None, Some(_)) => {}
        }
        for overlay in &self.overlays {
            require(Self::ACTION, "overlays.name", &overlay.name)?;
            match (&overlay.path, &overlay.inline) {
                (Some(path), None) => check_clean_path(Self::ACTION, "overlays.path", path)?,
                (None, Some(_)) => {}
                _ => {
                    return Err(InputsError::InvalidField {
                        action: Self::ACTION,
                        field: "overlays",
                        message: format!(
                            "overlay `{}` needs exactly one of `path` or `inline`",
                            overlay.name,
                        ),
                    });
                }
            }
        }
        if let Some(output_path) = &self.output_path {
            check_clean_path(Self::ACTION, "output_path", output_path)?;
        }
        if let Some(hash) = &self.expected_compose_hash {
            match self.hash_alg.as_deref() {
                Some("sha256") => {}
                Some(other) => {
                    return Err(InputsError::InvalidField {
                        action: Self::ACTION,
                        field: "hash_alg",
                        message: format!("unsupported hash algorithm `{}`", other),
                    });
                }
                None => {
                    return Err(InputsError::MissingField {
                        action: Self::ACTION,
                        field: "hash_alg",
                    });
                }
            }
            check_hex64(Self::ACTION, "expected_compose_hash", hash)?;
        }
        Ok(())
    }
}

// --- apply_compose ---

/// Inputs for the `apply_compose` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyComposeInputs {
    pub compose_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default = "default_true")]
    pub remove_orphans: bool,
    #[serde(default)]
    pub services: Vec<String>,
}

impl Default for ApplyComposeInputs {
    fn default() -> Self {
        Self {
            compose_path: String::new(),
            project_name: None,
            remove_orphans: true,
            services: Vec::new(),
        }
    }
}

impl StepInputs for ApplyComposeInputs {
    const ACTION: StepAction = StepAction::ApplyCompose;

    fn normalize(&mut self) {
        sort_dedup(&mut self.services);
    }

    fn validate(&self) -> Result<(), InputsError> {
        check_clean_path(Self::ACTION, "compose_path", &self.compose_path)
    }
}

// --- migrate ---

/// Which migrations an operation targets.
///
/// `all = true` wins over `ids`/`tags`; otherwise the selection is the
/// union of id matches and tag matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selection {
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self {
            all: true,
            ids: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.ids.is_empty() && self.tags.is_empty()
    }

    pub fn normalize(&mut self) {
        sort_dedup(&mut self.ids);
        sort_dedup(&mut self.tags);
    }
}

/// Whether a migrate step plans or applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrateMode {
    Plan,
    #[default]
    Apply,
}

/// Inputs for the `migrate` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateInputs {
    pub engine: String,
    pub database: String,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub mode: MigrateMode,
    #[serde(default = "default_true")]
    pub fail_fast: bool,
    #[serde(default = "default_true")]
    pub allow_noop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for MigrateInputs {
    fn default() -> Self {
        Self {
            engine: String::new(),
            database: String::new(),
            selection: Selection::default(),
            mode: MigrateMode::default(),
            fail_fast: true,
            allow_noop: true,
            timeout_seconds: None,
        }
    }
}

impl StepInputs for MigrateInputs {
    const ACTION: StepAction = StepAction::Migrate;

    fn normalize(&mut self) {
        self.selection.normalize();
    }

    fn validate(&self) -> Result<(), InputsError> {
        require(Self::ACTION, "engine", &self.engine)?;
        require(Self::ACTION, "database", &self.database)?;
        check_positive(Self::ACTION, "timeout_seconds", self.timeout_seconds)?;
        Ok(())
    }
}

// --- health_check ---

fn default_expect_status() -> u16 {
    200
}

/// A named HTTP endpoint probed by a health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthEndpoint {
    pub name: String,
    pub url: String,
    #[serde(default = "default_expect_status")]
    pub expect_status: u16,
}

/// Inputs for the `health_check` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthCheckInputs {
    #[serde(default)]
    pub endpoints: Vec<HealthEndpoint>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl StepInputs for HealthCheckInputs {
    const ACTION: StepAction = StepAction::HealthCheck;

    fn normalize(&mut self) {
        self.endpoints.sort_by(|a, b| a.name.cmp(&b.name));
        sort_dedup(&mut self.services);
    }

    fn validate(&self) -> Result<(), InputsError> {
        if self.endpoints.is_empty() && self.services.is_empty() {
            return Err(InputsError::InvalidField {
                action: Self::ACTION,
                field: "endpoints",
                message: "at least one of `endpoints` or `services` is required".to_string(),
            });
        }
        for endpoint in &self.endpoints {
            require(Self::ACTION, "endpoints.name", &endpoint.name)?;
            require(Self::ACTION, "endpoints.url", &endpoint.url)?;
        }
        check_positive(Self::ACTION, "timeout_seconds", self.timeout_seconds)?;
        check_positive(Self::ACTION, "interval_seconds", self.interval_seconds)?;
        Ok(())
    }
}

// --- rollout ---

/// Rollout strategy for replacing running services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutStrategy {
    Recreate,
    #[default]
    Rolling,
}

/// Inputs for the `rollout` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RolloutInputs {
    pub services: Vec<String>,
    #[serde(default)]
    pub strategy: RolloutStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(default = "default_true")]
    pub health_gate: bool,
}

impl Default for RolloutInputs {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            strategy: RolloutStrategy::default(),
            batch_size: None,
            health_gate: true,
        }
    }
}

impl StepInputs for RolloutInputs {
    const ACTION: StepAction = StepAction::Rollout;

    fn normalize(&mut self) {
        sort_dedup(&mut self.services);
    }

    fn validate(&self) -> Result<(), InputsError> {
        if self.services.is_empty() {
            return Err(InputsError::MissingField {
                action: Self::ACTION,
                field: "services",
            });
        }
        check_positive(Self::ACTION, "batch_size", self.batch_size)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "inputs_tests.rs"]
mod tests;
