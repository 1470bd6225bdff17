// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical compose rendering.
//!
//! Substitutes each document, merges overlays in sorted-by-name order,
//! applies the service mode / role / port policies, and emits YAML with
//! sorted service keys. The emitted bytes are hashed so callers can
//! enforce the output contract.

use crate::document::ComposeDocument;
use crate::overlay::merge_value;
use crate::substitute::substitute_value;
use crate::ComposeError;
use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Environment and host context for one render.
pub struct RenderOptions<'a> {
    pub vars: &'a BTreeMap<String, String>,
    pub optional: &'a [String],
    pub host_roles: &'a [String],
}

/// The emitted document and the SHA-256 of its exact bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub yaml: String,
    pub sha256: String,
}

impl Rendered {
    /// Enforce the output hash contract.
    pub fn verify(&self, expected: &str) -> Result<(), ComposeError> {
        if self.sha256 != expected {
            return Err(ComposeError::HashMismatch {
                expected: expected.to_string(),
                actual: self.sha256.clone(),
            });
        }
        Ok(())
    }
}

enum ServiceMode {
    Container,
    External,
}

/// Render a compose document for one host.
pub fn render(
    base: &ComposeDocument,
    overlays: &[(String, ComposeDocument)],
    opts: &RenderOptions<'_>,
) -> Result<Rendered, ComposeError> {
    let mut root = Value::Mapping(base.root().clone());
    substitute_value(&mut root, opts.vars, opts.optional)?;

    let mut sorted: Vec<&(String, ComposeDocument)> = overlays.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, overlay) in sorted {
        let mut overlay_root = Value::Mapping(overlay.root().clone());
        substitute_value(&mut overlay_root, opts.vars, opts.optional)
            .map_err(|e| match e {
                ComposeError::MissingVar(key) => ComposeError::Invalid(format!(
                    "overlay `{}`: missing substitution variable `{}`",
                    name, key,
                )),
                other => other,
            })?;
        merge_value(&mut root, &overlay_root);
    }

    let Value::Mapping(merged) = root else {
        return Err(ComposeError::Invalid(
            "merged document is not a mapping".to_string(),
        ));
    };

    let mut out = Mapping::new();
    if let Some(version) = merged.get("version") {
        out.insert("version".into(), version.clone());
    }

    let mut names: Vec<String> = match merged.get("services") {
        Some(Value::Mapping(services)) => services
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    names.sort();

    let mut services_out = Mapping::new();
    for name in &names {
        let body = merged
            .get("services")
            .and_then(|s| s.get(name.as_str()))
            .cloned();
        let Some(Value::Mapping(service)) = body else {
            return Err(ComposeError::Invalid(format!(
                "service `{}` must be a mapping",
                name,
            )));
        };
        match service_mode(name, &service)? {
            ServiceMode::External => {
                tracing::debug!(service = %name, "excluding external service");
                continue;
            }
            ServiceMode::Container => {}
        }
        if let Some(role) = service_role(name, &service)? {
            if !opts.host_roles.iter().any(|r| r == &role) {
                tracing::debug!(service = %name, role = %role, "excluding service by role");
                continue;
            }
        }
        services_out.insert(name.as_str().into(), Value::Mapping(prepare_service(service)));
    }
    out.insert("services".into(), Value::Mapping(services_out));

    for section in ["volumes", "networks"] {
        if let Some(value) = merged.get(section) {
            out.insert(section.into(), value.clone());
        }
    }

    let yaml = serde_yaml::to_string(&Value::Mapping(out))?;
    let sha256 = format!("{:x}", Sha256::digest(yaml.as_bytes()));
    Ok(Rendered { yaml, sha256 })
}

fn service_mode(name: &str, service: &Mapping) -> Result<ServiceMode, ComposeError> {
    match service.get("mode") {
        None => Ok(ServiceMode::Container),
        Some(Value::String(mode)) if mode == "container" => Ok(ServiceMode::Container),
        Some(Value::String(mode)) if mode == "external" => Ok(ServiceMode::External),
        Some(other) => Err(ComposeError::Invalid(format!(
            "service `{}`: unknown mode `{:?}`",
            name, other,
        ))),
    }
}

fn service_role(name: &str, service: &Mapping) -> Result<Option<String>, ComposeError> {
    match service.get("role") {
        None => Ok(None),
        Some(Value::String(role)) => Ok(Some(role.clone())),
        Some(_) => Err(ComposeError::Invalid(format!(
            "service `{}`: role must be a string",
            name,
        ))),
    }
}

/// Strip the stagecraft dialect keys and apply the port policy.
fn prepare_service(mut service: Mapping) -> Mapping {
    service.remove("mode");
    service.remove("role");
    let ports_empty = match service.get_mut("ports") {
        Some(Value::Sequence(ports)) => {
            // Empty substitution result elides the entry
            ports.retain(|p| !matches!(p, Value::String(s) if s.is_empty()));
            ports.is_empty()
        }
        _ => false,
    };
    if ports_empty {
        service.remove("ports");
    }
    service
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
