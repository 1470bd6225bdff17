// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compose document loading and structural validation

use crate::ComposeError;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Top-level sections a compose document may carry.
const TOP_LEVEL_SECTIONS: &[&str] = &["version", "services", "volumes", "networks"];

/// A structurally validated compose document.
///
/// Validation here is shallow: the top level must be a mapping with
/// recognized sections, and `services` (when present) must be a mapping
/// of service name to service body. Everything below that is opaque
/// until rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeDocument {
    root: Mapping,
}

impl ComposeDocument {
    /// Parse a compose document from YAML text.
    pub fn parse(text: &str) -> Result<Self, ComposeError> {
        let value: Value = serde_yaml::from_str(text)?;
        let Value::Mapping(root) = value else {
            return Err(ComposeError::Invalid(
                "top level must be a mapping".to_string(),
            ));
        };
        for key in root.keys() {
            let Some(name) = key.as_str() else {
                return Err(ComposeError::Invalid(
                    "top-level keys must be strings".to_string(),
                ));
            };
            if !TOP_LEVEL_SECTIONS.contains(&name) {
                return Err(ComposeError::Invalid(format!(
                    "unrecognized top-level section `{}`",
                    name,
                )));
            }
        }
        if let Some(services) = root.get("services") {
            let Value::Mapping(services) = services else {
                return Err(ComposeError::Invalid(
                    "`services` must be a mapping".to_string(),
                ));
            };
            for (name, body) in services {
                let Some(name) = name.as_str() else {
                    return Err(ComposeError::Invalid(
                        "service names must be strings".to_string(),
                    ));
                };
                if !matches!(body, Value::Mapping(_)) {
                    return Err(ComposeError::Invalid(format!(
                        "service `{}` must be a mapping",
                        name,
                    )));
                }
            }
        }
        Ok(Self { root })
    }

    /// Load a compose document from a file.
    pub fn from_file(path: &Path) -> Result<Self, ComposeError> {
        let text = std::fs::read_to_string(path).map_err(|source| ComposeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    pub fn into_root(self) -> Mapping {
        self.root
    }

    /// Names of declared services, in document order.
    pub fn service_names(&self) -> Vec<String> {
        match self.root.get("services") {
            Some(Value::Mapping(services)) => services
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
