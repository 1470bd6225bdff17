// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feature registry (`spec/features.yaml`)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

// SCREAMING_SNAKE_CASE feature ids
#[allow(clippy::expect_used)]
pub(crate) static FEATURE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]+$").expect("constant regex pattern is valid"));

/// Errors that can occur while loading the feature registry
#[derive(Debug, Error)]
pub enum FeaturesError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid feature registry: {0}")]
    Invalid(String),
}

/// Lifecycle state of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    Todo,
    Wip,
    Done,
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureStatus::Todo => write!(f, "todo"),
            FeatureStatus::Wip => write!(f, "wip"),
            FeatureStatus::Done => write!(f, "done"),
        }
    }
}

/// One registered feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub status: FeatureStatus,
    /// Spec file path, relative to the repository root.
    pub spec: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub tests: Vec<String>,
}

/// The parsed feature registry, sorted by feature id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureRegistry {
    pub features: Vec<Feature>,
}

impl FeatureRegistry {
    pub fn load(path: &Path) -> Result<Self, FeaturesError> {
        let text = std::fs::read_to_string(path).map_err(|source| FeaturesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, FeaturesError> {
        let mut registry: FeatureRegistry = serde_yaml::from_str(text)?;
        registry.features.sort_by(|a, b| a.id.cmp(&b.id));
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), FeaturesError> {
        for pair in self.features.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(FeaturesError::Invalid(format!(
                    "duplicate feature id `{}`",
                    pair[0].id,
                )));
            }
        }
        for feature in &self.features {
            if !FEATURE_ID_PATTERN.is_match(&feature.id) {
                return Err(FeaturesError::Invalid(format!(
                    "feature id `{}` is not SCREAMING_SNAKE_CASE",
                    feature.id,
                )));
            }
            if feature.spec.is_empty() {
                return Err(FeaturesError::Invalid(format!(
                    "feature `{}` has no spec path",
                    feature.id,
                )));
            }
            for dep in &feature.depends_on {
                if !self.contains(dep) {
                    return Err(FeaturesError::Invalid(format!(
                        "feature `{}` depends on unknown feature `{}`",
                        feature.id, dep,
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
#[path = "features_tests.rs"]
mod tests;
