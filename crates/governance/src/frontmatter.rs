// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec file frontmatter parsing and validation.
//!
//! Spec files are Markdown with a YAML frontmatter block delimited by
//! `---` lines at the very top of the document.

use crate::features::FeatureStatus;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::expect_used)]
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+$").expect("constant regex pattern is valid"));

/// Errors that can occur while parsing spec frontmatter
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("document does not start with a `---` frontmatter fence")]
    Missing,
    #[error("frontmatter fence is never closed")]
    Unterminated,
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Declared inputs of a spec'd command surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecInputs {
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Declared outputs of a spec'd command surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecOutputs {
    #[serde(default)]
    pub exit_codes: BTreeMap<String, i64>,
}

/// The YAML frontmatter of one spec file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecFrontmatter {
    pub feature: String,
    pub version: String,
    pub status: FeatureStatus,
    pub domain: String,
    #[serde(default)]
    pub inputs: SpecInputs,
    #[serde(default)]
    pub outputs: SpecOutputs,
}

/// Extract and parse the frontmatter block of a spec document.
pub fn parse_frontmatter(text: &str) -> Result<SpecFrontmatter, FrontmatterError> {
    let Some(rest) = text.strip_prefix("---") else {
        return Err(FrontmatterError::Missing);
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return Err(FrontmatterError::Missing);
    };
    let mut yaml_end = None;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            yaml_end = Some(offset);
            break;
        }
        offset += line.len();
    }
    let Some(yaml_end) = yaml_end else {
        return Err(FrontmatterError::Unterminated);
    };
    Ok(serde_yaml::from_str(&rest[..yaml_end])?)
}

impl SpecFrontmatter {
    /// Validate field rules against the spec file's location.
    ///
    /// `relative_path` is the spec file path relative to the spec root;
    /// its first segment must equal the declared domain. Returns every
    /// problem found, in a stable order.
    pub fn validate(&self, relative_path: &str) -> Vec<String> {
        let mut problems = Vec::new();
        if self.feature.is_empty() {
            problems.push("`feature` is empty".to_string());
        }
        if !VERSION_PATTERN.is_match(&self.version) {
            problems.push(format!("`version` `{}` does not match ^v\\d+$", self.version));
        }
        let first_segment = relative_path.split('/').next().unwrap_or("");
        if self.domain != first_segment {
            problems.push(format!(
                "`domain` `{}` does not match path segment `{}`",
                self.domain, first_segment,
            ));
        }
        for flag in &self.inputs.flags {
            let name = flag.trim_start_matches('-');
            if name.is_empty() {
                problems.push(format!("flag `{}` has an empty name", flag));
            }
        }
        for (name, code) in &self.outputs.exit_codes {
            if *code < 0 {
                problems.push(format!("exit code `{}` ({}) is negative", name, code));
            }
        }
        problems
    }
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
