// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable substitution for compose documents.
//!
//! Placeholders resolve against the per-environment variable table from
//! configuration, never against the process environment.

use crate::ComposeError;
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

// Regex pattern for ${VAR:-default} expansion
#[allow(clippy::expect_used)]
static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+):-([^}]*)\}").expect("constant regex pattern is valid"));

// Regex pattern for bare ${VAR} expansion
#[allow(clippy::expect_used)]
static BARE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("constant regex pattern is valid"));

/// Resolve `${KEY:-DEFAULT}` and `${KEY}` placeholders in one string.
///
/// `${KEY}` without a table entry is an error unless the key is listed
/// in `optional` (then it resolves empty). `${KEY:-DEFAULT}` falls back
/// to its default.
pub fn substitute_str(
    input: &str,
    vars: &BTreeMap<String, String>,
    optional: &[String],
) -> Result<String, ComposeError> {
    let pass = DEFAULT_PATTERN.replace_all(input, |caps: &regex::Captures| {
        let key = &caps[1];
        match vars.get(key) {
            Some(value) => value.clone(),
            None => caps[2].to_string(),
        }
    });

    let mut missing: Vec<String> = Vec::new();
    let result = BARE_PATTERN.replace_all(&pass, |caps: &regex::Captures| {
        let key = &caps[1];
        match vars.get(key) {
            Some(value) => value.clone(),
            None if optional.iter().any(|k| k == key) => String::new(),
            None => {
                missing.push(key.to_string());
                String::new()
            }
        }
    });

    if let Some(key) = missing.into_iter().next() {
        return Err(ComposeError::MissingVar(key));
    }
    Ok(result.to_string())
}

/// Recursively substitute every string scalar in a YAML tree.
///
/// Mapping keys stay literal; only values are substituted.
pub fn substitute_value(
    value: &mut Value,
    vars: &BTreeMap<String, String>,
    optional: &[String],
) -> Result<(), ComposeError> {
    match value {
        Value::String(s) => {
            *s = substitute_str(s, vars, optional)?;
        }
        Value::Sequence(items) => {
            for item in items {
                substitute_value(item, vars, optional)?;
            }
        }
        Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                substitute_value(v, vars, optional)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "substitute_tests.rs"]
mod tests;
