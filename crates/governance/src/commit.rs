// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit message validation.
//!
//! Subjects must match `<type>(<FEATURE_ID>): <summary>` with a
//! registered SCREAMING_SNAKE_CASE feature id and a 1–72 character
//! ASCII summary. When the branch follows the
//! `(feature|fix|refactor)/<FEATURE_ID>-<slug>` convention, the branch
//! and subject must agree on the feature.

use crate::features::{FeatureRegistry, FEATURE_ID_PATTERN};
use crate::suggest::Severity;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const COMMIT_TYPES: &[&str] = &["feat", "fix", "refactor", "docs", "test", "ci", "chore"];

const MAX_SUMMARY_LEN: usize = 72;

#[allow(clippy::expect_used)]
static SUBJECT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\(([^)]*)\): ?(.*)$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static BRANCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:feature|fix|refactor)/([A-Z][A-Z0-9_]+)-").expect("constant regex pattern is valid")
});

/// One commit validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitViolation {
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl CommitViolation {
    fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Validate one commit subject against the registry and branch name.
pub fn validate_commit_subject(
    subject: &str,
    registry: &FeatureRegistry,
    branch: Option<&str>,
) -> Vec<CommitViolation> {
    let mut violations = Vec::new();

    if !subject.is_ascii() {
        violations.push(CommitViolation::error(
            "NON_ASCII",
            "subject contains non-ASCII characters",
        ));
    }

    let Some(captures) = SUBJECT_PATTERN.captures(subject) else {
        violations.push(CommitViolation::error(
            "INVALID_FORMAT",
            "subject must match `<type>(<FEATURE_ID>): <summary>`",
        ));
        return violations;
    };
    let commit_type = &captures[1];
    let feature_part = &captures[2];
    let summary = &captures[3];

    let lowered = commit_type.to_lowercase();
    if !COMMIT_TYPES.contains(&lowered.as_str()) {
        violations.push(CommitViolation::error(
            "INVALID_TYPE",
            format!(
                "type `{}` is not one of: {}",
                commit_type,
                COMMIT_TYPES.join(", "),
            ),
        ));
    } else if commit_type != lowered {
        violations.push(CommitViolation::error(
            "INVALID_TYPE_CASE",
            format!("type `{}` must be lowercase", commit_type),
        ));
    }

    if feature_part.contains(',')
        || feature_part.contains(' ')
        || feature_part.contains('|')
        || feature_part.contains('+')
    {
        violations.push(CommitViolation::error(
            "MULTI_FEATURE",
            "subject must reference exactly one feature id",
        ));
    } else if !FEATURE_ID_PATTERN.is_match(feature_part) {
        violations.push(CommitViolation::error(
            "INVALID_FEATURE_ID_FORMAT",
            format!("feature id `{}` is not SCREAMING_SNAKE_CASE", feature_part),
        ));
    } else {
        if !registry.contains(feature_part) {
            violations.push(CommitViolation::error(
                "ORPHAN_FEATURE_ID",
                format!("feature id `{}` is not in the registry", feature_part),
            ));
        }
        if let Some(branch_id) = branch.and_then(|b| {
            BRANCH_PATTERN
                .captures(b)
                .map(|c| c[1].to_string())
        }) {
            if branch_id != feature_part {
                violations.push(CommitViolation::error(
                    "BRANCH_FEATURE_MISMATCH",
                    format!(
                        "branch references `{}` but subject references `{}`",
                        branch_id, feature_part,
                    ),
                ));
            }
        }
    }

    if summary.is_empty() {
        violations.push(CommitViolation::error("SUMMARY_EMPTY", "summary is empty"));
    } else {
        if summary.len() > MAX_SUMMARY_LEN {
            violations.push(CommitViolation::error(
                "SUMMARY_TOO_LONG",
                format!(
                    "summary is {} characters (max {})",
                    summary.len(),
                    MAX_SUMMARY_LEN,
                ),
            ));
        }
        if summary.ends_with('.') {
            violations.push(CommitViolation::error(
                "TRAILING_PERIOD",
                "summary must not end with a period",
            ));
        }
        if summary.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            violations.push(CommitViolation::warning(
                "SUMMARY_LEADING_UPPERCASE",
                "summary conventionally starts lowercase",
            ));
        }
    }

    violations
}

#[cfg(test)]
#[path = "commit_tests.rs"]
mod tests;
