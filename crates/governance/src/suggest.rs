// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suggestion aggregation for commit validation output

use crate::commit::CommitViolation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a commit violation, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn grouped(violations: &[CommitViolation]) -> Vec<&CommitViolation> {
    let mut sorted: Vec<&CommitViolation> = violations.iter().collect();
    sorted.sort_by(|a, b| (a.severity, &a.code).cmp(&(b.severity, &b.code)));
    sorted
}

/// Human-readable summary, grouped error → warning → info.
pub fn render_text(violations: &[CommitViolation]) -> String {
    if violations.is_empty() {
        return "commit message ok\n".to_string();
    }
    let mut out = String::new();
    for violation in grouped(violations) {
        out.push_str(&format!(
            "{}: [{}] {}\n",
            violation.severity, violation.code, violation.message,
        ));
    }
    out
}

/// Machine-readable summary with per-severity counts.
pub fn render_json(violations: &[CommitViolation]) -> serde_json::Value {
    let count = |severity: Severity| {
        violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    };
    serde_json::json!({
        "counts": {
            "error": count(Severity::Error),
            "warning": count(Severity::Warning),
            "info": count(Severity::Info),
        },
        "violations": grouped(violations),
    })
}

#[cfg(test)]
#[path = "suggest_tests.rs"]
mod tests;
