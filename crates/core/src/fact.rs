// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable observed facts

use serde::{Deserialize, Serialize};

/// An immutable, observed statement about a subject.
///
/// Facts carry no timestamps; two runs observing the same state produce
/// byte-identical facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fact {
    pub subject: String,
    pub name: String,
    pub value: serde_json::Value,
}

impl Fact {
    pub fn new(
        subject: impl Into<String>,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            subject: subject.into(),
            name: name.into(),
            value,
        }
    }

    /// Canonical JSON form: sorted object keys, no insignificant whitespace.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        serde_json::to_string(&value)
    }
}

#[cfg(test)]
#[path = "fact_tests.rs"]
mod tests;
