// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for compose loading and rendering

use stagecraft_core::StageError;
use thiserror::Error;

/// Errors that can occur while loading, merging, or rendering compose
/// documents
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid compose document: {0}")]
    Invalid(String),
    #[error("missing substitution variable `{0}` (no default, not optional)")]
    MissingVar(String),
    #[error("rendered compose hash `{actual}` does not match expected `{expected}`")]
    HashMismatch { expected: String, actual: String },
}

impl From<ComposeError> for StageError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::HashMismatch { .. } => {
                StageError::OutputsContractViolation(err.to_string())
            }
            other => StageError::InvalidConfig(other.to_string()),
        }
    }
}
