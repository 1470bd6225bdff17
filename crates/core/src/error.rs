// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the stagecraft crates.
//!
//! Every failure that crosses a crate boundary is classified into one of
//! the [`ErrorKind`] categories. The CLI maps kinds to exit codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classified error carrying a sanitized, human-readable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("dependency missing: {0}")]
    DependencyMissing(String),
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("outputs contract violation: {0}")]
    OutputsContractViolation(String),
    #[error("migration failed: {0}")]
    MigrationFailed(String),
    #[error("plan invariant violation: {0}")]
    PlanInvariantViolation(String),
    #[error("execution error: {0}")]
    ExecutionError(String),
    #[error("cancelled: {0}")]
    Cancelled(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl StageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StageError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            StageError::Unsupported(_) => ErrorKind::Unsupported,
            StageError::UnknownProvider(_) => ErrorKind::UnknownProvider,
            StageError::DependencyMissing(_) => ErrorKind::DependencyMissing,
            StageError::ConnectionFailed(_) => ErrorKind::ConnectionFailed,
            StageError::OutputsContractViolation(_) => ErrorKind::OutputsContractViolation,
            StageError::MigrationFailed(_) => ErrorKind::MigrationFailed,
            StageError::PlanInvariantViolation(_) => ErrorKind::PlanInvariantViolation,
            StageError::ExecutionError(_) => ErrorKind::ExecutionError,
            StageError::Cancelled(_) => ErrorKind::Cancelled,
            StageError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Tag-only variant of [`StageError`] for reports and exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidConfig,
    Unsupported,
    UnknownProvider,
    DependencyMissing,
    ConnectionFailed,
    OutputsContractViolation,
    MigrationFailed,
    PlanInvariantViolation,
    ExecutionError,
    Cancelled,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::UnknownProvider => "unknown_provider",
            ErrorKind::DependencyMissing => "dependency_missing",
            ErrorKind::ConnectionFailed => "connection_failed",
            ErrorKind::OutputsContractViolation => "outputs_contract_violation",
            ErrorKind::MigrationFailed => "migration_failed",
            ErrorKind::PlanInvariantViolation => "plan_invariant_violation",
            ErrorKind::ExecutionError => "execution_error",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        }
    }

    /// Process exit code for a run that failed with this kind.
    ///
    /// 0 is reserved for success, 1 is the general failure code,
    /// 2 flags configuration problems, 3 flags plan-invariant violations.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::InvalidConfig => 2,
            ErrorKind::PlanInvariantViolation => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
