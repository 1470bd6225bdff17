// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action failure classification for reports

use stagecraft_core::{codes, ErrorKind, StageError};
use thiserror::Error;

/// An action failure carrying its report classification.
///
/// `#[from] StageError` lets executors use `?` on any classified error;
/// the timeout variant exists so budget expiry gets its dedicated
/// report code.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Stage(#[from] StageError),
}

impl ActionError {
    /// The report code recorded on the failed step execution.
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::Timeout(_) => codes::TIMEOUT,
            ActionError::Stage(err) if err.kind() == ErrorKind::Cancelled => codes::CANCELLED,
            ActionError::Stage(_) => codes::EXECUTION_ERROR,
        }
    }
}

/// Run a fallible future under an optional timeout budget.
pub async fn with_timeout<T, F>(seconds: Option<u64>, fut: F) -> Result<T, ActionError>
where
    F: std::future::Future<Output = Result<T, StageError>>,
{
    match seconds {
        Some(secs) => match tokio::time::timeout(std::time::Duration::from_secs(secs), fut).await
        {
            Ok(result) => result.map_err(ActionError::from),
            Err(_elapsed) => Err(ActionError::Timeout(secs)),
        },
        None => fut.await.map_err(ActionError::from),
    }
}
