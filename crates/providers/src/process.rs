// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers for provider implementations

use stagecraft_core::{sanitize_message, StageError};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Default timeout for compose commands (pull + up can be slow).
pub const COMPOSE_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Default timeout for migration tool invocations.
pub const MIGRATION_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Default timeout for a single health probe.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`. The child
/// process is killed automatically if the timeout elapses (via the
/// tokio `Child` drop implementation). A missing executable is
/// classified as `dependency_missing`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, StageError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => Err(
            StageError::DependencyMissing(format!("{}: executable not found", description)),
        ),
        Ok(Err(io_err)) => Err(StageError::ExecutionError(format!(
            "{} failed: {}",
            description, io_err,
        ))),
        Err(_elapsed) => Err(StageError::ExecutionError(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs(),
        ))),
    }
}

/// Like [`run_with_timeout`], but also honors cancellation.
pub async fn run_cancellable(
    ctx: &CancellationToken,
    cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, StageError> {
    tokio::select! {
        _ = ctx.cancelled() => Err(StageError::Cancelled(format!("{} cancelled", description))),
        result = run_with_timeout(cmd, timeout, description) => result,
    }
}

/// Classify a non-zero exit as an execution error with sanitized stderr.
pub fn check_status(output: &Output, description: &str) -> Result<(), StageError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(StageError::ExecutionError(format!(
        "{} exited with {}: {}",
        description,
        output.status.code().unwrap_or(-1),
        sanitize_message(&stderr),
    )))
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
