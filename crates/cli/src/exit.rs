// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit-code mapping.
//!
//! 0 success, 1 general failure, 2 invalid configuration, 3
//! plan-invariant violation.

use stagecraft_config::ConfigError;
use stagecraft_core::StageError;

/// Map an error chain to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(stage) = cause.downcast_ref::<StageError>() {
            return stage.kind().exit_code();
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return 2;
        }
    }
    1
}

#[cfg(test)]
#[path = "exit_tests.rs"]
mod tests;
