// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step action enumeration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of actions a plan step can perform.
///
/// The wire form is snake_case (`render_compose`, `health_check`).
/// Plans referencing any other action fail strict decoding, which the
/// executor surfaces as a plan-invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Build,
    RenderCompose,
    ApplyCompose,
    Migrate,
    HealthCheck,
    Rollout,
}

impl StepAction {
    /// All actions in canonical planner emission order.
    pub const ALL: [StepAction; 6] = [
        StepAction::Build,
        StepAction::RenderCompose,
        StepAction::ApplyCompose,
        StepAction::Migrate,
        StepAction::HealthCheck,
        StepAction::Rollout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Build => "build",
            StepAction::RenderCompose => "render_compose",
            StepAction::ApplyCompose => "apply_compose",
            StepAction::Migrate => "migrate",
            StepAction::HealthCheck => "health_check",
            StepAction::Rollout => "rollout",
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unrecognized action name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown step action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for StepAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(StepAction::Build),
            "render_compose" => Ok(StepAction::RenderCompose),
            "apply_compose" => Ok(StepAction::ApplyCompose),
            "migrate" => Ok(StepAction::Migrate),
            "health_check" => Ok(StepAction::HealthCheck),
            "rollout" => Ok(StepAction::Rollout),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
