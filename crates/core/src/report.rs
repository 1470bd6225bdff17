// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution reports.
//!
//! The executor appends a [`StepExecution`] as each step completes, so a
//! report always contains the per-step outcomes even when a host plan
//! terminates early.

use crate::id::{HostId, PlanId, StepId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes attached to failed or skipped step executions.
pub mod codes {
    /// No action executor registered for the step's action.
    pub const NO_EXECUTOR: &str = "NO_EXECUTOR";
    /// The action executor returned an error.
    pub const EXECUTION_ERROR: &str = "EXECUTION_ERROR";
    /// Cancellation was observed mid-step.
    pub const CANCELLED: &str = "CANCELLED";
    /// The step's timeout budget expired.
    pub const TIMEOUT: &str = "TIMEOUT";
}

/// Final status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Running => write!(f, "running"),
            StepStatus::Succeeded => write!(f, "succeeded"),
            StepStatus::Failed => write!(f, "failed"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Overall status of a host plan run (or a whole plan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
    Partial,
}

impl RunStatus {
    /// Merge two run statuses: any failure dominates, then partial.
    pub fn merge(self, other: RunStatus) -> RunStatus {
        match (self, other) {
            (RunStatus::Failed, _) | (_, RunStatus::Failed) => RunStatus::Failed,
            (RunStatus::Partial, _) | (_, RunStatus::Partial) => RunStatus::Partial,
            _ => RunStatus::Succeeded,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Partial => write!(f, "partial"),
        }
    }
}

/// Structured error recorded on a failed or skipped step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepError {
    pub code: String,
    pub message: String,
}

impl StepError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Outcome record for one executed (or skipped) step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepExecution {
    pub step_id: StepId,
    pub host: HostId,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl StepExecution {
    pub fn succeeded(step_id: impl Into<StepId>, host: impl Into<HostId>) -> Self {
        Self {
            step_id: step_id.into(),
            host: host.into(),
            status: StepStatus::Succeeded,
            error: None,
        }
    }

    pub fn failed(
        step_id: impl Into<StepId>,
        host: impl Into<HostId>,
        error: StepError,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            host: host.into(),
            status: StepStatus::Failed,
            error: Some(error),
        }
    }

    pub fn skipped(
        step_id: impl Into<StepId>,
        host: impl Into<HostId>,
        error: StepError,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            host: host.into(),
            status: StepStatus::Skipped,
            error: Some(error),
        }
    }
}

/// Report for one host plan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub plan_id: PlanId,
    pub host: HostId,
    pub status: RunStatus,
    pub steps: Vec<StepExecution>,
}

impl ExecutionReport {
    pub fn new(plan_id: impl Into<PlanId>, host: impl Into<HostId>) -> Self {
        Self {
            plan_id: plan_id.into(),
            host: host.into(),
            status: RunStatus::Succeeded,
            steps: Vec::new(),
        }
    }

    /// Record a step outcome, downgrading the overall status as needed.
    pub fn record(&mut self, execution: StepExecution) {
        match execution.status {
            StepStatus::Failed => self.status = RunStatus::Failed,
            StepStatus::Skipped => self.status = self.status.merge(RunStatus::Partial),
            _ => {}
        }
        self.steps.push(execution);
    }
}

/// Aggregated report across all host plans of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    pub plan_id: PlanId,
    pub status: RunStatus,
    pub hosts: Vec<ExecutionReport>,
}

impl PlanReport {
    /// Merge per-host reports; hosts are sorted by id for determinism.
    pub fn aggregate(plan_id: impl Into<PlanId>, mut hosts: Vec<ExecutionReport>) -> Self {
        hosts.sort_by(|a, b| a.host.as_str().cmp(b.host.as_str()));
        let status = hosts
            .iter()
            .fold(RunStatus::Succeeded, |acc, r| acc.merge(r.status));
        Self {
            plan_id: plan_id.into(),
            status,
            hosts,
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
