// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step executor.
//!
//! Executes one host plan sequentially in plan order, dispatching steps
//! by action. Host plans within a plan run concurrently on separate
//! tasks; dependency edges only exist inside one host plan.

use crate::error::ActionError;
use async_trait::async_trait;
use stagecraft_core::{
    codes, sanitize_message, ExecutionReport, HostPlan, HostPlanStep, Plan, PlanReport,
    StageError, StepAction, StepError, StepExecution,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Executes one action kind.
///
/// Implementations re-decode `inputs` strictly and re-validate before
/// doing any work.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(
        &self,
        ctx: &CancellationToken,
        step: &HostPlanStep,
        inputs: &[u8],
    ) -> Result<(), ActionError>;
}

/// One executor per [`StepAction`].
#[derive(Default, Clone)]
pub struct ExecutorRegistry {
    executors: HashMap<StepAction, Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: StepAction, executor: Arc<dyn ActionExecutor>) {
        self.executors.insert(action, executor);
    }

    pub fn get(&self, action: StepAction) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(&action).cloned()
    }
}

/// Execute a host plan sequentially, honoring step dependencies.
///
/// A dependency on a step that has not completed is a plan-invariant
/// violation and aborts before executing anything further. A missing
/// executor downgrades the step to `skipped` and the run to `partial`.
/// The first execution failure stops the run.
pub async fn run_host_plan(
    ctx: &CancellationToken,
    plan: &HostPlan,
    executors: &ExecutorRegistry,
) -> Result<ExecutionReport, StageError> {
    let mut report = ExecutionReport::new(plan.plan_id.clone(), plan.host.id.clone());
    let mut completed: HashSet<&str> = HashSet::with_capacity(plan.steps.len());

    for step in &plan.steps {
        for dep in &step.depends_on {
            if !completed.contains(dep.as_str()) {
                return Err(StageError::PlanInvariantViolation(format!(
                    "step `{}` depends on `{}` which has not completed",
                    step.id, dep,
                )));
            }
        }

        let Some(executor) = executors.get(step.action) else {
            tracing::warn!(step = %step.id, action = %step.action, "no executor registered; skipping");
            report.record(StepExecution::skipped(
                step.id.clone(),
                step.host.clone(),
                StepError::new(
                    codes::NO_EXECUTOR,
                    format!("no executor registered for action `{}`", step.action),
                ),
            ));
            completed.insert(step.id.as_str());
            continue;
        };

        let inputs = serde_json::to_vec(&step.inputs)
            .map_err(|e| StageError::Internal(format!("failed to serialize inputs: {}", e)))?;

        let span = tracing::info_span!(
            "step",
            step = %step.id,
            action = %step.action,
            host = %step.host,
        );
        let start = std::time::Instant::now();
        let result = execute_step(ctx, executor, step, &inputs)
            .instrument(span)
            .await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        completed.insert(step.id.as_str());

        match result {
            Ok(()) => {
                tracing::info!(step = %step.id, elapsed_ms, "step succeeded");
                report.record(StepExecution::succeeded(step.id.clone(), step.host.clone()));
            }
            Err(err) => {
                tracing::error!(step = %step.id, elapsed_ms, error = %err, "step failed");
                report.record(StepExecution::failed(
                    step.id.clone(),
                    step.host.clone(),
                    StepError::new(err.code(), sanitize_message(&err.to_string())),
                ));
                // Strict mode: stop the host plan at the first failure
                break;
            }
        }
    }

    Ok(report)
}

async fn execute_step(
    ctx: &CancellationToken,
    executor: Arc<dyn ActionExecutor>,
    step: &HostPlanStep,
    inputs: &[u8],
) -> Result<(), ActionError> {
    tokio::select! {
        _ = ctx.cancelled() => Err(ActionError::Stage(StageError::Cancelled(format!(
            "step `{}` cancelled",
            step.id,
        )))),
        result = executor.execute(ctx, step, inputs) => result,
    }
}

/// Validate a plan and execute its host plans concurrently.
///
/// Each host plan runs on its own task with independent report
/// aggregation; a failed host plan does not halt its siblings.
pub async fn run_plan(
    ctx: &CancellationToken,
    plan: &Plan,
    executors: Arc<ExecutorRegistry>,
) -> Result<PlanReport, StageError> {
    plan.validate()?;

    let mut join_set = tokio::task::JoinSet::new();
    for host_plan in plan.host_plans.iter().cloned() {
        let ctx = ctx.clone();
        let executors = Arc::clone(&executors);
        join_set
            .spawn(async move { run_host_plan(&ctx, &host_plan, &executors).await });
    }

    let mut reports = Vec::with_capacity(plan.host_plans.len());
    let mut first_error: Option<StageError> = None;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(join_err) => {
                if first_error.is_none() {
                    first_error = Some(StageError::Internal(format!(
                        "host plan task failed: {}",
                        join_err,
                    )));
                }
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    Ok(PlanReport::aggregate(plan.id.clone(), reports))
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
