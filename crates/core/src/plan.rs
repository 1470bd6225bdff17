// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed execution plan: steps, host plans, and plan-level invariants.
//!
//! A [`Plan`] is built once per invocation and immutable during execution.
//! [`HostPlan::sort_steps`] establishes the ordering invariant (topological
//! by `depends_on`, ties broken by `index`); [`Plan::validate`] checks it.

use crate::action::StepAction;
use crate::error::StageError;
use crate::host::HostRef;
use crate::id::{HostId, PlanId, StepId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// A planner-emitted step, not yet bound to a host.
///
/// `host` is empty for global steps; `index` is a stable ordinal used to
/// break ordering ties deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanStep {
    pub id: StepId,
    pub action: StepAction,
    #[serde(default = "empty_object")]
    pub inputs: serde_json::Value,
    #[serde(default)]
    pub depends_on: Vec<StepId>,
    #[serde(default)]
    pub host: HostId,
    pub index: u32,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl PlanStep {
    /// Bind this step to a concrete host identity.
    pub fn bind(self, host: &HostId) -> HostPlanStep {
        HostPlanStep {
            id: self.id,
            action: self.action,
            inputs: self.inputs,
            depends_on: self.depends_on,
            host: host.clone(),
            index: self.index,
        }
    }
}

/// A [`PlanStep`] bound to a specific host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostPlanStep {
    pub id: StepId,
    pub action: StepAction,
    #[serde(default = "empty_object")]
    pub inputs: serde_json::Value,
    #[serde(default)]
    pub depends_on: Vec<StepId>,
    pub host: HostId,
    pub index: u32,
}

/// Ordered list of steps for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostPlan {
    pub plan_id: PlanId,
    pub host: HostRef,
    pub steps: Vec<HostPlanStep>,
}

impl HostPlan {
    pub fn new(plan_id: impl Into<PlanId>, host: HostRef) -> Self {
        Self {
            plan_id: plan_id.into(),
            host,
            steps: Vec::new(),
        }
    }

    /// Topologically sort steps by `depends_on`, breaking ties by
    /// `(index, id)`.
    ///
    /// Fails with a plan-invariant violation when the dependency graph has
    /// a cycle or references an unknown step id.
    pub fn sort_steps(&mut self) -> Result<(), StageError> {
        let known: HashSet<&str> = self.steps.iter().map(|s| s.id.as_str()).collect();
        for step in &self.steps {
            for dep in &step.depends_on {
                if !known.contains(dep.as_str()) {
                    return Err(StageError::PlanInvariantViolation(format!(
                        "step `{}` depends on unknown step `{}`",
                        step.id, dep,
                    )));
                }
            }
        }

        let mut remaining = std::mem::take(&mut self.steps);
        let mut placed: Vec<HostPlanStep> = Vec::with_capacity(remaining.len());
        let mut done: HashSet<String> = HashSet::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let mut best: Option<usize> = None;
            for (i, step) in remaining.iter().enumerate() {
                if !step.depends_on.iter().all(|d| done.contains(d.as_str())) {
                    continue;
                }
                best = match best {
                    None => Some(i),
                    Some(b) => {
                        let current = (remaining[b].index, remaining[b].id.as_str());
                        if (step.index, step.id.as_str()) < current {
                            Some(i)
                        } else {
                            Some(b)
                        }
                    }
                };
            }
            let Some(i) = best else {
                let mut stuck: Vec<String> =
                    remaining.iter().map(|s| s.id.to_string()).collect();
                stuck.sort_unstable();
                placed.append(&mut remaining);
                self.steps = placed;
                return Err(StageError::PlanInvariantViolation(format!(
                    "dependency cycle among steps: {}",
                    stuck.join(", "),
                )));
            };
            let step = remaining.remove(i);
            done.insert(step.id.0.clone());
            placed.push(step);
        }

        self.steps = placed;
        Ok(())
    }

    /// Check the host plan invariants without reordering anything.
    ///
    /// Step ids must be unique and non-empty, inputs must be JSON objects,
    /// every step must target this plan's host, and every dependency must
    /// be an earlier step in the list.
    pub fn validate(&self) -> Result<(), StageError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if step.id.is_empty() {
                return Err(StageError::PlanInvariantViolation(format!(
                    "empty step id in host plan for `{}`",
                    self.host.id,
                )));
            }
            if seen.contains(step.id.as_str()) {
                return Err(StageError::PlanInvariantViolation(format!(
                    "duplicate step id `{}`",
                    step.id,
                )));
            }
            if !step.inputs.is_object() {
                return Err(StageError::PlanInvariantViolation(format!(
                    "step `{}` inputs must be a JSON object",
                    step.id,
                )));
            }
            if step.host != self.host.id {
                return Err(StageError::PlanInvariantViolation(format!(
                    "step `{}` targets host `{}` inside the plan for `{}`",
                    step.id, step.host, self.host.id,
                )));
            }
            for dep in &step.depends_on {
                if !seen.contains(dep.as_str()) {
                    return Err(StageError::PlanInvariantViolation(format!(
                        "step `{}` depends on `{}` which is not an earlier step in the host plan",
                        step.id, dep,
                    )));
                }
            }
            seen.insert(step.id.as_str());
        }
        Ok(())
    }
}

/// The full set of host plans produced for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub id: PlanId,
    pub environment: String,
    pub host_plans: Vec<HostPlan>,
    #[serde(default)]
    pub digest: String,
}

impl Plan {
    pub fn new(id: impl Into<PlanId>, environment: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            environment: environment.into(),
            host_plans: Vec::new(),
            digest: String::new(),
        }
    }

    /// Validate all host plans and cross-plan invariants.
    pub fn validate(&self) -> Result<(), StageError> {
        let mut hosts: HashSet<&str> = HashSet::with_capacity(self.host_plans.len());
        for host_plan in &self.host_plans {
            if host_plan.plan_id != self.id {
                return Err(StageError::PlanInvariantViolation(format!(
                    "host plan for `{}` carries plan id `{}`, expected `{}`",
                    host_plan.host.id, host_plan.plan_id, self.id,
                )));
            }
            if host_plan.host.id.is_empty() {
                return Err(StageError::PlanInvariantViolation(
                    "host plan with empty host id".to_string(),
                ));
            }
            if !hosts.insert(host_plan.host.id.as_str()) {
                return Err(StageError::PlanInvariantViolation(format!(
                    "duplicate host plan for `{}`",
                    host_plan.host.id,
                )));
            }
            host_plan.validate()?;
        }
        Ok(())
    }

    /// SHA-256 over the canonical JSON of the plan with the digest and
    /// the invocation identity blanked (sorted keys, no insignificant
    /// whitespace).
    ///
    /// Identical configuration therefore yields an identical digest
    /// even though every invocation mints a fresh plan id.
    pub fn compute_digest(&self) -> Result<String, StageError> {
        let mut plan = self.clone();
        plan.digest = String::new();
        plan.id = PlanId::default();
        for host_plan in &mut plan.host_plans {
            host_plan.plan_id = PlanId::default();
        }
        let value = serde_json::to_value(&plan)
            .map_err(|e| StageError::Internal(format!("failed to serialize plan: {}", e)))?;
        let canonical = serde_json::to_string(&value)
            .map_err(|e| StageError::Internal(format!("failed to serialize plan: {}", e)))?;
        let digest = Sha256::digest(canonical.as_bytes());
        Ok(format!("{:x}", digest))
    }

    /// Fill in the digest field from the current plan contents.
    pub fn seal(&mut self) -> Result<(), StageError> {
        self.digest = self.compute_digest()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
