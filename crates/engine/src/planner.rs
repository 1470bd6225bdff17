// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan construction.
//!
//! Builds one host plan per environment host, chaining build →
//! render_compose → apply_compose → migrate → health_check → rollout.
//! Hosts, services, and databases are iterated in sorted order and
//! indexes assigned in emission order, so identical configuration
//! produces an identical plan (and digest).

use stagecraft_config::ProjectConfig;
use stagecraft_core::inputs::{Selection, StepInputs};
use stagecraft_core::{
    ApplyComposeInputs, BuildInputs, HealthCheckInputs, HostPlan, HostPlanStep, MigrateInputs,
    Plan, PlanIdGen, RenderComposeInputs, RolloutInputs, StageError, StepAction, StepId,
};

/// Paths the planner wires into the emitted steps.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Base compose document, relative to the project root.
    pub base_compose_path: String,
    /// Directory receiving per-host rendered compose files.
    pub output_dir: String,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            base_compose_path: "compose.yml".to_string(),
            output_dir: "deploy".to_string(),
        }
    }
}

/// Build a deterministic plan for one environment.
pub fn build_plan(
    config: &ProjectConfig,
    environment: &str,
    options: &PlanOptions,
    id_gen: &impl PlanIdGen,
) -> Result<Plan, StageError> {
    let env = config.environment(environment).map_err(StageError::from)?;
    if env.hosts.is_empty() {
        return Err(StageError::InvalidConfig(format!(
            "environment `{}` has no hosts",
            environment,
        )));
    }

    let mut plan = Plan::new(id_gen.next_plan_id(), environment);
    let service_names: Vec<String> = config.services.keys().cloned().collect();

    let mut hosts = env.hosts.clone();
    hosts.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

    for host in hosts {
        let mut host_plan = HostPlan::new(plan.id.clone(), host.clone());
        let mut index: u32 = 0;
        let mut push = |host_plan: &mut HostPlan,
                        index: &mut u32,
                        id: String,
                        action: StepAction,
                        inputs: serde_json::Value,
                        depends_on: Vec<StepId>| {
            host_plan.steps.push(HostPlanStep {
                id: StepId::new(id),
                action,
                inputs,
                depends_on,
                host: host_plan.host.id.clone(),
                index: *index,
            });
            *index += 1;
        };

        // build: one step per configured service, independent of each other
        let mut build_ids: Vec<StepId> = Vec::with_capacity(config.services.len());
        for (name, service) in &config.services {
            let mut inputs = BuildInputs {
                service: name.clone(),
                context_dir: service.context.clone(),
                dockerfile: service.dockerfile.clone(),
                image_tag: service.image.clone(),
                ..Default::default()
            };
            let id = format!("build-{}", name);
            build_ids.push(StepId::new(&id));
            push(
                &mut host_plan,
                &mut index,
                id,
                StepAction::Build,
                finalize(&mut inputs)?,
                Vec::new(),
            );
        }

        // render_compose: after all builds
        let output_path = format!("{}/{}/compose.yaml", options.output_dir, host.id);
        let mut render = RenderComposeInputs {
            base_compose_path: Some(options.base_compose_path.clone()),
            environment: environment.to_string(),
            host_roles: host.roles.clone(),
            output_path: Some(output_path.clone()),
            ..Default::default()
        };
        push(
            &mut host_plan,
            &mut index,
            "render-compose".to_string(),
            StepAction::RenderCompose,
            finalize(&mut render)?,
            build_ids.clone(),
        );

        // apply_compose: after render
        let mut apply = ApplyComposeInputs {
            compose_path: output_path,
            project_name: if config.project.is_empty() {
                None
            } else {
                Some(config.project.clone())
            },
            ..Default::default()
        };
        push(
            &mut host_plan,
            &mut index,
            "apply-compose".to_string(),
            StepAction::ApplyCompose,
            finalize(&mut apply)?,
            vec![StepId::new("render-compose")],
        );

        // migrate: one step per database, after apply
        let mut migrate_ids: Vec<StepId> = Vec::with_capacity(config.databases.len());
        for (name, database) in &config.databases {
            let mut inputs = MigrateInputs {
                engine: database.engine.clone(),
                database: name.clone(),
                selection: Selection::all(),
                ..Default::default()
            };
            let id = format!("migrate-{}", name);
            migrate_ids.push(StepId::new(&id));
            push(
                &mut host_plan,
                &mut index,
                id,
                StepAction::Migrate,
                finalize(&mut inputs)?,
                vec![StepId::new("apply-compose")],
            );
        }

        let gate_ids = if migrate_ids.is_empty() {
            vec![StepId::new("apply-compose")]
        } else {
            migrate_ids
        };

        // health_check and rollout only exist with buildable services
        if !service_names.is_empty() {
            let mut health = HealthCheckInputs {
                services: service_names.clone(),
                ..Default::default()
            };
            push(
                &mut host_plan,
                &mut index,
                "health-check".to_string(),
                StepAction::HealthCheck,
                finalize(&mut health)?,
                gate_ids,
            );

            let mut rollout = RolloutInputs {
                services: service_names.clone(),
                ..Default::default()
            };
            push(
                &mut host_plan,
                &mut index,
                "rollout".to_string(),
                StepAction::Rollout,
                finalize(&mut rollout)?,
                vec![StepId::new("health-check")],
            );
        }

        plan.host_plans.push(host_plan);
    }

    plan.validate()?;
    plan.seal()?;
    Ok(plan)
}

/// Normalize, validate, and serialize inputs for embedding in a step.
fn finalize<T: StepInputs>(inputs: &mut T) -> Result<serde_json::Value, StageError> {
    inputs.normalize();
    inputs.validate().map_err(StageError::from)?;
    serde_json::to_value(&*inputs)
        .map_err(|e| StageError::Internal(format!("failed to serialize inputs: {}", e)))
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
