// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use stagecraft_core::CountingPlanIds;

const CONFIG: &str = r#"
project: shopd
environments:
  production:
    vars:
      DB: "5433:5432"
    hosts:
      - id: web-1
        address: 10.0.0.5
        roles: [web]
      - id: db-1
        address: 10.0.0.6
        roles: [db]
services:
  api:
    context: services/api
  web:
    context: services/web
databases:
  app:
    connection_env: DATABASE_URL
    migrations: db/migrations
"#;

fn config() -> stagecraft_config::ProjectConfig {
    stagecraft_config::ProjectConfig::parse(CONFIG).unwrap()
}

fn plan() -> Plan {
    build_plan(
        &config(),
        "production",
        &PlanOptions::default(),
        &CountingPlanIds::new("plan"),
    )
    .unwrap()
}

#[test]
fn one_host_plan_per_host_sorted_by_id() {
    let plan = plan();
    assert_eq!(plan.id, "plan-1");
    assert_eq!(plan.host_plans.len(), 2);
    assert_eq!(plan.host_plans[0].host.id, "db-1");
    assert_eq!(plan.host_plans[1].host.id, "web-1");
}

#[test]
fn steps_chain_in_action_order() {
    let plan = plan();
    let ids: Vec<&str> = plan.host_plans[0]
        .steps
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "build-api",
            "build-web",
            "render-compose",
            "apply-compose",
            "migrate-app",
            "health-check",
            "rollout",
        ]
    );
    // the emitted order satisfies the plan invariants
    plan.validate().unwrap();
}

#[test]
fn dependencies_are_linear_between_phases() {
    let plan = plan();
    let steps = &plan.host_plans[0].steps;
    let by_id = |id: &str| steps.iter().find(|s| s.id == *id).unwrap();
    assert!(by_id("build-api").depends_on.is_empty());
    assert_eq!(
        by_id("render-compose").depends_on,
        vec![StepId::new("build-api"), StepId::new("build-web")]
    );
    assert_eq!(
        by_id("apply-compose").depends_on,
        vec![StepId::new("render-compose")]
    );
    assert_eq!(
        by_id("migrate-app").depends_on,
        vec![StepId::new("apply-compose")]
    );
    assert_eq!(
        by_id("health-check").depends_on,
        vec![StepId::new("migrate-app")]
    );
    assert_eq!(by_id("rollout").depends_on, vec![StepId::new("health-check")]);
}

#[test]
fn indexes_follow_emission_order() {
    let plan = plan();
    for host_plan in &plan.host_plans {
        for (position, step) in host_plan.steps.iter().enumerate() {
            assert_eq!(step.index as usize, position);
        }
    }
}

#[test]
fn inputs_are_normalized_and_typed() {
    let plan = plan();
    let steps = &plan.host_plans[1].steps;
    let render = steps.iter().find(|s| s.id == "render-compose").unwrap();
    assert_eq!(
        render.inputs.get("host_roles"),
        Some(&serde_json::json!(["web"]))
    );
    assert_eq!(
        render.inputs.get("output_path"),
        Some(&serde_json::json!("deploy/web-1/compose.yaml"))
    );
    let migrate = steps.iter().find(|s| s.id == "migrate-app").unwrap();
    assert_eq!(migrate.inputs.get("engine"), Some(&serde_json::json!("sql")));
    assert_eq!(
        migrate.inputs.get("selection"),
        Some(&serde_json::json!({"all": true, "ids": [], "tags": []}))
    );
}

#[test]
fn identical_config_produces_identical_digest() {
    let first = plan();
    let second = plan();
    assert_eq!(first.digest, second.digest);
    assert!(!first.digest.is_empty());
}

#[test]
fn no_services_elides_health_and_rollout() {
    let mut config = config();
    config.services.clear();
    let plan = build_plan(
        &config,
        "production",
        &PlanOptions::default(),
        &CountingPlanIds::new("plan"),
    )
    .unwrap();
    let ids: Vec<&str> = plan.host_plans[0]
        .steps
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["render-compose", "apply-compose", "migrate-app"]);
}

#[test]
fn unknown_environment_is_invalid_config() {
    let err = build_plan(
        &config(),
        "staging",
        &PlanOptions::default(),
        &CountingPlanIds::new("plan"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), stagecraft_core::ErrorKind::InvalidConfig);
}

#[test]
fn environment_without_hosts_is_rejected() {
    let mut config = config();
    config
        .environments
        .get_mut("production")
        .unwrap()
        .hosts
        .clear();
    let err = build_plan(
        &config,
        "production",
        &PlanOptions::default(),
        &CountingPlanIds::new("plan"),
    )
    .unwrap_err();
    assert!(err.to_string().contains("no hosts"));
}
