//! Plan computation specs.

use crate::prelude::*;

#[test]
fn plan_lists_steps_in_order() {
    Project::scaffolded()
        .stagecraft()
        .args(&["plan", "-e", "production"])
        .passes()
        .stdout_has("host web-1")
        .stdout_has("build-api [build]")
        .stdout_has("render-compose [render_compose]")
        .stdout_has("apply-compose [apply_compose]")
        .stdout_has("migrate-app [migrate]")
        .stdout_has("rollout [rollout]");
}

#[test]
fn plan_digest_is_stable_across_runs() {
    let project = Project::scaffolded();
    let first = project
        .stagecraft()
        .args(&["plan", "-e", "production", "--json"])
        .passes()
        .stdout();
    let second = project
        .stagecraft()
        .args(&["plan", "-e", "production", "--json"])
        .passes()
        .stdout();

    let first: serde_json::Value = serde_json::from_str(&first).unwrap();
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(first["digest"], second["digest"]);
    // the plan id is freshly generated each run
    assert_ne!(first["id"], second["id"]);
}

#[test]
fn plan_out_writes_json_file() {
    let project = Project::scaffolded();
    project
        .stagecraft()
        .args(&["plan", "-e", "production", "-o", "plan.json"])
        .passes();
    let plan: serde_json::Value = serde_json::from_str(&project.read("plan.json")).unwrap();
    assert_eq!(plan["environment"], serde_json::json!("production"));
    assert_eq!(plan["host_plans"].as_array().unwrap().len(), 1);
}
