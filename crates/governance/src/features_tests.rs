// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const REGISTRY: &str = r#"
features:
  - id: CLI_PLAN
    title: Plan command
    status: done
    spec: spec/cli/plan.md
    owner: core
    tests: [crates/engine/src/planner_tests.rs]
  - id: CLI_DEPLOY
    title: Deploy command
    status: wip
    spec: spec/cli/deploy.md
    depends_on: [CLI_PLAN]
  - id: PROVIDER_FRONTEND_GENERIC
    status: todo
    spec: spec/providers/frontend-generic.md
"#;

#[test]
fn parse_sorts_by_id() {
    let registry = FeatureRegistry::parse(REGISTRY).unwrap();
    let ids: Vec<&str> = registry.features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["CLI_DEPLOY", "CLI_PLAN", "PROVIDER_FRONTEND_GENERIC"]);
}

#[test]
fn lookup_by_id() {
    let registry = FeatureRegistry::parse(REGISTRY).unwrap();
    assert!(registry.contains("CLI_PLAN"));
    assert!(!registry.contains("CLI_BUILD"));
    assert_eq!(
        registry.get("CLI_DEPLOY").map(|f| f.status),
        Some(FeatureStatus::Wip)
    );
}

#[yare::parameterized(
    duplicate   = { "features:\n  - {id: A_ONE, status: todo, spec: a.md}\n  - {id: A_ONE, status: todo, spec: b.md}\n", "duplicate feature id" },
    bad_id      = { "features:\n  - {id: cli_plan, status: todo, spec: a.md}\n", "SCREAMING_SNAKE_CASE" },
    no_spec     = { "features:\n  - {id: A_ONE, status: todo, spec: \"\"}\n", "no spec path" },
    unknown_dep = { "features:\n  - {id: A_ONE, status: todo, spec: a.md, depends_on: [B_TWO]}\n", "unknown feature" },
)]
fn invalid_registries(yaml: &str, fragment: &str) {
    let err = FeatureRegistry::parse(yaml).unwrap_err();
    assert!(
        err.to_string().contains(fragment),
        "expected `{}` in `{}`",
        fragment,
        err,
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let err = FeatureRegistry::parse(
        "features:\n  - {id: A_ONE, status: todo, spec: a.md, priority: 1}\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("priority"));
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("features.yaml");
    std::fs::write(&path, REGISTRY).unwrap();
    let registry = FeatureRegistry::load(&path).unwrap();
    assert_eq!(registry.features.len(), 3);
}
