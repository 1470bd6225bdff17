//! Governance check specs.

use crate::prelude::*;

const FEATURES: &str = r#"
features:
  - id: CLI_PLAN
    status: done
    spec: spec/cli/plan.md
"#;

fn governed() -> Project {
    let project = Project::scaffolded();
    project.file("spec/features.yaml", FEATURES);
    project.file(
        "spec/cli/plan.md",
        "---\nfeature: CLI_PLAN\nversion: v1\nstatus: done\ndomain: cli\n---\n# plan\n",
    );
    project.file(
        "src/plan.rs",
        "// Feature: CLI_PLAN\n// Spec: spec/cli/plan.md\nfn plan() {}\n",
    );
    project.file("src/plan_tests.rs", "// Feature: CLI_PLAN\nfn t() {}\n");
    project
}

#[test]
fn check_config_passes_on_valid_project() {
    Project::scaffolded()
        .stagecraft()
        .args(&["check", "config"])
        .passes()
        .stdout_has("ok:");
}

#[test]
fn check_features_passes_on_healthy_tree() {
    governed()
        .stagecraft()
        .args(&["check", "features"])
        .passes()
        .stdout_has("CLI_PLAN done spec=true impl=1 tests=1");
}

#[test]
fn check_features_reports_missing_tests() {
    let project = governed();
    std::fs::remove_file(project.path().join("src/plan_tests.rs")).unwrap();
    project
        .stagecraft()
        .args(&["check", "features"])
        .fails()
        .stdout_has("MISSING_TESTS");
}

#[test]
fn check_commit_accepts_valid_subject() {
    governed()
        .stagecraft()
        .args(&["check", "commit", "feat(CLI_PLAN): extend planner"])
        .passes()
        .stdout_has("commit message ok");
}

#[test]
fn check_commit_rejects_multi_feature() {
    governed()
        .stagecraft()
        .args(&["check", "commit", "feat(CLI_PLAN, CLI_DEPLOY): refactor"])
        .fails()
        .stdout_has("MULTI_FEATURE");
}

#[test]
fn check_commit_json_counts_severities() {
    let stdout = governed()
        .stagecraft()
        .args(&["check", "commit", "feat(CLI_PLAN): extend planner", "--json"])
        .passes()
        .stdout();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["counts"]["error"], serde_json::json!(0));
}

#[test]
fn check_spec_validates_frontmatter() {
    governed()
        .stagecraft()
        .args(&["check", "spec", "spec/cli/plan.md"])
        .passes()
        .stdout_has("ok: CLI_PLAN v1");
}

#[test]
fn check_spec_reports_domain_mismatch() {
    let project = governed();
    project.file(
        "spec/providers/rogue.md",
        "---\nfeature: CLI_PLAN\nversion: v1\nstatus: done\ndomain: cli\n---\n",
    );
    project
        .stagecraft()
        .args(&["check", "spec", "spec/providers/rogue.md"])
        .fails()
        .stdout_has("does not match path segment");
}
