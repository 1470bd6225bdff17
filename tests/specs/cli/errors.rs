//! Exit-code behavior for failure paths.

use crate::prelude::*;

#[test]
fn missing_config_exits_2() {
    Project::empty()
        .stagecraft()
        .args(&["plan", "-e", "production"])
        .exits(2);
}

#[test]
fn malformed_config_exits_2() {
    let project = Project::empty();
    project.file("stagecraft.yml", "environments: [oops\n");
    project
        .stagecraft()
        .args(&["plan", "-e", "production"])
        .exits(2);
}

#[test]
fn unknown_environment_exits_2() {
    Project::scaffolded()
        .stagecraft()
        .args(&["plan", "-e", "staging"])
        .exits(2)
        .stderr_has("unknown environment");
}

#[test]
fn unknown_subcommand_fails() {
    Project::scaffolded().stagecraft().args(&["destroy"]).fails();
}

#[test]
fn render_hash_mismatch_exits_1() {
    let expected = "0".repeat(64);
    Project::scaffolded()
        .stagecraft()
        .args(&["render", "-e", "production", "--expect-hash", &expected])
        .exits(1)
        .stderr_has("does not match");
}

#[test]
fn unknown_database_fails() {
    Project::scaffolded()
        .stagecraft()
        .args(&["migrate", "list", "-e", "production", "-d", "nope"])
        .fails()
        .stderr_has("unknown database");
}
