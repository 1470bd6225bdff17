//! Compose rendering specs.

use crate::prelude::*;

#[test]
fn render_resolves_ports_and_drops_external_services() {
    Project::scaffolded()
        .stagecraft()
        .args(&["render", "-e", "production", "--host", "web-1"])
        .passes()
        .stdout_has("db:")
        .stdout_has("5433:5432");
}

#[test]
fn render_excludes_external_services() {
    let stdout = Project::scaffolded()
        .stagecraft()
        .args(&["render", "-e", "production", "--host", "web-1"])
        .passes()
        .stdout();
    assert!(!stdout.contains("api:latest"), "got:\n{}", stdout);
}

#[test]
fn render_is_byte_identical_across_runs() {
    let project = Project::scaffolded();
    let run = || {
        project
            .stagecraft()
            .args(&["render", "-e", "production", "--host", "web-1"])
            .passes()
            .stdout()
    };
    assert_eq!(run(), run());
}

#[test]
fn declared_hash_matches_rendered_bytes() {
    let project = Project::scaffolded();
    let stderr = project
        .stagecraft()
        .args(&["render", "-e", "production", "--host", "web-1"])
        .passes()
        .stderr();
    let hash = stderr
        .lines()
        .find_map(|l| l.strip_prefix("sha256 "))
        .unwrap()
        .trim()
        .to_string();

    project
        .stagecraft()
        .args(&[
            "render",
            "-e",
            "production",
            "--host",
            "web-1",
            "--expect-hash",
            &hash,
        ])
        .passes();
}

#[test]
fn render_out_writes_the_file() {
    let project = Project::scaffolded();
    project
        .stagecraft()
        .args(&[
            "render",
            "-e",
            "production",
            "--host",
            "web-1",
            "-o",
            "out/compose.yaml",
        ])
        .passes();
    assert!(project.read("out/compose.yaml").contains("db:"));
}

#[test]
fn unknown_host_fails() {
    Project::scaffolded()
        .stagecraft()
        .args(&["render", "-e", "production", "--host", "ghost"])
        .fails()
        .stderr_has("ghost");
}
