//! Context bundle and repository index specs.

use crate::prelude::*;

#[test]
fn bundle_lists_manifest_in_path_order() {
    let project = Project::empty();
    project.file("B.txt", "content B");
    project.file("A.txt", "content A");
    project.stagecraft().args(&["context"]).passes();

    let manifest = project.read(".ai-context/files/manifest.json");
    let entries: Vec<serde_json::Value> = serde_json::from_str(&manifest).unwrap();
    assert_eq!(entries[0]["path"], serde_json::json!("A.txt"));
    assert_eq!(entries[1]["path"], serde_json::json!("B.txt"));

    let chunks = project.read(".ai-context/files/chunks.ndjson");
    assert_eq!(chunks.lines().count(), 2);
}

#[test]
fn bundle_is_byte_identical_across_runs() {
    let project = Project::empty();
    project.file("A.txt", "content A");
    project.stagecraft().args(&["context"]).passes();
    let first = project.read(".ai-context/digest.txt");
    project.stagecraft().args(&["context"]).passes();
    assert_eq!(project.read(".ai-context/digest.txt"), first);
}

#[test]
fn index_is_sorted_and_digest_sealed() {
    let project = Project::scaffolded();
    project.stagecraft().args(&["index"]).passes();

    // cache layout: .xraycache/<root_name>/data/index.json
    let cache = project.path().join(".xraycache");
    let entry = std::fs::read_dir(&cache).unwrap().next().unwrap().unwrap();
    let index: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(entry.path().join("data/index.json")).unwrap(),
    )
    .unwrap();

    let files = index["files"].as_array().unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f["path"].as_str().unwrap()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
    assert_eq!(index["digest"].as_str().unwrap().len(), 64);
    // the cache directory itself is never indexed
    assert!(paths.iter().all(|p| !p.starts_with(".xraycache")));
}

#[test]
fn index_reports_summary_line() {
    Project::scaffolded()
        .stagecraft()
        .args(&["index"])
        .passes()
        .stdout_has("files,")
        .stdout_has("digest");
}
