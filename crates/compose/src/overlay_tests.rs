// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

#[test]
fn maps_merge_by_key_with_overlay_precedence() {
    let mut base = yaml("services:\n  api:\n    image: api:1\n    restart: always\n");
    let overlay = yaml("services:\n  api:\n    image: api:2\n  worker:\n    image: worker:1\n");
    merge_value(&mut base, &overlay);
    assert_eq!(base["services"]["api"]["image"].as_str(), Some("api:2"));
    assert_eq!(base["services"]["api"]["restart"].as_str(), Some("always"));
    assert_eq!(base["services"]["worker"]["image"].as_str(), Some("worker:1"));
}

#[test]
fn scalars_replace() {
    let mut base = yaml("version: \"3.8\"\n");
    merge_value(&mut base, &yaml("version: \"3.9\"\n"));
    assert_eq!(base["version"].as_str(), Some("3.9"));
}

#[test]
fn lists_replace_wholesale() {
    let mut base = yaml("services:\n  api:\n    ports: [\"80:80\", \"443:443\"]\n");
    let overlay = yaml("services:\n  api:\n    ports: [\"8080:80\"]\n");
    merge_value(&mut base, &overlay);
    let ports = base["services"]["api"]["ports"].as_sequence().unwrap();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].as_str(), Some("8080:80"));
}

#[test]
fn type_mismatch_replaces() {
    let mut base = yaml("value: [1, 2]\n");
    merge_value(&mut base, &yaml("value:\n  nested: true\n"));
    assert_eq!(base["value"]["nested"].as_bool(), Some(true));
}
