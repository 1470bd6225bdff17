// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn canonical_json_sorts_keys() {
    let fact = Fact::new("host/web-1", "compose_hash", json!({"b": 1, "a": 2}));
    let canonical = fact.canonical_json().unwrap();
    assert_eq!(
        canonical,
        r#"{"name":"compose_hash","subject":"host/web-1","value":{"a":2,"b":1}}"#
    );
}

#[test]
fn identical_facts_serialize_identically() {
    let a = Fact::new("svc/api", "image", json!("api:1.2"));
    let b = Fact::new("svc/api", "image", json!("api:1.2"));
    assert_eq!(a.canonical_json().unwrap(), b.canonical_json().unwrap());
}
