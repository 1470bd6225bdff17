// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[yare::parameterized(
    present_with_default = { "${DB:-5432:5432}", &[("DB", "5433:5432")], "5433:5432" },
    absent_uses_default  = { "${DB:-5432:5432}", &[], "5432:5432" },
    absent_empty_default = { "${DB:-}", &[], "" },
    bare_present         = { "image: ${TAG}", &[("TAG", "api:1.2")], "image: api:1.2" },
    multiple             = { "${A}-${B:-b}", &[("A", "a")], "a-b" },
    no_placeholder       = { "plain", &[], "plain" },
)]
fn substitution(input: &str, table: &[(&str, &str)], expected: &str) {
    let result = substitute_str(input, &vars(table), &[]).unwrap();
    assert_eq!(result, expected);
}

#[test]
fn bare_missing_is_an_error() {
    let err = substitute_str("${MISSING}", &vars(&[]), &[]).unwrap_err();
    assert!(matches!(err, ComposeError::MissingVar(key) if key == "MISSING"));
}

#[test]
fn bare_missing_optional_resolves_empty() {
    let result = substitute_str("${DEBUG_PORT}", &vars(&[]), &["DEBUG_PORT".to_string()]).unwrap();
    assert_eq!(result, "");
}

#[test]
fn table_wins_over_optional() {
    let result = substitute_str(
        "${DEBUG_PORT}",
        &vars(&[("DEBUG_PORT", "9000:9000")]),
        &["DEBUG_PORT".to_string()],
    )
    .unwrap();
    assert_eq!(result, "9000:9000");
}

#[test]
fn substitute_value_walks_sequences_and_mappings() {
    let mut value: Value = serde_yaml::from_str(
        "services:\n  db:\n    ports:\n      - \"${DB:-}\"\n    image: ${IMAGE}\n",
    )
    .unwrap();
    substitute_value(&mut value, &vars(&[("IMAGE", "postgres:16")]), &[]).unwrap();
    let db = &value["services"]["db"];
    assert_eq!(db["ports"][0].as_str(), Some(""));
    assert_eq!(db["image"].as_str(), Some("postgres:16"));
}

#[test]
fn substitute_value_leaves_keys_untouched() {
    let mut value: Value = serde_yaml::from_str("\"${KEY}\": literal\n").unwrap();
    substitute_value(&mut value, &vars(&[]), &[]).unwrap();
    let map = value.as_mapping().unwrap();
    assert!(map.contains_key("${KEY}"));
}

#[test]
fn first_missing_variable_is_reported() {
    let err = substitute_str("${A} ${B}", &vars(&[]), &[]).unwrap_err();
    assert!(matches!(err, ComposeError::MissingVar(key) if key == "A"));
}
