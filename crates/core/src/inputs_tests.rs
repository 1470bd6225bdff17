// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn build_inputs() -> BuildInputs {
    BuildInputs {
        service: "api".into(),
        context_dir: "services/api".into(),
        dockerfile: Some("services/api/Dockerfile".into()),
        image_tag: Some("api:1.2.0".into()),
        build_args: BTreeMap::from([("RUST_VERSION".into(), "1.80".into())]),
        targets: vec!["runtime".into(), "builder".into()],
    }
}

// --- strict decoding ---

#[test]
fn unknown_key_is_rejected_with_key_name() {
    let err = BuildInputs::unmarshal_strict(
        br#"{"service":"api","context_dir":"services/api","imagetag":"x"}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("imagetag"), "got: {}", err);
    assert!(err.to_string().starts_with("build inputs:"));
}

#[yare::parameterized(
    build          = { StepAction::Build },
    render_compose = { StepAction::RenderCompose },
    apply_compose  = { StepAction::ApplyCompose },
    migrate        = { StepAction::Migrate },
    health_check   = { StepAction::HealthCheck },
    rollout        = { StepAction::Rollout },
)]
fn every_schema_rejects_unknown_keys(action: StepAction) {
    let bytes = br#"{"definitely_not_a_field": 1}"#;
    let message = match action {
        StepAction::Build => BuildInputs::unmarshal_strict(bytes)
            .unwrap_err()
            .to_string(),
        StepAction::RenderCompose => RenderComposeInputs::unmarshal_strict(bytes)
            .unwrap_err()
            .to_string(),
        StepAction::ApplyCompose => ApplyComposeInputs::unmarshal_strict(bytes)
            .unwrap_err()
            .to_string(),
        StepAction::Migrate => MigrateInputs::unmarshal_strict(bytes)
            .unwrap_err()
            .to_string(),
        StepAction::HealthCheck => HealthCheckInputs::unmarshal_strict(bytes)
            .unwrap_err()
            .to_string(),
        StepAction::Rollout => RolloutInputs::unmarshal_strict(bytes)
            .unwrap_err()
            .to_string(),
    };
    assert!(message.contains("definitely_not_a_field"), "got: {}", message);
}

// --- build ---

#[test]
fn build_normalize_sorts_targets() {
    let mut inputs = build_inputs();
    inputs.normalize();
    assert_eq!(inputs.targets, vec!["builder".to_string(), "runtime".to_string()]);
    inputs.validate().unwrap();
}

#[test]
fn build_requires_service_and_context_dir() {
    let mut inputs = BuildInputs::default();
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::MissingField { field: "service", .. }
    ));
    inputs.service = "api".into();
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::MissingField { field: "context_dir", .. }
    ));
}

#[yare::parameterized(
    backslash    = { r"services\api" },
    absolute     = { "/services/api" },
    dot_segment  = { "services/./api" },
    dotdot       = { "services/../api" },
    double_slash = { "services//api" },
)]
fn build_rejects_dirty_context_dir(path: &str) {
    let mut inputs = build_inputs();
    inputs.context_dir = path.into();
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::InvalidField { field: "context_dir", .. }
    ));
}

// --- render_compose ---

fn render_inputs() -> RenderComposeInputs {
    RenderComposeInputs {
        base_compose_path: Some("compose.yml".into()),
        environment: "production".into(),
        ..Default::default()
    }
}

#[test]
fn render_requires_exactly_one_base_source() {
    let mut inputs = render_inputs();
    inputs.base_compose_inline = Some("services: {}".into());
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::InvalidField { field: "base_compose_path", .. }
    ));

    inputs.base_compose_path = None;
    inputs.base_compose_inline = None;
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::MissingField { field: "base_compose_path", .. }
    ));
}

#[test]
fn render_normalize_sorts_overlays_and_roles() {
    let mut inputs = render_inputs();
    inputs.overlays = vec![
        OverlaySpec {
            name: "zz-late".into(),
            inline: Some("services: {}".into()),
            ..Default::default()
        },
        OverlaySpec {
            name: "aa-early".into(),
            inline: Some("services: {}".into()),
            ..Default::default()
        },
    ];
    inputs.host_roles = vec!["web".into(), "db".into(), "web".into()];
    inputs.normalize();
    assert_eq!(inputs.overlays[0].name, "aa-early");
    assert_eq!(inputs.host_roles, vec!["db".to_string(), "web".to_string()]);
    inputs.validate().unwrap();
}

#[test]
fn render_overlay_needs_exactly_one_source() {
    let mut inputs = render_inputs();
    inputs.overlays = vec![OverlaySpec {
        name: "prod".into(),
        ..Default::default()
    }];
    let err = inputs.validate().unwrap_err();
    assert!(err.to_string().contains("exactly one of"));
}

#[test]
fn render_hash_requires_alg_and_hex64() {
    let mut inputs = render_inputs();
    inputs.expected_compose_hash = Some("ab".repeat(32));
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::MissingField { field: "hash_alg", .. }
    ));

    inputs.hash_alg = Some("md5".into());
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::InvalidField { field: "hash_alg", .. }
    ));

    inputs.hash_alg = Some("sha256".into());
    inputs.validate().unwrap();

    inputs.expected_compose_hash = Some("AB".repeat(32));
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::InvalidField { field: "expected_compose_hash", .. }
    ));

    inputs.expected_compose_hash = Some("abc".into());
    assert!(inputs.validate().is_err());
}

// --- apply_compose ---

#[test]
fn apply_defaults_remove_orphans_true() {
    let inputs =
        ApplyComposeInputs::unmarshal_strict(br#"{"compose_path":"out/compose.yml"}"#).unwrap();
    assert!(inputs.remove_orphans);
    inputs.validate().unwrap();
}

#[test]
fn apply_normalize_sorts_services() {
    let mut inputs = ApplyComposeInputs {
        compose_path: "out/compose.yml".into(),
        services: vec!["web".into(), "api".into(), "web".into()],
        ..Default::default()
    };
    inputs.normalize();
    assert_eq!(inputs.services, vec!["api".to_string(), "web".to_string()]);
}

// --- migrate ---

#[test]
fn migrate_defaults() {
    let inputs =
        MigrateInputs::unmarshal_strict(br#"{"engine":"sql","database":"app"}"#).unwrap();
    assert!(inputs.fail_fast);
    assert!(inputs.allow_noop);
    assert_eq!(inputs.mode, MigrateMode::Apply);
    assert!(inputs.selection.is_empty());
    inputs.validate().unwrap();
}

#[test]
fn migrate_rejects_zero_timeout() {
    let mut inputs = MigrateInputs {
        engine: "sql".into(),
        database: "app".into(),
        timeout_seconds: Some(0),
        ..Default::default()
    };
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::InvalidField { field: "timeout_seconds", .. }
    ));
    inputs.timeout_seconds = Some(30);
    inputs.validate().unwrap();
}

#[test]
fn selection_normalize_sorts_and_dedupes() {
    let mut selection = Selection {
        all: false,
        ids: vec!["002.sql".into(), "001.sql".into(), "002.sql".into()],
        tags: vec!["seed".into(), "core".into()],
    };
    selection.normalize();
    assert_eq!(selection.ids, vec!["001.sql".to_string(), "002.sql".to_string()]);
    assert_eq!(selection.tags, vec!["core".to_string(), "seed".to_string()]);
    assert!(!selection.is_empty());
    assert!(Selection::default().is_empty());
    assert!(!Selection::all().is_empty());
}

// --- health_check ---

#[test]
fn health_check_needs_endpoints_or_services() {
    let inputs = HealthCheckInputs::default();
    let err = inputs.validate().unwrap_err();
    assert!(err.to_string().contains("at least one of"));
}

#[test]
fn health_check_endpoint_defaults_and_sorting() {
    let mut inputs = HealthCheckInputs::unmarshal_strict(
        br#"{"endpoints":[{"name":"web","url":"http://web/healthz"},{"name":"api","url":"http://api/healthz"}]}"#,
    )
    .unwrap();
    inputs.normalize();
    assert_eq!(inputs.endpoints[0].name, "api");
    assert_eq!(inputs.endpoints[0].expect_status, 200);
    inputs.validate().unwrap();
}

#[test]
fn health_check_rejects_zero_interval() {
    let inputs = HealthCheckInputs {
        services: vec!["api".into()],
        interval_seconds: Some(0),
        ..Default::default()
    };
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::InvalidField { field: "interval_seconds", .. }
    ));
}

// --- rollout ---

#[test]
fn rollout_requires_services() {
    let inputs = RolloutInputs::default();
    assert!(matches!(
        inputs.validate().unwrap_err(),
        InputsError::MissingField { field: "services", .. }
    ));
}

#[test]
fn rollout_defaults() {
    let inputs = RolloutInputs::unmarshal_strict(br#"{"services":["api"]}"#).unwrap();
    assert_eq!(inputs.strategy, RolloutStrategy::Rolling);
    assert!(inputs.health_gate);
    inputs.validate().unwrap();
}

#[test]
fn rollout_rejects_zero_batch_size() {
    let inputs = RolloutInputs {
        services: vec!["api".into()],
        batch_size: Some(0),
        ..Default::default()
    };
    assert!(inputs.validate().is_err());
}

// --- ordering contract ---

#[test]
fn marshal_roundtrip_preserves_bytes_for_canonical_inputs() {
    let mut inputs = build_inputs();
    inputs.normalize();
    inputs.validate().unwrap();
    let bytes = inputs.marshal().unwrap();
    let reparsed = BuildInputs::unmarshal_strict(&bytes).unwrap();
    assert_eq!(reparsed.marshal().unwrap(), bytes);
}

#[test]
fn decode_validated_runs_both_phases() {
    let err = decode_validated::<MigrateInputs>(br#"{"engine":"sql","database":""}"#).unwrap_err();
    assert!(matches!(
        err,
        InputsError::MissingField { field: "database", .. }
    ));
}

// --- property tests ---

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalize_is_idempotent_for_build(
            targets in proptest::collection::vec("[a-z]{1,8}", 0..6),
        ) {
            let mut once = BuildInputs {
                service: "api".into(),
                context_dir: "services/api".into(),
                targets,
                ..Default::default()
            };
            once.normalize();
            let mut twice = once.clone();
            twice.normalize();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalize_is_idempotent_for_selection(
            ids in proptest::collection::vec("[a-z0-9._-]{1,12}", 0..8),
            tags in proptest::collection::vec("[a-z]{1,6}", 0..8),
        ) {
            let mut once = Selection { all: false, ids, tags };
            once.normalize();
            let mut twice = once.clone();
            twice.normalize();
            prop_assert_eq!(once, twice);
        }
    }
}
