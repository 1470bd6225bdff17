// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    invalid_config  = { StageError::InvalidConfig("x".into()), ErrorKind::InvalidConfig, 2 },
    unsupported     = { StageError::Unsupported("x".into()), ErrorKind::Unsupported, 1 },
    unknown         = { StageError::UnknownProvider("x".into()), ErrorKind::UnknownProvider, 1 },
    dependency      = { StageError::DependencyMissing("x".into()), ErrorKind::DependencyMissing, 1 },
    connection      = { StageError::ConnectionFailed("x".into()), ErrorKind::ConnectionFailed, 1 },
    outputs         = { StageError::OutputsContractViolation("x".into()), ErrorKind::OutputsContractViolation, 1 },
    migration       = { StageError::MigrationFailed("x".into()), ErrorKind::MigrationFailed, 1 },
    plan_invariant  = { StageError::PlanInvariantViolation("x".into()), ErrorKind::PlanInvariantViolation, 3 },
    execution       = { StageError::ExecutionError("x".into()), ErrorKind::ExecutionError, 1 },
    cancelled       = { StageError::Cancelled("x".into()), ErrorKind::Cancelled, 1 },
    internal        = { StageError::Internal("x".into()), ErrorKind::Internal, 1 },
)]
fn kind_and_exit_code(err: StageError, kind: ErrorKind, exit_code: i32) {
    assert_eq!(err.kind(), kind);
    assert_eq!(err.kind().exit_code(), exit_code);
}

#[test]
fn display_prefixes_category() {
    let err = StageError::InvalidConfig("missing field `environments`".to_string());
    assert_eq!(
        err.to_string(),
        "invalid config: missing field `environments`"
    );
}

#[test]
fn kind_wire_form_is_snake_case() {
    let json = serde_json::to_string(&ErrorKind::OutputsContractViolation).unwrap();
    assert_eq!(json, "\"outputs_contract_violation\"");
    let back: ErrorKind = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ErrorKind::OutputsContractViolation);
    assert_eq!(back.to_string(), "outputs_contract_violation");
}
