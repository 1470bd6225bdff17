// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stagecraft-core: Plan model, typed step inputs, and error taxonomy
//! shared by every stagecraft crate.

pub mod action;
pub mod error;
pub mod fact;
pub mod host;
pub mod id;
pub mod inputs;
pub mod plan;
pub mod report;
pub mod sanitize;

pub use action::{StepAction, UnknownAction};
pub use error::{ErrorKind, StageError};
pub use fact::Fact;
pub use host::HostRef;
pub use id::{CountingPlanIds, HostId, PlanId, PlanIdGen, RandomPlanIds, StepId};
pub use inputs::{
    ApplyComposeInputs, BuildInputs, HealthCheckInputs, HealthEndpoint, InputsError,
    MigrateInputs, MigrateMode, OverlaySpec, RenderComposeInputs, RolloutInputs,
    RolloutStrategy, Selection, StepInputs,
};
pub use plan::{HostPlan, HostPlanStep, Plan, PlanStep};
pub use report::{
    codes, ExecutionReport, PlanReport, RunStatus, StepError, StepExecution, StepStatus,
};
pub use sanitize::sanitize_message;
