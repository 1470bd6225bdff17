//! Behavioral specifications for the stagecraft CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/checks.rs"]
mod cli_checks;
#[path = "specs/cli/context.rs"]
mod cli_context;
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/plan.rs"]
mod cli_plan;
#[path = "specs/cli/render.rs"]
mod cli_render;
