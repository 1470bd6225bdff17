// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stagecraft-governance: spec, feature-mapping, and commit validation.
//!
//! Everything here is deterministic: features sort by id, violations by
//! (code, feature, path), and no output carries timestamps.

pub mod commit;
pub mod features;
pub mod frontmatter;
pub mod mapping;
pub mod suggest;

pub use commit::{validate_commit_subject, CommitViolation};
pub use features::{Feature, FeatureRegistry, FeatureStatus, FeaturesError};
pub use frontmatter::{parse_frontmatter, FrontmatterError, SpecFrontmatter};
pub use mapping::{
    analyze, FeatureMapping, MappingError, MappingReport, MappingStatus, Violation, ViolationCode,
};
pub use suggest::{render_json, render_text, Severity};
