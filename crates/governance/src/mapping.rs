// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feature-mapping analysis.
//!
//! Cross-references the feature registry against the spec tree, the
//! implementation files (located by `Feature: <ID>` comment headers),
//! and the test files (`_test` filename pattern plus feature header).
//! The report is fully deterministic: features sort by id, violations
//! by (code, feature, path).

use crate::features::{FeatureRegistry, FeatureStatus};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

#[allow(clippy::expect_used)]
static FEATURE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Feature:\s*([A-Z][A-Z0-9_]+)").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static SPEC_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Spec:\s*(\S+)").expect("constant regex pattern is valid"));

/// Names never scanned.
const SCAN_IGNORES: &[&str] = &[".git", "target", "node_modules", ".ai-context", ".xraycache"];

/// Headers are expected near the top of a file.
const HEADER_SCAN_BYTES: usize = 2048;

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Stable violation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    MissingSpec,
    MissingImpl,
    MissingTests,
    SpecPathMismatch,
    OrphanSpec,
    FeatureNotListed,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::MissingSpec => "MISSING_SPEC",
            ViolationCode::MissingImpl => "MISSING_IMPL",
            ViolationCode::MissingTests => "MISSING_TESTS",
            ViolationCode::SpecPathMismatch => "SPEC_PATH_MISMATCH",
            ViolationCode::OrphanSpec => "ORPHAN_SPEC",
            ViolationCode::FeatureNotListed => "FEATURE_NOT_LISTED",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finding of the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    /// Feature id, or empty for file-level findings (orphan specs).
    pub feature: String,
    /// Repo-relative path, or empty for registry-level findings.
    pub path: String,
    pub message: String,
}

/// Derived health of one feature's artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    Ok,
    Flagged,
}

/// Artifact inventory for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMapping {
    pub id: String,
    pub status: FeatureStatus,
    pub spec_present: bool,
    pub impl_files: Vec<String>,
    pub test_files: Vec<String>,
    pub derived: MappingStatus,
}

/// The full analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingReport {
    pub features: Vec<FeatureMapping>,
    pub violations: Vec<Violation>,
}

/// Knobs for one analysis run.
#[derive(Debug, Clone)]
pub struct MappingOptions {
    /// Directory holding spec files, relative to the root.
    pub spec_dir: String,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            spec_dir: "spec".to_string(),
        }
    }
}

/// `_test` / `_tests` stem suffix, or a `test_` prefix.
fn is_test_file(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = name.split('.').next().unwrap_or(name);
    stem.ends_with("_test") || stem.ends_with("_tests") || stem.starts_with("test_")
}

/// Analyze the repository against the registry.
pub fn analyze(
    root: &Path,
    registry: &FeatureRegistry,
    options: &MappingOptions,
) -> Result<MappingReport, MappingError> {
    let mut impl_files: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut test_files: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut spec_files: BTreeSet<String> = BTreeSet::new();
    let mut violations: Vec<Violation> = Vec::new();

    let spec_prefix = format!("{}/", options.spec_dir.trim_end_matches('/'));
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !SCAN_IGNORES.contains(&name.as_ref())
        });

    for entry in walker {
        let entry = entry.map_err(|e| MappingError::Io {
            path: root.display().to_string(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path = relative.to_string_lossy().replace('\\', "/");

        if path.starts_with(&spec_prefix) && path.ends_with(".md") {
            spec_files.insert(path.clone());
            continue;
        }

        let bytes = std::fs::read(entry.path()).map_err(|source| MappingError::Io {
            path: path.clone(),
            source,
        })?;
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(HEADER_SCAN_BYTES)])
            .to_string();
        let Some(captures) = FEATURE_HEADER.captures(&head) else {
            continue;
        };
        let id = captures[1].to_string();

        if !registry.contains(&id) {
            violations.push(Violation {
                code: ViolationCode::FeatureNotListed,
                feature: id,
                path: path.clone(),
                message: "file references a feature id not in the registry".to_string(),
            });
            continue;
        }

        if let Some(spec_captures) = SPEC_HEADER.captures(&head) {
            let declared = &spec_captures[1];
            let registered = registry.get(&id).map(|f| f.spec.as_str()).unwrap_or("");
            if declared != registered {
                violations.push(Violation {
                    code: ViolationCode::SpecPathMismatch,
                    feature: id.clone(),
                    path: path.clone(),
                    message: format!(
                        "`Spec: {}` disagrees with registered spec `{}`",
                        declared, registered,
                    ),
                });
            }
        }

        if is_test_file(&path) {
            test_files.entry(id).or_default().push(path);
        } else {
            impl_files.entry(id).or_default().push(path);
        }
    }

    let mut referenced_specs: BTreeSet<&str> = BTreeSet::new();
    let mut mappings = Vec::with_capacity(registry.features.len());
    for feature in &registry.features {
        referenced_specs.insert(feature.spec.as_str());
        let spec_present = root.join(&feature.spec).is_file();
        let impls = impl_files.remove(&feature.id).unwrap_or_default();
        let tests = test_files.remove(&feature.id).unwrap_or_default();

        let before = violations.len();
        match feature.status {
            FeatureStatus::Todo => {}
            FeatureStatus::Wip => {
                lifecycle_check(&mut violations, feature, spec_present, &impls, None);
            }
            FeatureStatus::Done => {
                lifecycle_check(&mut violations, feature, spec_present, &impls, Some(&tests));
            }
        }
        let flagged = violations.len() > before
            || violations
                .iter()
                .any(|v| v.feature == feature.id && v.code == ViolationCode::SpecPathMismatch);

        mappings.push(FeatureMapping {
            id: feature.id.clone(),
            status: feature.status,
            spec_present,
            impl_files: impls,
            test_files: tests,
            derived: if flagged {
                MappingStatus::Flagged
            } else {
                MappingStatus::Ok
            },
        });
    }

    for orphan in spec_files {
        if !referenced_specs.contains(orphan.as_str()) {
            violations.push(Violation {
                code: ViolationCode::OrphanSpec,
                feature: String::new(),
                path: orphan,
                message: "spec file is not referenced by any registered feature".to_string(),
            });
        }
    }

    violations.sort_by(|a, b| {
        (a.code.as_str(), &a.feature, &a.path).cmp(&(b.code.as_str(), &b.feature, &b.path))
    });

    Ok(MappingReport {
        features: mappings,
        violations,
    })
}

fn lifecycle_check(
    violations: &mut Vec<Violation>,
    feature: &crate::features::Feature,
    spec_present: bool,
    impls: &[String],
    tests: Option<&Vec<String>>,
) {
    if !spec_present {
        violations.push(Violation {
            code: ViolationCode::MissingSpec,
            feature: feature.id.clone(),
            path: feature.spec.clone(),
            message: format!("{} feature has no spec file", feature.status),
        });
    }
    if impls.is_empty() {
        violations.push(Violation {
            code: ViolationCode::MissingImpl,
            feature: feature.id.clone(),
            path: String::new(),
            message: format!("{} feature has no implementation files", feature.status),
        });
    }
    if let Some(tests) = tests {
        if tests.is_empty() {
            violations.push(Violation {
                code: ViolationCode::MissingTests,
                feature: feature.id.clone(),
                path: String::new(),
                message: "done feature has no test files".to_string(),
            });
        }
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
