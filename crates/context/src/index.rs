// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository index.
//!
//! Walks the repository into per-file records and aggregate counters,
//! then seals the canonical JSON form with a digest: the index is
//! serialized with an empty digest field, canonicalized (sorted keys,
//! no insignificant whitespace), hashed, and the hex digest substituted
//! back in.

use crate::atomic::write_atomic;
use crate::chunk::{normalize_content, MAX_FILE_SIZE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while building or writing an index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Names never traversed or indexed.
const FIXED_IGNORES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "target",
    "node_modules",
    ".ai-context",
    ".xraycache",
    ".DS_Store",
];

const INDEX_SCHEMA_VERSION: u32 = 1;

/// One indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Repo-relative path with forward slashes.
    pub path: String,
    pub size: u64,
    /// `sha256:<hex64>` over the raw file bytes.
    pub hash: String,
    pub lang: String,
    /// Line count after newline normalization.
    pub loc: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u32>,
}

/// The canonical repository index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoIndex {
    pub schema_version: u32,
    pub root_name: String,
    pub target_path: String,
    pub files: Vec<FileNode>,
    pub file_count: usize,
    pub total_size: u64,
    pub languages: BTreeMap<String, usize>,
    pub top_dirs: BTreeMap<String, usize>,
    pub digest: String,
}

impl RepoIndex {
    /// SHA-256 over the canonical JSON with an empty digest field.
    pub fn compute_digest(&self) -> Result<String, IndexError> {
        let mut index = self.clone();
        index.digest = String::new();
        let value = serde_json::to_value(&index)?;
        let canonical = serde_json::to_string(&value)?;
        Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
    }
}

/// Knobs for one index run.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Files at or above this size are not indexed.
    pub max_file_size: u64,
    /// Optional ignore file: one repo-relative path prefix per line,
    /// `#` comments allowed.
    pub ignore_file: Option<PathBuf>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            ignore_file: None,
        }
    }
}

/// Build the index for a repository root.
pub fn build_index(root: &Path, options: &IndexOptions) -> Result<RepoIndex, IndexError> {
    let ignore_prefixes = load_ignore_file(options.ignore_file.as_deref())?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !FIXED_IGNORES.contains(&name.as_ref())
        });

    for entry in walker {
        let entry = entry.map_err(|e| IndexError::Io {
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
        if ignore_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            continue;
        }
        let metadata = entry.metadata().map_err(|e| IndexError::Io {
            path: path.clone(),
            source: e.into(),
        })?;
        if metadata.len() >= options.max_file_size {
            tracing::debug!(path = %path, size = metadata.len(), "skipping oversized file");
            continue;
        }
        let bytes = std::fs::read(entry.path()).map_err(|source| IndexError::Io {
            path: path.clone(),
            source,
        })?;
        let hash = format!("sha256:{:x}", Sha256::digest(&bytes));
        let loc = count_lines(&String::from_utf8_lossy(&bytes));
        files.push(FileNode {
            lang: lang_for(&path).to_string(),
            path,
            size: metadata.len(),
            hash,
            loc,
            complexity: None,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    let mut top_dirs: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_size = 0u64;
    for file in &files {
        *languages.entry(file.lang.clone()).or_insert(0) += 1;
        let top = file.path.split('/').next().filter(|_| file.path.contains('/'));
        *top_dirs.entry(top.unwrap_or(".").to_string()).or_insert(0) += 1;
        total_size += file.size;
    }

    let mut index = RepoIndex {
        schema_version: INDEX_SCHEMA_VERSION,
        root_name: root_name(root),
        target_path: root.display().to_string(),
        file_count: files.len(),
        files,
        total_size,
        languages,
        top_dirs,
        digest: String::new(),
    };
    index.digest = index.compute_digest()?;
    Ok(index)
}

/// Write the index under `<cache_root>/<root_name>/data/index.json`.
pub fn write_index(
    index: &RepoIndex,
    cache_root: &Path,
) -> Result<PathBuf, IndexError> {
    let path = cache_root
        .join(&index.root_name)
        .join("data")
        .join("index.json");
    let mut bytes = serde_json::to_vec_pretty(index)?;
    bytes.push(b'\n');
    write_atomic(&path, &bytes).map_err(|source| IndexError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "repo".to_string())
}

fn count_lines(content: &str) -> usize {
    let normalized = normalize_content(content);
    let mut count = normalized.split('\n').count();
    if normalized.ends_with('\n') || normalized.is_empty() {
        count -= 1;
    }
    count
}

fn load_ignore_file(path: Option<&Path>) -> Result<Vec<String>, IndexError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Language derived from the file extension.
fn lang_for(path: &str) -> &'static str {
    let extension = path.rsplit('/').next().and_then(|n| n.rsplit_once('.')).map(|(_, e)| e);
    match extension {
        Some("rs") => "rust",
        Some("go") => "go",
        Some("py") => "python",
        Some("js") | Some("jsx") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        Some("md") => "markdown",
        Some("yml") | Some("yaml") => "yaml",
        Some("toml") => "toml",
        Some("json") => "json",
        Some("sh") => "shell",
        Some("sql") => "sql",
        Some("html") => "html",
        Some("css") => "css",
        Some("c") | Some("h") => "c",
        Some("cc") | Some("cpp") | Some("hpp") => "cpp",
        Some("java") => "java",
        Some("rb") => "ruby",
        _ => "other",
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
