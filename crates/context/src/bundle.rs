// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context bundle emission.
//!
//! Emits `.ai-context/` from a repository index: `meta.json`,
//! `files/manifest.json` (sorted by path), `files/chunks.ndjson` (one
//! chunk per line, manifest order), and `digest.txt` sealing the
//! bundle. All JSON is two-space indented and newline-terminated; no
//! timestamps anywhere.

use crate::atomic::write_atomic;
use crate::chunk::{chunk_lines, normalize_content, MAX_FILE_SIZE};
use crate::index::RepoIndex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stable generator id + version stamped into `meta.json`.
pub const GENERATOR: &str = "stagecraft-context/0.1.0";

/// Errors that can occur while emitting a bundle
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct Meta {
    project_name: String,
    generator: String,
}

/// One manifest entry: repo-relative path plus content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub hash: String,
}

/// Paths of the emitted bundle files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePaths {
    pub dir: PathBuf,
    pub meta: PathBuf,
    pub manifest: PathBuf,
    pub chunks: PathBuf,
    pub digest: PathBuf,
}

/// Two-space indented JSON terminated by one newline.
fn pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, BundleError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Emit the bundle for `root` from its index.
pub fn build_bundle(root: &Path, index: &RepoIndex) -> Result<BundlePaths, BundleError> {
    let dir = root.join(".ai-context");
    let paths = BundlePaths {
        meta: dir.join("meta.json"),
        manifest: dir.join("files").join("manifest.json"),
        chunks: dir.join("files").join("chunks.ndjson"),
        digest: dir.join("digest.txt"),
        dir,
    };

    let meta_bytes = pretty_json(&Meta {
        project_name: index.root_name.clone(),
        generator: GENERATOR.to_string(),
    })?;

    // Index files are already sorted by path
    let entries: Vec<ManifestEntry> = index
        .files
        .iter()
        .map(|f| ManifestEntry {
            path: f.path.clone(),
            hash: f.hash.clone(),
        })
        .collect();
    let manifest_bytes = pretty_json(&entries)?;

    let mut chunks_out: Vec<u8> = Vec::new();
    for entry in &entries {
        let path = root.join(&entry.path);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => {
                return Err(BundleError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        if bytes.len() as u64 >= MAX_FILE_SIZE {
            tracing::debug!(path = %entry.path, "skipping oversized file");
            continue;
        }
        if bytes.contains(&0) {
            tracing::debug!(path = %entry.path, "skipping binary file");
            continue;
        }
        let Ok(text) = String::from_utf8(bytes) else {
            tracing::debug!(path = %entry.path, "skipping non-utf8 file");
            continue;
        };
        for chunk in chunk_lines(&entry.path, &normalize_content(&text)) {
            chunks_out.extend_from_slice(&serde_json::to_vec(&chunk)?);
            chunks_out.push(b'\n');
        }
    }

    // digest.txt: sha256(manifest || meta || chunks), one hex line
    let mut hasher = Sha256::new();
    hasher.update(&manifest_bytes);
    hasher.update(&meta_bytes);
    hasher.update(&chunks_out);
    let digest_bytes = format!("{:x}\n", hasher.finalize()).into_bytes();

    for (path, bytes) in [
        (&paths.meta, &meta_bytes),
        (&paths.manifest, &manifest_bytes),
        (&paths.chunks, &chunks_out),
        (&paths.digest, &digest_bytes),
    ] {
        write_atomic(path, bytes).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;
    }

    tracing::info!(
        files = entries.len(),
        dir = %paths.dir.display(),
        "context bundle written"
    );
    Ok(paths)
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;
