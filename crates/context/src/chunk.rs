// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented content chunking for the context bundle

use serde::{Deserialize, Serialize};

/// Maximum lines per chunk.
pub const CHUNK_MAX_LINES: usize = 200;

/// Files at or above this size are skipped entirely (2 MiB).
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// One contiguous run of lines from a source file.
///
/// Line numbers are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
}

/// Normalize line endings: `\r\n` becomes `\n`.
pub fn normalize_content(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// Split normalized content into chunks of at most [`CHUNK_MAX_LINES`].
///
/// A trailing newline does not produce a spurious empty final line; an
/// empty file produces no chunks.
pub fn chunk_lines(file_path: &str, content: &str) -> Vec<Chunk> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    // split() yields one trailing empty element for "a\n"; drop it so
    // the chunk line count matches the source's own lines
    if lines.last() == Some(&"") {
        lines.pop();
    }
    if lines.is_empty() {
        return Vec::new();
    }

    lines
        .chunks(CHUNK_MAX_LINES)
        .enumerate()
        .map(|(i, window)| {
            let start_line = i * CHUNK_MAX_LINES + 1;
            Chunk {
                file_path: file_path.to_string(),
                start_line,
                end_line: start_line + window.len() - 1,
                content: window.join("\n"),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
