//! Execution-free single-file analysis.
//!
//! A file is read under a size limit, split into physical lines for the raw
//! line scan, and parsed with tree-sitter for definition counts:
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Source File │────▶│ read_source  │────▶│ scan_lines  │────▶│ FileMetrics │
//! └─────────────┘     │ (size, utf8) │     │ tree-sitter │     └─────────────┘
//!                     └──────────────┘     └─────────────┘
//! ```
//!
//! Failures at any step produce a zeroed [`FileMetrics`](crate::metrics::FileMetrics)
//! with an error description instead of an `Err`.

mod lines;
mod python;

pub use lines::{scan_lines, LineStats, COMMENT_MARKER};
pub use python::{DefinitionStats, PythonAnalyzer};

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Default ceiling for a single file read (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File extension (without dot) of analyzed sources.
pub const SOURCE_EXTENSION: &str = "py";

/// Reasons a single file could not be analyzed.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("file too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("invalid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("invalid syntax at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("invalid query: {0}")]
    Query(#[from] tree_sitter::QueryError),
    #[error("parser produced no tree")]
    NoTree,
}

/// Read a file as UTF-8, refusing files above `max_file_size` bytes.
pub fn read_source(path: &Path, max_file_size: u64) -> Result<String, AnalyzeError> {
    let size = fs::metadata(path)?.len();
    if size > max_file_size {
        return Err(AnalyzeError::TooLarge {
            size,
            limit: max_file_size,
        });
    }

    let bytes = fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}
