//! Byte encoding of collected metrics for persistence.
//!
//! The encoding is a versioned JSON envelope pairing a record with the
//! revision it describes. Where the bytes end up is the caller's concern.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::metrics::Metrics;

/// Current envelope format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid metrics encoding: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported metrics format version {0}")]
    UnsupportedVersion(u32),
}

/// A metrics record tagged with its revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMetrics {
    pub format_version: u32,
    /// Revision identifier, e.g. a commit hash.
    pub revision: String,
    /// Seconds since the Unix epoch at encoding time.
    pub collected_at: u64,
    pub metrics: Metrics,
}

/// Encode a record for `revision`.
pub fn serialize_metrics(metrics: &Metrics, revision: &str) -> Result<Vec<u8>, StorageError> {
    let collected_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let stored = StoredMetrics {
        format_version: FORMAT_VERSION,
        revision: revision.to_string(),
        collected_at,
        metrics: metrics.clone(),
    };
    Ok(serde_json::to_vec_pretty(&stored)?)
}

/// Decode bytes produced by [`serialize_metrics`].
pub fn deserialize_metrics(bytes: &[u8]) -> Result<StoredMetrics, StorageError> {
    let stored: StoredMetrics = serde_json::from_slice(bytes)?;
    if stored.format_version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion(stored.format_version));
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Counts;

    #[test]
    fn test_restores_record_and_revision() {
        let metrics = Metrics::from_totals(
            Counts {
                num_functions: 2,
                total_lines: 32,
                function_lines: 8,
                ..Counts::default()
            },
            2,
            vec!["bad.py: invalid syntax at line 1, column 5".to_string()],
        );

        let bytes = serialize_metrics(&metrics, "abc123").unwrap();
        let stored = deserialize_metrics(&bytes).unwrap();

        assert_eq!(stored.revision, "abc123");
        assert_eq!(stored.format_version, FORMAT_VERSION);
        assert!(stored.collected_at > 0);
        assert_eq!(stored.metrics, metrics);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let json = br#"{"format_version": 99, "revision": "x", "collected_at": 0,
            "metrics": {"num_functions": 0, "num_classes": 0, "total_lines": 0,
            "empty_lines": 0, "comment_lines": 0, "docs_lines": 0, "function_lines": 0,
            "empty_lines_ratio": 0.0, "comment_lines_ratio": 0.0,
            "function_lines_ratio": 0.0, "mean_lines_per_function": 0.0,
            "files_analyzed": 0}}"#;
        let err = deserialize_metrics(json).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedVersion(99)));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = deserialize_metrics(b"not json").unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
