//! Eligibility of discovered paths.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path};

/// Decides which discovered files are analyzed.
///
/// A path is eligible when its extension matches and none of its directory
/// components equals an excluded name. Matching is on whole components:
/// excluding `test` does not exclude `tests/` or `test_utils.py`.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    extension: String,
    excluded: HashSet<String>,
}

impl EligibilityFilter {
    pub fn new<I, S>(extension: &str, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a single path component is in the exclusion set.
    pub fn is_excluded_name(&self, name: &OsStr) -> bool {
        !self.excluded.is_empty() && self.excluded.contains(name.to_string_lossy().as_ref())
    }

    /// Check a path relative to the collection root.
    pub fn is_eligible(&self, rel_path: &Path) -> bool {
        let ext = rel_path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != self.extension {
            return false;
        }

        let dirs = rel_path.parent().unwrap_or_else(|| Path::new(""));
        !dirs.components().any(|c| match c {
            Component::Normal(name) => self.is_excluded_name(name),
            _ => false,
        })
    }
}
