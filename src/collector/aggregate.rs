//! Tree-wide aggregation of per-file metrics.
//!
//! The aggregator walks the root, keeps eligible files, analyzes each one
//! and folds the results into a single [`Metrics`] record. Per-file failures
//! are recorded and skipped; a failure to read the root itself yields an
//! all-zero record with a top-level error.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::analysis::{AnalyzeError, PythonAnalyzer, DEFAULT_MAX_FILE_SIZE};
use crate::metrics::{Counts, FileMetrics, Metrics};

use super::EligibilityFilter;

/// How per-file analysis is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    Sequential,
    /// Files are analyzed on the rayon pool; results are still folded in
    /// discovery order.
    Parallel,
}

/// Failures that abort a whole collection run.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("cannot read root {path}: {source}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read root {path}: not a directory")]
    NotADirectory { path: String },
    #[error("cannot read root {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Analyzer(#[from] AnalyzeError),
}

/// A path found during traversal.
#[derive(Debug, Clone)]
enum Entry {
    File { path: PathBuf, rel_path: String },
    Unreadable { rel_path: String, reason: String },
}

pub struct Aggregator<'a> {
    root: &'a Path,
    filter: &'a EligibilityFilter,
    max_file_size: u64,
    execution: Execution,
}

impl<'a> Aggregator<'a> {
    pub fn new(root: &'a Path, filter: &'a EligibilityFilter) -> Self {
        Self {
            root,
            filter,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            execution: Execution::Sequential,
        }
    }

    pub fn max_file_size(mut self, limit: u64) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Run the collection. Never fails; errors are captured in the record.
    pub fn run(&self) -> Metrics {
        let start = Instant::now();
        match self.try_run() {
            Ok(metrics) => {
                tracing::info!(
                    "Collected {} files ({} errors) under {} in {:?}",
                    metrics.files_analyzed,
                    metrics.total_errors.unwrap_or(0),
                    self.root.display(),
                    start.elapsed()
                );
                metrics
            }
            Err(e) => {
                tracing::warn!("Collection aborted: {}", e);
                Metrics::failure(e.to_string())
            }
        }
    }

    fn try_run(&self) -> Result<Metrics, CollectError> {
        let analyzer = PythonAnalyzer::new()?;
        let entries = self.discover()?;

        let results: Vec<(String, FileMetrics)> = match self.execution {
            Execution::Sequential => entries
                .iter()
                .map(|entry| self.analyze_entry(&analyzer, entry))
                .collect(),
            Execution::Parallel => entries
                .par_iter()
                .map(|entry| self.analyze_entry(&analyzer, entry))
                .collect(),
        };

        Ok(fold(results))
    }

    fn analyze_entry(&self, analyzer: &PythonAnalyzer, entry: &Entry) -> (String, FileMetrics) {
        match entry {
            Entry::File { path, rel_path } => (
                rel_path.clone(),
                analyzer.analyze_file(path, self.max_file_size),
            ),
            Entry::Unreadable { rel_path, reason } => {
                (rel_path.clone(), FileMetrics::failed(reason.clone()))
            }
        }
    }

    /// Walk the root in file-name order, pruning excluded directories.
    fn discover(&self) -> Result<Vec<Entry>, CollectError> {
        let root_display = self.root.display().to_string();

        let metadata = fs::metadata(self.root).map_err(|source| CollectError::Root {
            path: root_display.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(CollectError::NotADirectory { path: root_display });
        }

        let filter = self.filter;
        let walker = WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_type().is_dir() || !filter.is_excluded_name(e.file_name())
            });

        let mut entries = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(CollectError::Walk {
                        path: root_display,
                        source: err,
                    });
                }
                Err(err) => {
                    let rel_path = err
                        .path()
                        .map(|p| self.relative_display(p))
                        .unwrap_or_default();
                    let reason = err
                        .io_error()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| err.to_string());
                    tracing::debug!("Cannot traverse {}: {}", rel_path, reason);
                    entries.push(Entry::Unreadable { rel_path, reason });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry.path().strip_prefix(self.root).unwrap_or(entry.path());
            if !filter.is_eligible(rel) {
                continue;
            }

            entries.push(Entry::File {
                rel_path: display_path(rel),
                path: entry.path().to_path_buf(),
            });
        }

        Ok(entries)
    }

    fn relative_display(&self, path: &Path) -> String {
        display_path(path.strip_prefix(self.root).unwrap_or(path))
    }
}

/// Sum successful files and collect `"<file>: <error>"` lines for failures,
/// preserving input order.
pub fn fold<I>(results: I) -> Metrics
where
    I: IntoIterator<Item = (String, FileMetrics)>,
{
    let mut totals = Counts::default();
    let mut files_analyzed = 0;
    let mut errors = Vec::new();

    for (rel_path, file) in results {
        match file.error {
            Some(err) => {
                tracing::debug!("Skipping {}: {}", rel_path, err);
                errors.push(format!("{}: {}", rel_path, err));
            }
            None => {
                files_analyzed += 1;
                totals += file.counts;
            }
        }
    }

    Metrics::from_totals(totals, files_analyzed, errors)
}

/// Render a relative path with `/` separators.
fn display_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
