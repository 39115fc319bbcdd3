//! Pluggable metric collectors.
//!
//! This module provides:
//! - `Collector` trait: the single `collect()` capability plus cached keyed access
//! - `CollectorRegistry`: factory lookup by collector name
//! - `AstCollector`: the tree-sitter implementation, sequential or parallel
//!
//! # Example
//!
//! ```no_run
//! use umpyre::collector::{self, CollectorOptions};
//!
//! let options = CollectorOptions::new("src").with_exclude_dirs(["tests"]);
//! let collector = collector::global().create("umpyre_stats", options)?;
//! let metrics = collector.collect();
//! println!("{} functions", metrics.counts.num_functions);
//! # Ok::<(), umpyre::collector::RegistryError>(())
//! ```

mod aggregate;
mod ast;
mod cache;
mod filter;
mod registry;

pub use aggregate::{fold, Aggregator, CollectError, Execution};
pub use ast::{
    parallel_factory, sequential_factory, AstCollector, PARALLEL_COLLECTOR, SEQUENTIAL_COLLECTOR,
};
pub use cache::MetricsCache;
pub use filter::EligibilityFilter;
pub use registry::{global, CollectorFactory, CollectorRegistry, RegistryError};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::DEFAULT_MAX_FILE_SIZE;
use crate::metrics::{MetricValue, Metrics};

/// Construction parameters shared by all collectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Directory to analyze.
    pub root: PathBuf,
    /// Directory names whose contents are skipped, matched per path component.
    pub exclude_dirs: Vec<String>,
    /// Files larger than this many bytes are reported as errors.
    pub max_file_size: u64,
}

impl CollectorOptions {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclude_dirs: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_exclude_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_file_size(mut self, limit: u64) -> Self {
        self.max_file_size = limit;
        self
    }
}

impl Default for CollectorOptions {
    /// Rooted at the current working directory.
    fn default() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(root)
    }
}

/// A metrics-extraction strategy.
///
/// `collect` never fails: unreadable or unparsable files, and even an
/// unreadable root, are reported inside the returned record. Keyed access
/// reads the record of the most recent `collect`, computing it on first use.
pub trait Collector: Send + Sync {
    /// Registry name of this collector.
    fn name(&self) -> &'static str;

    fn options(&self) -> &CollectorOptions;

    /// Run a fresh collection and cache its result.
    fn collect(&self) -> Metrics;

    /// The cached record, collecting once if nothing is cached yet.
    fn metrics(&self) -> Arc<Metrics>;

    fn get(&self, key: &str) -> Option<MetricValue> {
        self.metrics().get(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        self.metrics().contains_key(key)
    }

    fn keys(&self) -> Vec<&'static str> {
        self.metrics().keys()
    }

    fn len(&self) -> usize {
        self.metrics().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
