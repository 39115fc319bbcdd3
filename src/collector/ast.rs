//! Tree-sitter backed collector.

use std::sync::Arc;

use crate::analysis::SOURCE_EXTENSION;
use crate::metrics::Metrics;

use super::{Aggregator, Collector, CollectorOptions, EligibilityFilter, Execution, MetricsCache};

/// Registry name of the sequential collector.
pub const SEQUENTIAL_COLLECTOR: &str = "umpyre_stats";

/// Registry name of the rayon-backed collector.
pub const PARALLEL_COLLECTOR: &str = "umpyre_stats_parallel";

/// Collects Python code statistics by parsing, never importing, sources.
///
/// Both execution modes produce identical records for the same tree.
pub struct AstCollector {
    options: CollectorOptions,
    filter: EligibilityFilter,
    execution: Execution,
    cache: MetricsCache,
}

impl AstCollector {
    /// Create a sequential collector.
    pub fn new(options: CollectorOptions) -> Self {
        Self::with_execution(options, Execution::Sequential)
    }

    /// Create a collector that analyzes files in parallel.
    pub fn parallel(options: CollectorOptions) -> Self {
        Self::with_execution(options, Execution::Parallel)
    }

    pub fn with_execution(options: CollectorOptions, execution: Execution) -> Self {
        let filter = EligibilityFilter::new(SOURCE_EXTENSION, options.exclude_dirs.iter().cloned());
        Self {
            options,
            filter,
            execution,
            cache: MetricsCache::new(),
        }
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    fn run(&self) -> Metrics {
        Aggregator::new(&self.options.root, &self.filter)
            .max_file_size(self.options.max_file_size)
            .execution(self.execution)
            .run()
    }
}

impl Collector for AstCollector {
    fn name(&self) -> &'static str {
        match self.execution {
            Execution::Sequential => SEQUENTIAL_COLLECTOR,
            Execution::Parallel => PARALLEL_COLLECTOR,
        }
    }

    fn options(&self) -> &CollectorOptions {
        &self.options
    }

    fn collect(&self) -> Metrics {
        let metrics = self.run();
        self.cache.store(metrics.clone());
        metrics
    }

    fn metrics(&self) -> Arc<Metrics> {
        self.cache.get_or_collect(|| self.run())
    }
}

/// Registry factory for [`SEQUENTIAL_COLLECTOR`].
pub fn sequential_factory(options: CollectorOptions) -> Box<dyn Collector> {
    Box::new(AstCollector::new(options))
}

/// Registry factory for [`PARALLEL_COLLECTOR`].
pub fn parallel_factory(options: CollectorOptions) -> Box<dyn Collector> {
    Box::new(AstCollector::parallel(options))
}
