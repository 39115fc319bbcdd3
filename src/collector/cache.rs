//! Per-instance cache of the most recent aggregate record.

use std::sync::{Arc, PoisonError, RwLock};

use crate::metrics::Metrics;

/// Holds the last record a collector produced.
#[derive(Debug, Default)]
pub struct MetricsCache {
    slot: RwLock<Option<Arc<Metrics>>>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached record.
    pub fn store(&self, metrics: Metrics) -> Arc<Metrics> {
        let metrics = Arc::new(metrics);
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&metrics));
        metrics
    }

    /// The cached record, if any.
    pub fn get(&self) -> Option<Arc<Metrics>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return the cached record, computing and storing it on first use.
    pub fn get_or_collect<F>(&self, collect: F) -> Arc<Metrics>
    where
        F: FnOnce() -> Metrics,
    {
        if let Some(metrics) = self.get() {
            return metrics;
        }
        self.store(collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_computes_once() {
        let cache = MetricsCache::new();
        let calls = Cell::new(0);

        let first = cache.get_or_collect(|| {
            calls.set(calls.get() + 1);
            Metrics::failure("first")
        });
        let second = cache.get_or_collect(|| {
            calls.set(calls.get() + 1);
            Metrics::failure("second")
        });

        assert_eq!(calls.get(), 1);
        assert_eq!(first.error.as_deref(), Some("first"));
        assert_eq!(second.error.as_deref(), Some("first"));
    }

    #[test]
    fn test_store_replaces() {
        let cache = MetricsCache::new();
        assert!(cache.get().is_none());
        cache.store(Metrics::failure("old"));
        cache.store(Metrics::failure("new"));
        assert_eq!(cache.get().unwrap().error.as_deref(), Some("new"));
    }
}
