//! Name-keyed registry of collector factories.
//!
//! Registration overwrites: the last factory registered under a name wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use super::ast::{parallel_factory, sequential_factory, PARALLEL_COLLECTOR, SEQUENTIAL_COLLECTOR};
use super::{Collector, CollectorOptions};

/// Factory function type for creating collector instances.
pub type CollectorFactory = fn(CollectorOptions) -> Box<dyn Collector>;

/// Errors returned by registry lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("collector not found: {name}")]
    NotFound { name: String },
}

/// Maps collector names to factories.
#[derive(Default)]
pub struct CollectorRegistry {
    factories: RwLock<HashMap<String, CollectorFactory>>,
}

impl CollectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in collectors.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(SEQUENTIAL_COLLECTOR, sequential_factory);
        registry.register(PARALLEL_COLLECTOR, parallel_factory);
        registry
    }

    /// Register a factory under `name`, replacing any previous entry.
    ///
    /// Returns true if an existing entry was replaced.
    pub fn register(&self, name: &str, factory: CollectorFactory) -> bool {
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let replaced = factories.insert(name.to_string(), factory).is_some();
        if replaced {
            tracing::debug!("Collector {:?} re-registered, previous entry replaced", name);
        }
        replaced
    }

    /// Look up the factory registered under `name`.
    pub fn get(&self, name: &str) -> Result<CollectorFactory, RegistryError> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        factories
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Build a collector by name.
    pub fn create(
        &self,
        name: &str,
        options: CollectorOptions,
    ) -> Result<Box<dyn Collector>, RegistryError> {
        let factory = self.get(name)?;
        Ok(factory(options))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// All registered names, sorted.
    pub fn list_collectors(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }
}

lazy_static::lazy_static! {
    /// Process-wide registry used by the command-line entry point.
    static ref GLOBAL: CollectorRegistry = CollectorRegistry::with_defaults();
}

/// The shared registry, preloaded with the built-in collectors.
pub fn global() -> &'static CollectorRegistry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use std::sync::Arc;

    struct MockCollector {
        options: CollectorOptions,
        label: &'static str,
    }

    impl Collector for MockCollector {
        fn name(&self) -> &'static str {
            self.label
        }

        fn options(&self) -> &CollectorOptions {
            &self.options
        }

        fn collect(&self) -> Metrics {
            Metrics::failure(self.label)
        }

        fn metrics(&self) -> Arc<Metrics> {
            Arc::new(self.collect())
        }
    }

    fn mock_first(options: CollectorOptions) -> Box<dyn Collector> {
        Box::new(MockCollector {
            options,
            label: "first",
        })
    }

    fn mock_second(options: CollectorOptions) -> Box<dyn Collector> {
        Box::new(MockCollector {
            options,
            label: "second",
        })
    }

    #[test]
    fn test_register_and_get() {
        let registry = CollectorRegistry::new();
        assert!(!registry.register("x", mock_first));

        let collector = registry.create("x", CollectorOptions::new(".")).unwrap();
        assert_eq!(collector.name(), "first");
        assert!(registry.list_collectors().contains(&"x".to_string()));
        assert!(registry.contains("x"));
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let registry = CollectorRegistry::new();
        let err = registry.get("missing").unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotFound {
                name: "missing".to_string()
            }
        );
        assert_eq!(err.to_string(), "collector not found: missing");
    }

    #[test]
    fn test_duplicate_registration_overwrites() {
        let registry = CollectorRegistry::new();
        registry.register("dup", mock_first);
        assert!(registry.register("dup", mock_second));

        let collector = registry.create("dup", CollectorOptions::new(".")).unwrap();
        assert_eq!(collector.name(), "second");
        assert_eq!(registry.list_collectors(), vec!["dup".to_string()]);
    }

    #[test]
    fn test_defaults() {
        let registry = CollectorRegistry::with_defaults();
        assert_eq!(
            registry.list_collectors(),
            vec![
                SEQUENTIAL_COLLECTOR.to_string(),
                PARALLEL_COLLECTOR.to_string()
            ]
        );
        let collector = registry
            .create(PARALLEL_COLLECTOR, CollectorOptions::new("."))
            .unwrap();
        assert_eq!(collector.name(), PARALLEL_COLLECTOR);
    }

    #[test]
    fn test_isolated_registries_do_not_share_state() {
        let a = CollectorRegistry::new();
        let b = CollectorRegistry::new();
        a.register("only_a", mock_first);
        assert!(!b.contains("only_a"));
    }

    #[test]
    fn test_global_has_builtins() {
        assert!(global().contains(SEQUENTIAL_COLLECTOR));
        assert!(global().contains(PARALLEL_COLLECTOR));
    }
}
