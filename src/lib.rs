//! Umpyre - execution-free Python code statistics.
//!
//! Umpyre walks a source tree and measures it: counts of functions and
//! classes, blank, comment, docstring and in-function lines, and ratios
//! derived from them. Files are parsed with tree-sitter and never imported
//! or evaluated, so untrusted code is safe to measure.
//!
//! # Architecture
//!
//! - `analysis`: single-file parsing and line classification
//! - `collector`: eligibility filter, tree aggregation and the collector registry
//! - `metrics`: per-file and aggregate metric records
//! - `config`: YAML configuration schema
//! - `report`: output formatting (pretty, JSON)
//! - `storage`: byte encoding of records for persistence
//!
//! # Adding a Collector
//!
//! Implement the `Collector` trait and register a factory with
//! `CollectorRegistry::register`. See `collector/ast.rs` for the built-in
//! implementation.

pub mod analysis;
pub mod cli;
pub mod collector;
pub mod config;
pub mod metrics;
pub mod report;
pub mod storage;

pub use analysis::{AnalyzeError, PythonAnalyzer};
pub use collector::{
    AstCollector, Collector, CollectorFactory, CollectorOptions, CollectorRegistry, RegistryError,
};
pub use config::Config;
pub use metrics::{Counts, FileMetrics, MetricValue, Metrics};
pub use storage::{deserialize_metrics, serialize_metrics, StoredMetrics};
