//! Metric records produced by analysis.
//!
//! Two record shapes exist:
//! - [`FileMetrics`]: transient result for one analyzed file
//! - [`Metrics`]: the aggregate result of one collection run, with derived ratios

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Maximum number of per-file error descriptions kept in an aggregate record.
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Keys that are always present in an aggregate record, in output order.
pub const METRIC_KEYS: &[&str] = &[
    "num_functions",
    "num_classes",
    "total_lines",
    "empty_lines",
    "comment_lines",
    "docs_lines",
    "function_lines",
    "empty_lines_ratio",
    "comment_lines_ratio",
    "function_lines_ratio",
    "mean_lines_per_function",
    "files_analyzed",
];

/// Additive counters shared by per-file and aggregate records.
///
/// Addition is associative and commutative, so totals reduced in any
/// grouping are identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub num_functions: u64,
    pub num_classes: u64,
    pub total_lines: u64,
    pub empty_lines: u64,
    pub comment_lines: u64,
    pub docs_lines: u64,
    pub function_lines: u64,
}

impl Counts {
    /// Returns the value of a counter by its output key.
    pub fn field(&self, key: &str) -> Option<u64> {
        match key {
            "num_functions" => Some(self.num_functions),
            "num_classes" => Some(self.num_classes),
            "total_lines" => Some(self.total_lines),
            "empty_lines" => Some(self.empty_lines),
            "comment_lines" => Some(self.comment_lines),
            "docs_lines" => Some(self.docs_lines),
            "function_lines" => Some(self.function_lines),
            _ => None,
        }
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(mut self, other: Counts) -> Counts {
        self += other;
        self
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        self.num_functions += other.num_functions;
        self.num_classes += other.num_classes;
        self.total_lines += other.total_lines;
        self.empty_lines += other.empty_lines;
        self.comment_lines += other.comment_lines;
        self.docs_lines += other.docs_lines;
        self.function_lines += other.function_lines;
    }
}

/// Metrics for a single file.
///
/// A failed file carries zeroed counts and an error description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetrics {
    pub counts: Counts,
    pub error: Option<String>,
}

impl FileMetrics {
    pub fn ok(counts: Counts) -> Self {
        Self {
            counts,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            counts: Counts::default(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A typed value read from an aggregate record by key.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Count(u64),
    Ratio(f64),
    Text(String),
    List(Vec<String>),
}

impl MetricValue {
    pub fn as_count(&self) -> Option<u64> {
        match self {
            MetricValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_ratio(&self) -> Option<f64> {
        match self {
            MetricValue::Ratio(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Ratio(r) => write!(f, "{:.4}", r),
            MetricValue::Text(s) => write!(f, "{}", s),
            MetricValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Aggregate metrics for one collection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(flatten)]
    pub counts: Counts,
    pub empty_lines_ratio: f64,
    pub comment_lines_ratio: f64,
    pub function_lines_ratio: f64,
    pub mean_lines_per_function: f64,
    pub files_analyzed: u64,
    /// First few per-file errors, in discovery order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Total number of per-file errors, including those not listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_errors: Option<u64>,
    /// Set only when the whole run failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Metrics {
    /// Build an aggregate record from summed counts.
    ///
    /// Ratios with a zero denominator are 0.0. Only the first
    /// [`MAX_REPORTED_ERRORS`] errors are kept.
    pub fn from_totals(counts: Counts, files_analyzed: u64, mut errors: Vec<String>) -> Self {
        let (errors, total_errors) = if errors.is_empty() {
            (None, None)
        } else {
            let total = errors.len() as u64;
            errors.truncate(MAX_REPORTED_ERRORS);
            (Some(errors), Some(total))
        };

        Self {
            empty_lines_ratio: ratio(counts.empty_lines, counts.total_lines),
            comment_lines_ratio: ratio(counts.comment_lines, counts.total_lines),
            function_lines_ratio: ratio(counts.function_lines, counts.total_lines),
            mean_lines_per_function: ratio(counts.function_lines, counts.num_functions),
            counts,
            files_analyzed,
            errors,
            total_errors,
            error: None,
        }
    }

    /// An all-zero record describing a run that could not proceed at all.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Whether any per-file or top-level error was captured.
    pub fn has_errors(&self) -> bool {
        self.error.is_some() || self.total_errors.is_some()
    }

    /// Look up a field by its output key.
    pub fn get(&self, key: &str) -> Option<MetricValue> {
        if let Some(n) = self.counts.field(key) {
            return Some(MetricValue::Count(n));
        }
        match key {
            "empty_lines_ratio" => Some(MetricValue::Ratio(self.empty_lines_ratio)),
            "comment_lines_ratio" => Some(MetricValue::Ratio(self.comment_lines_ratio)),
            "function_lines_ratio" => Some(MetricValue::Ratio(self.function_lines_ratio)),
            "mean_lines_per_function" => Some(MetricValue::Ratio(self.mean_lines_per_function)),
            "files_analyzed" => Some(MetricValue::Count(self.files_analyzed)),
            "errors" => self.errors.clone().map(MetricValue::List),
            "total_errors" => self.total_errors.map(MetricValue::Count),
            "error" => self.error.clone().map(MetricValue::Text),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys present in this record, in output order.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = METRIC_KEYS.to_vec();
        if self.errors.is_some() {
            keys.push("errors");
        }
        if self.total_errors.is_some() {
            keys.push("total_errors");
        }
        if self.error.is_some() {
            keys.push("error");
        }
        keys
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
