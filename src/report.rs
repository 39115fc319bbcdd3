//! Output formatting for collected metrics.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::metrics::Metrics;

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub collector: String,
    pub metrics: Metrics,
}

impl JsonReport {
    pub fn new(path: &str, collector: &str, metrics: &Metrics) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            collector: collector.to_string(),
            metrics: metrics.clone(),
        }
    }
}

/// Write results in JSON format to stdout.
pub fn write_json(path: &str, collector: &str, metrics: &Metrics) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_json_to(&mut out, path, collector, metrics)
}

pub fn write_json_to<W: Write>(
    out: &mut W,
    path: &str,
    collector: &str,
    metrics: &Metrics,
) -> anyhow::Result<()> {
    let report = JsonReport::new(path, collector, metrics);
    let json = serde_json::to_string_pretty(&report)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Write results in pretty format to stdout.
pub fn write_pretty(path: &str, collector: &str, metrics: &Metrics) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_pretty_to(&mut out, path, collector, metrics)
}

pub fn write_pretty_to<W: Write>(
    out: &mut W,
    path: &str,
    collector: &str,
    metrics: &Metrics,
) -> anyhow::Result<()> {
    writeln!(out, "{} {}", "umpyre".bold(), path)?;
    writeln!(out, "collector: {}", collector.dimmed())?;
    writeln!(out)?;

    if let Some(error) = &metrics.error {
        writeln!(out, "{} {}", "error:".red().bold(), error)?;
        return Ok(());
    }

    let c = &metrics.counts;
    let rows: [(&str, String); 12] = [
        ("files analyzed", metrics.files_analyzed.to_string()),
        ("functions", c.num_functions.to_string()),
        ("classes", c.num_classes.to_string()),
        ("total lines", c.total_lines.to_string()),
        ("empty lines", c.empty_lines.to_string()),
        ("comment lines", c.comment_lines.to_string()),
        ("docs lines", c.docs_lines.to_string()),
        ("function lines", c.function_lines.to_string()),
        ("empty ratio", percent(metrics.empty_lines_ratio)),
        ("comment ratio", percent(metrics.comment_lines_ratio)),
        ("function ratio", percent(metrics.function_lines_ratio)),
        (
            "mean lines/function",
            format!("{:.1}", metrics.mean_lines_per_function),
        ),
    ];

    for (label, value) in &rows {
        writeln!(out, "  {:<22} {}", label, value.as_str().cyan())?;
    }

    if let (Some(errors), Some(total)) = (&metrics.errors, metrics.total_errors) {
        writeln!(out)?;
        writeln!(
            out,
            "{} {} file(s) could not be analyzed",
            "warning:".yellow().bold(),
            total
        )?;
        for error in errors {
            writeln!(out, "  {}", error)?;
        }
        let hidden = total.saturating_sub(errors.len() as u64);
        if hidden > 0 {
            writeln!(out, "  {}", format!("... and {} more", hidden).dimmed())?;
        }
    }

    Ok(())
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
