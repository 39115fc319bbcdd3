//! Command-line interface for umpyre.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::collector;
use crate::config::{self, Config};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Python code statistics without executing code.
///
/// Counts functions, classes, blank, comment, docstring and in-function
/// lines across a source tree by parsing, never importing, each file.
#[derive(Parser)]
#[command(name = "umpyre")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect statistics for a directory
    Stats(StatsArgs),
    /// List registered collectors
    Collectors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the stats command.
#[derive(Parser)]
pub struct StatsArgs {
    /// Directory to analyze (default: current directory)
    pub path: Option<PathBuf>,

    /// Directory name to exclude; may be repeated
    #[arg(short, long = "exclude", value_name = "DIR")]
    pub exclude: Vec<String>,

    /// Collector to use (default: from config, else umpyre_stats)
    #[arg(long)]
    pub collector: Option<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Skip files larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,
}

/// Run the stats command.
pub fn run_stats(args: &StatsArgs) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir()?;

    let mut config = match Config::load(args.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Flags override file values
    if let Some(name) = &args.collector {
        config.collector = Some(name.clone());
    }
    if !args.exclude.is_empty() {
        config.exclude_dirs.extend(args.exclude.iter().cloned());
    }
    if let Some(limit) = args.max_file_size {
        config.max_file_size = Some(limit);
    }

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let root = args.path.clone().unwrap_or_else(|| cwd.clone());
    let options = config.to_options(&root);

    let collector = match collector::global().create(config.collector_name(), options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'umpyre collectors' to see available collectors");
            return Ok(EXIT_ERROR);
        }
    };

    let metrics = collector.collect();
    let path_str = root.to_string_lossy().to_string();

    match args.format {
        OutputFormat::Json => report::write_json(&path_str, collector.name(), &metrics)?,
        OutputFormat::Pretty => report::write_pretty(&path_str, collector.name(), &metrics)?,
    }

    if metrics.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the collectors command.
pub fn run_collectors() -> anyhow::Result<i32> {
    println!("Available collectors:");
    for name in collector::global().list_collectors() {
        let label = if name == collector::SEQUENTIAL_COLLECTOR {
            format!("{} (default)", name)
        } else {
            name
        };
        println!("  {}", label);
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stats_args() {
        let cli = Cli::try_parse_from([
            "umpyre", "stats", "src", "-e", "tests", "--exclude", "build", "--format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Stats(args) => {
                assert_eq!(args.path, Some(PathBuf::from("src")));
                assert_eq!(args.exclude, vec!["tests", "build"]);
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.collector.is_none());
            }
            Commands::Collectors => panic!("expected stats command"),
        }
    }

    #[test]
    fn test_unknown_collector_exits_with_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let args = StatsArgs {
            path: Some(temp.path().to_path_buf()),
            exclude: vec![],
            collector: Some("no_such_collector".to_string()),
            config: Some(temp.path().join("missing.yaml")),
            format: OutputFormat::Json,
            max_file_size: None,
        };
        // A missing explicit config file is itself an error.
        assert_eq!(run_stats(&args).unwrap(), EXIT_ERROR);

        std::fs::write(temp.path().join("cfg.yaml"), "exclude_dirs: []\n").unwrap();
        let args = StatsArgs {
            config: Some(temp.path().join("cfg.yaml")),
            ..args
        };
        assert_eq!(run_stats(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_stats_on_clean_tree_succeeds() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("cfg.yaml"), "").unwrap();
        std::fs::write(temp.path().join("a.py"), "def f():\n    return 1\n").unwrap();
        let args = StatsArgs {
            path: Some(temp.path().to_path_buf()),
            exclude: vec![],
            collector: None,
            config: Some(temp.path().join("cfg.yaml")),
            format: OutputFormat::Json,
            max_file_size: None,
        };
        assert_eq!(run_stats(&args).unwrap(), EXIT_SUCCESS);
    }
}
