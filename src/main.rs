//! Umpyre CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use umpyre::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Stats(args) => cli::run_stats(args),
        Commands::Collectors => cli::run_collectors(),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
