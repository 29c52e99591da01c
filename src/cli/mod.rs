//! Command-line interface for config-provider
//!
//! Provides `load` and `format` subcommands for checking config files outside
//! of an application.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod format;
mod load;
mod utils;

/// Load JSON, YAML, TOML and PHP-literal config files into a key-value container
#[derive(Parser)]
#[command(name = "config-provider")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a config file into an empty container and print the result as JSON
    Load(load::LoadArgs),

    /// Show which format driver would load each file
    Format(format::FormatArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Load(args) => load::run(args),
        Commands::Format(args) => format::run(args),
    }
}

/// Logs go to stderr so `load` output stays valid JSON on stdout.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
