//! # agency CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agency_cli::audit::{run_audit, AuditArgs};
use agency_cli::export::{run_export, ExportArgs};
use agency_cli::rollups::{run_rollups, RollupArgs};

/// Agency ERP operator CLI.
///
/// Maintenance tasks against the persisted document database: agent rollup
/// recomputation, uniqueness audits and collection export.
#[derive(Parser, Debug)]
#[command(name = "agency", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file (overrides AGENCY_CONFIG).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recompute the package rollup of every agent (or one agent).
    RecomputeRollups(RollupArgs),

    /// Report live documents that share a value in a unique field.
    AuditUnique(AuditArgs),

    /// Export one collection as a JSON array.
    Export(ExportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(async {
        let config = agency_cli::load_config(cli.config.as_deref())?;
        match cli.command {
            Commands::RecomputeRollups(args) => run_rollups(&args, config).await,
            Commands::AuditUnique(args) => run_audit(&args, config).await,
            Commands::Export(args) => run_export(&args, config).await,
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
