//! Backfill CLI binary.
//!
//! Reads proxy and target series from CSV, splices them and writes the results.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use commands::{ResampleArgs, SpliceArgs, TotalReturnArgs};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "backfill")]
#[command(about = "Extend a short price history with a rescaled proxy series", long_about = None)]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Splice a proxy series onto a target series
    Splice(SpliceArgs),

    /// Resample one series onto a period grid and derive its returns
    Resample(ResampleArgs),

    /// Build a total-return index from prices and cash dividends
    TotalReturn(TotalReturnArgs),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Splice(args) => commands::splice::run(&args),
        Commands::Resample(args) => commands::resample::run(&args),
        Commands::TotalReturn(args) => commands::total_return::run(&args),
    }
}
