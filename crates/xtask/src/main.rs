//! Development tasks for the battle workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{ReadLog, Simulate, ValidateData};
use tracing_subscriber::EnvFilter;

/// Development tasks for the battle workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for battle content and logs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Decode every skill row and check cross references in master data
    ValidateData(ValidateData),

    /// Run a scenario and stream its steps
    Simulate(Simulate),

    /// Read and inspect a battle log file
    ReadLog(ReadLog),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::ValidateData(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
        Command::ReadLog(cmd) => cmd.execute(),
    }
}
