//! Read and inspect battle log files
//!
//! Decodes every frame of a battle log file and displays its contents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use runtime::{BattleLogRepository, FileBattleLogRepository};

use crate::utils::{OutputFormat, print_entries, print_json, print_summary};

/// Read and inspect a battle log file
#[derive(Parser)]
pub struct ReadLog {
    /// Path to the log file (e.g., logs/battles.log)
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Only show the battle at this position in the file
    #[arg(short, long, value_name = "INDEX")]
    index: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl ReadLog {
    pub fn execute(self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("Not a log file path: {}", self.path.display()))?;

        let repository = FileBattleLogRepository::open(&dir, filename)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let logs = repository.read_all()?;

        if let Some(index) = self.index.filter(|index| *index >= logs.len()) {
            anyhow::bail!("Battle {} not found ({} stored)", index, logs.len());
        }

        println!("{} {}", style("Log File:").bold().cyan(), self.path.display());
        println!("{} {}", style("Battles:").bold().cyan(), logs.len());
        println!();

        for (position, log) in logs.iter().enumerate() {
            if self.index.is_some_and(|index| index != position) {
                continue;
            }
            println!("{}", style(format!("── Battle {} ──", position)).bold());
            match self.format {
                OutputFormat::Summary => print_summary(log)?,
                OutputFormat::List => print_entries(log),
                OutputFormat::Json => print_json(log)?,
            }
            println!();
        }

        Ok(())
    }
}
