//! Validate master data offline
//!
//! Runs every skill row through the effect decoder and checks that every id a
//! definition mentions is defined.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use battle_content::{ContentFactory, validate_master_data};

use crate::utils::DEFAULT_DATA_DIR;

/// Validate master data files
#[derive(Parser)]
pub struct ValidateData {
    /// Directory holding the master-data catalogs
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
}

impl ValidateData {
    pub fn execute(self) -> Result<()> {
        let master = ContentFactory::new(&self.data_dir).load_master_data()?;
        let report = validate_master_data(&master);

        println!(
            "{} {}",
            style("Data Directory:").bold().cyan(),
            self.data_dir.display()
        );
        println!(
            "{} {} skills, {} rows, {} decoded",
            style("Decoder:").bold().cyan(),
            report.decoder.skills,
            report.decoder.rows,
            report.decoder.decoded()
        );
        println!(
            "{} {} spells, {} statuses, {} special attacks, {} races, {} jobs, {} items, {} enemies",
            style("Catalogs:").bold().cyan(),
            master.spells.len(),
            master.statuses.len(),
            master.special_attacks.len(),
            master.races.len(),
            master.jobs.len(),
            master.items.len(),
            master.enemies.len()
        );
        println!();

        for failure in &report.decoder.failures {
            println!("{} {}", style("decode").red().bold(), failure);
        }
        for dangling in &report.dangling {
            println!("{} {}", style("reference").red().bold(), dangling);
        }

        if !report.is_clean() {
            anyhow::bail!(
                "{} decoder failures, {} dangling references",
                report.decoder.failures.len(),
                report.dangling.len()
            );
        }
        println!("{}", style("Master data is clean").green().bold());
        Ok(())
    }
}
