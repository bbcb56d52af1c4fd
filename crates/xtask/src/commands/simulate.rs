//! Run a battle scenario through the async runtime
//!
//! Loads master data and a scenario, prepares every fighter, streams the
//! battle step by step and prints the sealed log.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use battle_content::ContentFactory;
use battle_core::{
    BattleEnv, BattleLog, MasterData, Participants, RandomMode, prepare_enemy, prepare_player,
};
use runtime::{BattleRuntime, BattleSetup, RuntimeConfig};

use crate::utils::{
    DEFAULT_DATA_DIR, OutputFormat, describe_entry, print_entries, print_json, print_summary,
};

/// Run a battle scenario
#[derive(Parser)]
pub struct Simulate {
    /// Scenario name, read from `<data-dir>/scenarios/<NAME>.ron`
    #[arg(value_name = "NAME")]
    scenario: String,

    /// Directory holding master data, scenarios and config.toml
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pin damage variance to its median
    #[arg(long)]
    median: bool,

    /// Append the sealed log to `<DIR>/battles.log`
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Print every step as it resolves
    #[arg(long)]
    stream: bool,

    /// Output format for the sealed log
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(&self.data_dir);
        let master = factory.load_master_data()?;
        let scenario = factory.load_scenario(&self.scenario)?;

        let mut config: RuntimeConfig = if factory.data_dir().join("config.toml").exists() {
            factory.load_config()?
        } else {
            RuntimeConfig::default()
        };
        if self.median {
            config.battle.random_mode = RandomMode::FixedMedian;
        }
        if self.log_dir.is_some() {
            config.log_dir = self.log_dir.clone();
        }

        let env = BattleEnv::with_all(&master);
        let mut players = Vec::with_capacity(scenario.party.len());
        for character in &scenario.party {
            let prepared = prepare_player(&env, character).with_context(|| {
                format!("Failed to prepare character {}", character.character_id)
            })?;
            for rejected in prepared.rejected() {
                println!("{} {}", style("skipped row").yellow(), rejected);
            }
            players.push(prepared.seed);
        }
        let mut enemies = Vec::with_capacity(scenario.enemies.len());
        for (slot, enemy) in scenario.enemies.iter().enumerate() {
            let slot = u16::try_from(slot).context("Enemy roster too large")?;
            let prepared = prepare_enemy(&env, slot, *enemy)
                .with_context(|| format!("Failed to prepare {} in slot {}", enemy, slot))?;
            enemies.push(prepared.seed);
        }

        let setup = BattleSetup {
            id: scenario.name.clone(),
            seed: self.seed.unwrap_or(scenario.seed),
            players,
            enemies,
        };
        println!("{} {}", style("Scenario:").bold().cyan(), scenario.name);
        println!("{} {}", style("Seed:").bold().cyan(), setup.seed);
        println!();

        let tokio_runtime = tokio::runtime::Runtime::new()?;
        let log = tokio_runtime.block_on(run_battle(config, master, setup, self.stream))?;

        let log = log.context("Battle was cancelled before it finished")?;
        match self.format {
            OutputFormat::Summary => print_summary(&log)?,
            OutputFormat::List => print_entries(&log),
            OutputFormat::Json => print_json(&log)?,
        }
        Ok(())
    }
}

async fn run_battle(
    config: RuntimeConfig,
    master: MasterData,
    setup: BattleSetup,
    stream: bool,
) -> runtime::Result<Option<BattleLog>> {
    let runtime = BattleRuntime::open(config, Arc::new(master))?;
    let mut handle = runtime.spawn(setup)?;

    // Steps carry no roster, so streamed lines name actors by index.
    let unnamed = Participants::default();
    while let Some(step) = handle.next_step().await {
        if stream {
            for entry in &step.entries {
                println!("{}", describe_entry(&unnamed, entry));
            }
        }
    }
    handle.finish().await
}
