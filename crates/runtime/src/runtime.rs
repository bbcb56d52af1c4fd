//! Runtime orchestrator: configuration, master data and battle spawning.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use battle_core::{BattleActorSeed, BattleConfig, BattleEngine, BattleEnv, MasterData};

use crate::api::{BattleHandle, Result, RuntimeError};
use crate::repository::{BattleLogRepository, FileBattleLogRepository};
use crate::workers::{BattleWorker, SharedRepository};

/// Runtime configuration, usually read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Capacity of each battle's step channel.
    pub step_buffer: usize,
    /// Directory receiving `battles.log`. No persistence when unset.
    pub log_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    pub const DEFAULT_STEP_BUFFER: usize = 16;
    pub const LOG_FILE: &'static str = "battles.log";
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            step_buffer: Self::DEFAULT_STEP_BUFFER,
            log_dir: None,
        }
    }
}

/// Everything one battle needs besides master data.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    /// Label used in traces.
    pub id: String,
    pub seed: u64,
    /// Party order.
    pub players: Vec<BattleActorSeed>,
    /// Roster order.
    pub enemies: Vec<BattleActorSeed>,
}

/// Starts battles against one shared set of master data.
pub struct BattleRuntime {
    config: RuntimeConfig,
    master: Arc<MasterData>,
    repository: Option<SharedRepository>,
}

impl BattleRuntime {
    /// Runtime without persistence.
    pub fn new(config: RuntimeConfig, master: Arc<MasterData>) -> Self {
        Self {
            config,
            master,
            repository: None,
        }
    }

    /// Runtime appending sealed logs to `log_dir/battles.log` when
    /// `config.log_dir` is set.
    pub fn open(config: RuntimeConfig, master: Arc<MasterData>) -> Result<Self> {
        let repository = match &config.log_dir {
            Some(dir) => {
                let file = FileBattleLogRepository::open_or_create(dir, RuntimeConfig::LOG_FILE)?;
                Some(share(file))
            }
            None => None,
        };
        Ok(Self {
            config,
            master,
            repository,
        })
    }

    pub fn with_repository(mut self, repository: impl BattleLogRepository + 'static) -> Self {
        self.repository = Some(share(repository));
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn master(&self) -> &MasterData {
        &self.master
    }

    /// Sets the battle up and starts it on the current tokio runtime.
    ///
    /// Setup problems are reported here, before any task is spawned.
    pub fn spawn(&self, setup: BattleSetup) -> Result<BattleHandle> {
        let BattleSetup {
            id,
            seed,
            players,
            enemies,
        } = setup;
        let (player_count, enemy_count) = (players.len(), enemies.len());

        let env = BattleEnv::with_all(self.master.as_ref());
        let engine = BattleEngine::new(&env, self.config.battle.clone(), seed, players, enemies)
            .map_err(|e| {
                error!(target: "runtime::battle", battle = %id, error = %e, "battle setup failed");
                RuntimeError::Setup(e)
            })?;

        let (step_tx, step_rx) = mpsc::channel(self.config.step_buffer.max(1));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let worker = BattleWorker::new(
            id.clone(),
            engine,
            step_tx,
            cancel_rx,
            self.repository.clone(),
        );

        info!(
            target: "runtime::battle",
            battle = %id,
            seed,
            players = player_count,
            enemies = enemy_count,
            "battle started"
        );
        let task = tokio::spawn(worker.run());

        Ok(BattleHandle::new(id, step_rx, cancel_tx, task))
    }
}

fn share(repository: impl BattleLogRepository + 'static) -> SharedRepository {
    Arc::new(Mutex::new(Box::new(repository)))
}

