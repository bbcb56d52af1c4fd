//! Battle worker that owns one [`battle_core::BattleEngine`].
//!
//! Steps the engine, forwards every [`StepOutcome`] to the handle, seals the
//! log on completion and hands it to the configured repository.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use battle_core::{BattleEngine, BattleLog, StepOutcome};

use crate::api::{Result, RuntimeError};
use crate::repository::{BattleLogRepository, RepositoryError};

/// Repository shared by every battle of one runtime.
pub(crate) type SharedRepository = Arc<Mutex<Box<dyn BattleLogRepository>>>;

pub(crate) struct BattleWorker {
    id: String,
    engine: BattleEngine,
    steps: mpsc::Sender<StepOutcome>,
    cancel: watch::Receiver<bool>,
    repository: Option<SharedRepository>,
}

impl BattleWorker {
    pub(crate) fn new(
        id: String,
        engine: BattleEngine,
        steps: mpsc::Sender<StepOutcome>,
        cancel: watch::Receiver<bool>,
        repository: Option<SharedRepository>,
    ) -> Self {
        Self {
            id,
            engine,
            steps,
            cancel,
            repository,
        }
    }

    /// Main worker loop.
    ///
    /// Cancellation is honoured between steps. Once the step receiver is gone
    /// the battle still runs to its outcome so the log can be sealed.
    pub(crate) async fn run(mut self) -> Result<Option<BattleLog>> {
        let mut listening = true;
        loop {
            if self.cancelled() {
                info!(
                    target: "runtime::battle",
                    battle = %self.id,
                    turn = self.engine.turn(),
                    "battle cancelled"
                );
                return Ok(None);
            }

            let outcome = self.engine.step().map_err(RuntimeError::Engine)?;
            debug!(
                target: "runtime::battle",
                battle = %self.id,
                turn = outcome.turn,
                kind = ?outcome.kind,
                entries = outcome.entries.len(),
                "step resolved"
            );
            let finished = outcome.is_final();

            if listening {
                tokio::select! {
                    biased;
                    _ = self.cancel.changed() => {}
                    sent = self.steps.send(outcome) => {
                        if sent.is_err() {
                            debug!(target: "runtime::battle", battle = %self.id, "step receiver closed");
                            listening = false;
                        }
                    }
                }
            }

            if finished {
                break;
            }
            tokio::task::yield_now().await;
        }

        let (log, violations) = self.engine.finish().map_err(RuntimeError::Engine)?;
        for violation in &violations {
            warn!(
                target: "runtime::battle",
                battle = %self.id,
                %violation,
                "battle log invariant violated"
            );
        }
        info!(
            target: "runtime::battle",
            battle = %self.id,
            outcome = ?log.outcome,
            turns = log.turns,
            entries = log.entries.len(),
            "battle finished"
        );

        if let Some(repository) = &self.repository {
            let offset = repository
                .lock()
                .map_err(|_| RepositoryError::LockPoisoned)?
                .append(&log)?;
            debug!(target: "runtime::battle", battle = %self.id, offset, "battle log stored");
        }

        Ok(Some(log))
    }

    /// Cancel was requested, or the handle holding the cancel switch is gone.
    fn cancelled(&self) -> bool {
        *self.cancel.borrow() || self.cancel.has_changed().is_err()
    }
}
