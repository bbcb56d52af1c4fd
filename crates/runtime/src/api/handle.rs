//! Client-facing handle of one running battle.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use battle_core::{BattleLog, StepOutcome};

use crate::api::{Result, RuntimeError};

/// Handle returned by [`crate::BattleRuntime::spawn`].
///
/// Steps arrive in resolution order over a bounded channel, so a slow reader
/// holds the battle back instead of buffering it. Dropping the handle cancels
/// the battle.
pub struct BattleHandle {
    id: String,
    steps: mpsc::Receiver<StepOutcome>,
    cancel: watch::Sender<bool>,
    worker: JoinHandle<Result<Option<BattleLog>>>,
}

impl BattleHandle {
    pub(crate) fn new(
        id: String,
        steps: mpsc::Receiver<StepOutcome>,
        cancel: watch::Sender<bool>,
        worker: JoinHandle<Result<Option<BattleLog>>>,
    ) -> Self {
        Self {
            id,
            steps,
            cancel,
            worker,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Next resolved step, or `None` once the battle stopped producing.
    pub async fn next_step(&mut self) -> Option<StepOutcome> {
        self.steps.recv().await
    }

    /// Asks the battle to stop at its next step boundary.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Waits for the battle to end.
    ///
    /// Steps not yet read are discarded. Returns the sealed log when the
    /// battle reached an outcome, `None` when it was cancelled first.
    pub async fn finish(self) -> Result<Option<BattleLog>> {
        let Self {
            steps,
            cancel,
            worker,
            ..
        } = self;
        drop(steps);
        let result = worker.await.map_err(RuntimeError::WorkerJoin)?;
        drop(cancel);
        result
    }
}
