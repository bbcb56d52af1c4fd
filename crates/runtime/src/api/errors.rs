//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the battle engine, the worker task and repositories so
//! clients can bubble them up with consistent context.
use thiserror::Error;

use battle_core::BattleError;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("battle setup failed")]
    Setup(#[source] BattleError),

    #[error("battle engine failed mid-battle")]
    Engine(#[source] BattleError),

    #[error("battle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
