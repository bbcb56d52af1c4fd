//! Async orchestration for deterministic battles.
//!
//! This crate wraps the pure [`battle_core::BattleEngine`] in a tokio task that
//! streams one [`battle_core::StepOutcome`] per resolved phase or action, and
//! persists sealed battle logs. Consumers embed [`BattleRuntime`] to start
//! battles and drive them through [`BattleHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and its configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`repository`] provides battle-log persistence reused by other crates
pub mod api;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{BattleHandle, Result, RuntimeError};
pub use repository::{
    BattleLogRepository, FileBattleLogRepository, InMemoryBattleLogRepository, RepositoryError,
};
pub use runtime::{BattleRuntime, BattleSetup, RuntimeConfig};
