//! In-memory repository implementations for tests and local runs.

mod log;

pub use log::InMemoryBattleLogRepository;
