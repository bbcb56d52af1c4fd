//! Background tasks owned by the runtime.
mod battle;

pub(crate) use battle::{BattleWorker, SharedRepository};
