//! The append-only battle record and its persisted form.
//!
//! - `kind`: declaration and effect vocabularies plus the legality table
//! - `model`: the sealed [`BattleLog`] and its parts
//! - `builder`: the writer the engine appends through
//! - `codec`: the frozen little-endian binary layout
//! - `replay`: HP reconstruction from a decoded log

mod builder;
mod codec;
mod error;
mod kind;
mod model;
mod replay;

pub use builder::LogBuilder;
pub use codec::{decode_log, encode_log};
pub use error::{LogCodecError, LogInvariantViolation};
pub use kind::{ActionKind, EffectKind};
pub use model::{
    BattleActionEntry, BattleEffect, BattleLog, BattleOutcome, DamageFlags, LOG_VERSION,
    Participant, Participants, disambiguation_labels,
};
pub use replay::{HpChange, HpTimeline, reconstruct_hp};
