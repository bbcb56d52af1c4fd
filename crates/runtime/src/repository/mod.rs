//! Battle-log persistence.
//!
//! Logs are stored append-only, one frame per sealed battle:
//!
//! ```text
//! [u32 length][encoded BattleLog]
//! [u32 length][encoded BattleLog]
//! ...
//! ```
//!
//! The body of a frame is the frozen binary log encoding, so archived battles
//! stay readable for as long as their log version is supported.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileBattleLogRepository;
pub use memory::InMemoryBattleLogRepository;
pub use traits::BattleLogRepository;

use battle_core::{BattleLog, decode_log, encode_log};

/// Length prefix of every frame.
pub(crate) const FRAME_HEADER: u64 = 4;

/// Encodes `log` as one length-prefixed frame.
pub(crate) fn encode_frame(log: &BattleLog) -> Result<Vec<u8>> {
    let body = encode_log(log)?;
    let len = u32::try_from(body.len()).map_err(|_| RepositoryError::FrameTooLarge(body.len()))?;

    let mut frame = Vec::with_capacity(FRAME_HEADER as usize + body.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decodes a frame body found at `offset`.
pub(crate) fn decode_body(body: &[u8], offset: u64) -> Result<BattleLog> {
    decode_log(body).map_err(|source| RepositoryError::Codec { offset, source })
}

#[cfg(test)]
pub(crate) fn sample_log(turns: u16) -> BattleLog {
    use std::collections::BTreeMap;

    use battle_core::{
        ActionKind, ActorIndex, BattleActionEntry, BattleEffect, BattleOutcome, EffectKind,
        LOG_VERSION, Participants,
    };

    let player = ActorIndex::player(1);
    let enemy = ActorIndex(1003);
    let mut attack = BattleActionEntry::declare(1, Some(player), ActionKind::PhysicalAttack);
    attack
        .effects
        .push(BattleEffect::on(EffectKind::PhysicalDamage, enemy).with_value(40));

    BattleLog {
        version: LOG_VERSION,
        initial_hp: BTreeMap::from([(player, 100), (enemy, 40)]),
        entries: vec![
            attack,
            BattleActionEntry::declare(turns, None, ActionKind::Victory),
        ],
        outcome: BattleOutcome::Victory,
        turns,
        participants: Participants::default(),
    }
}
