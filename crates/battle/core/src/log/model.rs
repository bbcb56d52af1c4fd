use std::collections::BTreeMap;

use bitflags::bitflags;
use sha2::{Digest, Sha256};
use strum::FromRepr;

use crate::types::{ActorIndex, StatusId};

use super::codec::encode_log;
use super::error::LogCodecError;
use super::kind::{ActionKind, EffectKind};

/// The single supported binary layout version.
pub const LOG_VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BattleOutcome {
    Victory = 0,
    Defeat = 1,
    Retreat = 2,
}

bitflags! {
    /// Qualifiers of a damage effect, carried in its `extra` field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DamageFlags: u32 {
        const CRITICAL = 1 << 0;
        const BLOCKED  = 1 << 1;
        const BARRIER  = 1 << 2;
        const MARTIAL  = 1 << 3;
    }
}

/// One atomic observable result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleEffect {
    pub kind: EffectKind,
    pub target: Option<ActorIndex>,
    pub value: Option<u32>,
    pub status_id: Option<StatusId>,
    pub extra: Option<u32>,
}

impl BattleEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            target: None,
            value: None,
            status_id: None,
            extra: None,
        }
    }

    pub fn marker() -> Self {
        Self::new(EffectKind::Marker)
    }

    pub fn on(kind: EffectKind, target: ActorIndex) -> Self {
        Self::new(kind).with_target(target)
    }

    pub fn with_target(mut self, target: ActorIndex) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_status(mut self, status: StatusId) -> Self {
        self.status_id = Some(status);
        self
    }

    pub fn with_extra(mut self, extra: u32) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Damage qualifiers; empty for non-damage effects.
    pub fn damage_flags(&self) -> DamageFlags {
        if self.kind.is_damage() {
            DamageFlags::from_bits_truncate(self.extra.unwrap_or(0))
        } else {
            DamageFlags::empty()
        }
    }
}

/// One actor's declared action plus its ordered effects.
///
/// A multi-target action is one entry with one effect per target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleActionEntry {
    pub turn: u16,
    pub actor: Option<ActorIndex>,
    pub kind: ActionKind,
    pub skill_index: Option<u16>,
    pub extra: Option<u32>,
    pub effects: Vec<BattleEffect>,
}

impl BattleActionEntry {
    pub fn declare(turn: u16, actor: Option<ActorIndex>, kind: ActionKind) -> Self {
        Self {
            turn,
            actor,
            kind,
            skill_index: None,
            extra: None,
            effects: Vec::new(),
        }
    }

    pub fn with_skill_index(mut self, skill_index: u16) -> Self {
        self.skill_index = Some(skill_index);
        self
    }

    pub fn with_extra(mut self, extra: u32) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// Roster entry persisted with the log so a renderer can resolve names.
///
/// `label` disambiguates enemies sharing a master id (`"A"`, `"B"`, ...); it is
/// empty for unique participants. It is never display text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub actor: ActorIndex,
    pub master_id: u16,
    pub level: u16,
    pub max_hp: u32,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participants {
    /// Party order.
    pub players: Vec<Participant>,
    /// Master index ascending, then appearance order.
    pub enemies: Vec<Participant>,
}

/// The sealed, append-only record of one battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleLog {
    pub version: u8,
    pub initial_hp: BTreeMap<ActorIndex, u32>,
    pub entries: Vec<BattleActionEntry>,
    pub outcome: BattleOutcome,
    pub turns: u16,
    pub participants: Participants,
}

impl BattleLog {
    /// SHA-256 of the encoded log.
    pub fn digest(&self) -> Result<[u8; 32], LogCodecError> {
        let bytes = encode_log(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hasher.finalize().into())
    }

    /// Entries declared in `turn`.
    pub fn entries_in_turn(&self, turn: u16) -> impl Iterator<Item = &BattleActionEntry> {
        self.entries.iter().filter(move |entry| entry.turn == turn)
    }
}

/// Enemy labels: unique master ids get none, repeated ones get `A`, `B`, ...
/// in appearance order. `master_ids` must already be in participant order.
pub fn disambiguation_labels(master_ids: &[u16]) -> Vec<String> {
    let mut seen: BTreeMap<u16, usize> = BTreeMap::new();
    let mut totals: BTreeMap<u16, usize> = BTreeMap::new();
    for id in master_ids {
        *totals.entry(*id).or_default() += 1;
    }
    master_ids
        .iter()
        .map(|id| {
            if totals.get(id).copied().unwrap_or(0) < 2 {
                return String::new();
            }
            let index = seen.entry(*id).or_default();
            let label = suffix(*index);
            *index += 1;
            label
        })
        .collect()
}

/// `0 → "A"`, `25 → "Z"`, `26 → "AA"`.
fn suffix(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
