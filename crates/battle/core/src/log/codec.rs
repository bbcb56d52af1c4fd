//! Binary encode/decode for persisted battle logs.
//!
//! All integers are little-endian. Strings are prefixed with a `u8` byte
//! length, zero meaning empty. Optional fields are announced by a presence
//! byte in front of the record that carries them.
//!
//! ```text
//! header        version u8 · outcome u8 · turns u16
//! initial_hp    count u16 · (actor u16 · hp u32)*          actor ascending
//! entries       count u32 · entry*
//!   entry       turn u16 · present u8 · [actor u16] · kind u8
//!               · [skill_index u16] · [extra u32] · count u16 · effect*
//!   effect      kind u8 · present u8 · [target u16] · [value u32]
//!               · [status u8] · [extra u32]
//! participants  players u8 · participant* · enemies u8 · participant*
//!   participant actor u16 · master_id u16 · level u16 · max_hp u32 · label
//! ```
//!
//! The layout is frozen. [`LOG_VERSION`] changes only with the layout.

use std::collections::BTreeMap;

use crate::types::{ActorIndex, StatusId};

use super::error::LogCodecError;
use super::kind::{ActionKind, EffectKind};
use super::model::{
    BattleActionEntry, BattleEffect, BattleLog, BattleOutcome, LOG_VERSION, Participant,
    Participants,
};

const ENTRY_ACTOR: u8 = 1 << 0;
const ENTRY_SKILL: u8 = 1 << 1;
const ENTRY_EXTRA: u8 = 1 << 2;
const ENTRY_MASK: u8 = ENTRY_ACTOR | ENTRY_SKILL | ENTRY_EXTRA;

const EFFECT_TARGET: u8 = 1 << 0;
const EFFECT_VALUE: u8 = 1 << 1;
const EFFECT_STATUS: u8 = 1 << 2;
const EFFECT_EXTRA: u8 = 1 << 3;
const EFFECT_MASK: u8 = EFFECT_TARGET | EFFECT_VALUE | EFFECT_STATUS | EFFECT_EXTRA;

// ── Primitive writers ───────────────────────────────────────────

fn write_u8(w: &mut Vec<u8>, v: u8) {
    w.push(v);
}

fn write_u16_le(w: &mut Vec<u8>, v: u16) {
    w.extend_from_slice(&v.to_le_bytes());
}

fn write_u32_le(w: &mut Vec<u8>, v: u32) {
    w.extend_from_slice(&v.to_le_bytes());
}

fn write_label(w: &mut Vec<u8>, s: &str) -> Result<(), LogCodecError> {
    let len = checked_len::<u8>("participant label", s.len())?;
    write_u8(w, len);
    w.extend_from_slice(s.as_bytes());
    Ok(())
}

fn checked_len<T>(field: &'static str, len: usize) -> Result<T, LogCodecError>
where
    T: TryFrom<usize> + Bounded,
{
    T::try_from(len).map_err(|_| LogCodecError::FieldTooLong {
        field,
        len,
        max: T::MAX_USIZE,
    })
}

trait Bounded {
    const MAX_USIZE: usize;
}

impl Bounded for u8 {
    const MAX_USIZE: usize = u8::MAX as usize;
}

impl Bounded for u16 {
    const MAX_USIZE: usize = u16::MAX as usize;
}

impl Bounded for u32 {
    const MAX_USIZE: usize = u32::MAX as usize;
}

// ── Primitive readers ───────────────────────────────────────────

/// Cursor over the encoded bytes; running out of input is malformed data.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], LogCodecError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                LogCodecError::malformed(format!(
                    "truncated {what} at offset {} ({} of {len} bytes left)",
                    self.pos,
                    self.bytes.len() - self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self, what: &str) -> Result<u8, LogCodecError> {
        Ok(self.take(1, what)?[0])
    }

    fn read_u16_le(&mut self, what: &str) -> Result<u16, LogCodecError> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2, what)?);
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32_le(&mut self, what: &str) -> Result<u32, LogCodecError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4, what)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_label(&mut self) -> Result<String, LogCodecError> {
        let len = usize::from(self.read_u8("label length")?);
        let bytes = self.take(len, "label")?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| LogCodecError::malformed(format!("invalid UTF-8 label: {e}")))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

// ── Log encode/decode ───────────────────────────────────────────

/// Encodes a sealed log into its persisted form.
pub fn encode_log(log: &BattleLog) -> Result<Vec<u8>, LogCodecError> {
    let mut w = Vec::with_capacity(64 + log.entries.len() * 16);

    write_u8(&mut w, log.version);
    write_u8(&mut w, log.outcome as u8);
    write_u16_le(&mut w, log.turns);

    // BTreeMap iteration is already ascending by actor index.
    write_u16_le(&mut w, checked_len("initial_hp", log.initial_hp.len())?);
    for (actor, hp) in &log.initial_hp {
        write_u16_le(&mut w, actor.0);
        write_u32_le(&mut w, *hp);
    }

    write_u32_le(&mut w, checked_len("entries", log.entries.len())?);
    for entry in &log.entries {
        encode_entry(&mut w, entry)?;
    }

    encode_participants(&mut w, &log.participants)?;
    Ok(w)
}

fn encode_entry(w: &mut Vec<u8>, entry: &BattleActionEntry) -> Result<(), LogCodecError> {
    write_u16_le(w, entry.turn);

    let mut present = 0u8;
    if entry.actor.is_some() {
        present |= ENTRY_ACTOR;
    }
    if entry.skill_index.is_some() {
        present |= ENTRY_SKILL;
    }
    if entry.extra.is_some() {
        present |= ENTRY_EXTRA;
    }
    write_u8(w, present);

    if let Some(actor) = entry.actor {
        write_u16_le(w, actor.0);
    }
    write_u8(w, entry.kind as u8);
    if let Some(skill_index) = entry.skill_index {
        write_u16_le(w, skill_index);
    }
    if let Some(extra) = entry.extra {
        write_u32_le(w, extra);
    }

    write_u16_le(w, checked_len("entry effects", entry.effects.len())?);
    for effect in &entry.effects {
        encode_effect(w, effect);
    }
    Ok(())
}

fn encode_effect(w: &mut Vec<u8>, effect: &BattleEffect) {
    write_u8(w, effect.kind as u8);

    let mut present = 0u8;
    if effect.target.is_some() {
        present |= EFFECT_TARGET;
    }
    if effect.value.is_some() {
        present |= EFFECT_VALUE;
    }
    if effect.status_id.is_some() {
        present |= EFFECT_STATUS;
    }
    if effect.extra.is_some() {
        present |= EFFECT_EXTRA;
    }
    write_u8(w, present);

    if let Some(target) = effect.target {
        write_u16_le(w, target.0);
    }
    if let Some(value) = effect.value {
        write_u32_le(w, value);
    }
    if let Some(status) = effect.status_id {
        write_u8(w, status.0);
    }
    if let Some(extra) = effect.extra {
        write_u32_le(w, extra);
    }
}

fn encode_participants(w: &mut Vec<u8>, participants: &Participants) -> Result<(), LogCodecError> {
    for (field, list) in [
        ("players", &participants.players),
        ("enemies", &participants.enemies),
    ] {
        write_u8(w, checked_len(field, list.len())?);
        for participant in list {
            write_u16_le(w, participant.actor.0);
            write_u16_le(w, participant.master_id);
            write_u16_le(w, participant.level);
            write_u32_le(w, participant.max_hp);
            write_label(w, &participant.label)?;
        }
    }
    Ok(())
}

/// Decodes a persisted log.
///
/// Fails with [`LogCodecError::UnsupportedVersion`] on any version other than
/// [`LOG_VERSION`] and with [`LogCodecError::MalformedData`] on truncation,
/// trailing bytes, unknown kinds or presence bits, or an `initial_hp` table
/// that is not strictly ascending.
pub fn decode_log(bytes: &[u8]) -> Result<BattleLog, LogCodecError> {
    let mut r = Reader::new(bytes);

    let version = r.read_u8("version")?;
    if version != LOG_VERSION {
        return Err(LogCodecError::UnsupportedVersion {
            found: version,
            expected: LOG_VERSION,
        });
    }
    let outcome_raw = r.read_u8("outcome")?;
    let outcome = BattleOutcome::from_repr(outcome_raw)
        .ok_or_else(|| LogCodecError::malformed(format!("unknown outcome {outcome_raw}")))?;
    let turns = r.read_u16_le("turns")?;

    let hp_count = r.read_u16_le("initial_hp count")?;
    let mut initial_hp = BTreeMap::new();
    let mut previous: Option<u16> = None;
    for _ in 0..hp_count {
        let actor = r.read_u16_le("initial_hp actor")?;
        let hp = r.read_u32_le("initial_hp value")?;
        if previous.is_some_and(|p| p >= actor) {
            return Err(LogCodecError::malformed(format!(
                "initial_hp not strictly ascending at actor {actor}"
            )));
        }
        previous = Some(actor);
        initial_hp.insert(ActorIndex(actor), hp);
    }

    let entry_count = r.read_u32_le("entry count")?;
    // Each entry takes at least six bytes; reject absurd counts before allocating.
    if u64::from(entry_count) * 6 > r.remaining() as u64 {
        return Err(LogCodecError::malformed(format!(
            "entry count {entry_count} exceeds remaining {} bytes",
            r.remaining()
        )));
    }
    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        entries.push(decode_entry(&mut r)?);
    }

    let participants = decode_participants(&mut r)?;

    if r.remaining() != 0 {
        return Err(LogCodecError::malformed(format!(
            "{} trailing bytes after participants",
            r.remaining()
        )));
    }

    Ok(BattleLog {
        version,
        initial_hp,
        entries,
        outcome,
        turns,
        participants,
    })
}

fn decode_entry(r: &mut Reader<'_>) -> Result<BattleActionEntry, LogCodecError> {
    let turn = r.read_u16_le("entry turn")?;
    let present = r.read_u8("entry presence")?;
    if present & !ENTRY_MASK != 0 {
        return Err(LogCodecError::malformed(format!(
            "unknown entry presence bits {present:#04x}"
        )));
    }
    let actor = if present & ENTRY_ACTOR != 0 {
        Some(ActorIndex(r.read_u16_le("entry actor")?))
    } else {
        None
    };
    let kind_raw = r.read_u8("action kind")?;
    let kind = ActionKind::from_repr(kind_raw)
        .ok_or_else(|| LogCodecError::malformed(format!("unknown action kind {kind_raw}")))?;
    let skill_index = if present & ENTRY_SKILL != 0 {
        Some(r.read_u16_le("entry skill index")?)
    } else {
        None
    };
    let extra = if present & ENTRY_EXTRA != 0 {
        Some(r.read_u32_le("entry extra")?)
    } else {
        None
    };

    let effect_count = r.read_u16_le("effect count")?;
    let mut effects = Vec::with_capacity(usize::from(effect_count).min(r.remaining() / 2));
    for _ in 0..effect_count {
        effects.push(decode_effect(r)?);
    }

    Ok(BattleActionEntry {
        turn,
        actor,
        kind,
        skill_index,
        extra,
        effects,
    })
}

fn decode_effect(r: &mut Reader<'_>) -> Result<BattleEffect, LogCodecError> {
    let kind_raw = r.read_u8("effect kind")?;
    let kind = EffectKind::from_repr(kind_raw)
        .ok_or_else(|| LogCodecError::malformed(format!("unknown effect kind {kind_raw}")))?;
    let present = r.read_u8("effect presence")?;
    if present & !EFFECT_MASK != 0 {
        return Err(LogCodecError::malformed(format!(
            "unknown effect presence bits {present:#04x}"
        )));
    }

    let mut effect = BattleEffect::new(kind);
    if present & EFFECT_TARGET != 0 {
        effect.target = Some(ActorIndex(r.read_u16_le("effect target")?));
    }
    if present & EFFECT_VALUE != 0 {
        effect.value = Some(r.read_u32_le("effect value")?);
    }
    if present & EFFECT_STATUS != 0 {
        effect.status_id = Some(StatusId(r.read_u8("effect status")?));
    }
    if present & EFFECT_EXTRA != 0 {
        effect.extra = Some(r.read_u32_le("effect extra")?);
    }
    Ok(effect)
}

fn decode_participants(r: &mut Reader<'_>) -> Result<Participants, LogCodecError> {
    let mut decode_list = |what: &str| -> Result<Vec<Participant>, LogCodecError> {
        let count = r.read_u8(what)?;
        let mut list = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            list.push(Participant {
                actor: ActorIndex(r.read_u16_le("participant actor")?),
                master_id: r.read_u16_le("participant master id")?,
                level: r.read_u16_le("participant level")?,
                max_hp: r.read_u32_le("participant max hp")?,
                label: r.read_label()?,
            });
        }
        Ok(list)
    };
    let players = decode_list("player count")?;
    let enemies = decode_list("enemy count")?;
    Ok(Participants { players, enemies })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::DamageFlags;

    fn sample_log() -> BattleLog {
        let player = ActorIndex::player(0);
        let enemy = ActorIndex(1000);
        let mut initial_hp = BTreeMap::new();
        initial_hp.insert(enemy, 80);
        initial_hp.insert(player, 120);

        let mut attack = BattleActionEntry::declare(1, Some(player), ActionKind::PhysicalAttack)
            .with_skill_index(2);
        attack.effects.push(
            BattleEffect::on(EffectKind::PhysicalDamage, enemy)
                .with_value(45)
                .with_extra(DamageFlags::CRITICAL.bits()),
        );
        attack.effects.push(
            BattleEffect::on(EffectKind::StatusInflicted, enemy).with_status(StatusId(4)),
        );

        let mut start = BattleActionEntry::declare(0, None, ActionKind::BattleStart);
        start.effects.push(BattleEffect::marker());

        BattleLog {
            version: LOG_VERSION,
            initial_hp,
            entries: vec![
                start,
                BattleActionEntry::declare(1, None, ActionKind::TurnStart),
                attack,
                BattleActionEntry::declare(1, None, ActionKind::Victory).with_extra(7),
            ],
            outcome: BattleOutcome::Victory,
            turns: 1,
            participants: Participants {
                players: vec![Participant {
                    actor: player,
                    master_id: 9,
                    level: 12,
                    max_hp: 120,
                    label: String::new(),
                }],
                enemies: vec![Participant {
                    actor: enemy,
                    master_id: 0,
                    level: 5,
                    max_hp: 80,
                    label: "A".into(),
                }],
            },
        }
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let log = sample_log();
        let bytes = encode_log(&log).unwrap();
        assert_eq!(decode_log(&bytes).unwrap(), log);
    }

    #[test]
    fn header_layout_is_stable() {
        let bytes = encode_log(&sample_log()).unwrap();
        assert_eq!(&bytes[..4], &[LOG_VERSION, 0, 1, 0]);
        // initial_hp: two rows, actor 0 before actor 1000.
        assert_eq!(&bytes[4..6], &[2, 0]);
        assert_eq!(&bytes[6..8], &0u16.to_le_bytes());
        assert_eq!(&bytes[12..14], &1000u16.to_le_bytes());
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut bytes = encode_log(&sample_log()).unwrap();
        bytes[0] = LOG_VERSION + 1;
        assert_eq!(
            decode_log(&bytes),
            Err(LogCodecError::UnsupportedVersion {
                found: LOG_VERSION + 1,
                expected: LOG_VERSION,
            })
        );
    }

    #[test]
    fn every_truncation_is_malformed() {
        let bytes = encode_log(&sample_log()).unwrap();
        for len in 1..bytes.len() {
            assert!(
                matches!(
                    decode_log(&bytes[..len]),
                    Err(LogCodecError::MalformedData { .. })
                ),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut bytes = encode_log(&sample_log()).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode_log(&bytes),
            Err(LogCodecError::MalformedData { .. })
        ));
    }

    #[test]
    fn unknown_action_kind_is_malformed() {
        let log = BattleLog {
            entries: vec![BattleActionEntry::declare(0, None, ActionKind::BattleStart)],
            initial_hp: BTreeMap::new(),
            participants: Participants::default(),
            ..sample_log()
        };
        let mut bytes = encode_log(&log).unwrap();
        // header 4 + hp count 2 + entry count 4 + turn 2 + presence 1
        bytes[13] = 0xff;
        assert!(matches!(
            decode_log(&bytes),
            Err(LogCodecError::MalformedData { .. })
        ));
    }

    #[test]
    fn descending_initial_hp_is_malformed() {
        let log = BattleLog {
            entries: Vec::new(),
            participants: Participants::default(),
            ..sample_log()
        };
        let mut bytes = encode_log(&log).unwrap();
        // Swap the two (actor, hp) rows.
        let (first, second) = bytes[6..18].split_at_mut(6);
        first.swap_with_slice(second);
        assert!(matches!(
            decode_log(&bytes),
            Err(LogCodecError::MalformedData { .. })
        ));
    }

    #[test]
    fn oversized_label_is_refused() {
        let mut log = sample_log();
        log.participants.players[0].label = "x".repeat(256);
        assert!(matches!(
            encode_log(&log),
            Err(LogCodecError::FieldTooLong { max: 255, .. })
        ));
    }
}
