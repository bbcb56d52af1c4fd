//! HP reconstruction from a decoded log.
//!
//! Damage values are what the engine computed for the hit, so they may exceed
//! the HP the target had left; heal values are the amounts actually applied.

use std::collections::BTreeMap;

use crate::types::ActorIndex;

use super::kind::EffectKind;
use super::model::{BattleEffect, BattleLog};

/// HP of one actor right after one effect touched it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HpChange {
    /// Position of the entry in `BattleLog::entries`.
    pub entry: usize,
    pub actor: ActorIndex,
    pub hp: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HpTimeline {
    pub history: Vec<HpChange>,
    pub final_hp: BTreeMap<ActorIndex, u32>,
}

impl HpTimeline {
    /// HP of `actor` after entry `entry` has been applied.
    pub fn hp_after(&self, entry: usize, actor: ActorIndex, initial: u32) -> u32 {
        self.history
            .iter()
            .take_while(|change| change.entry <= entry)
            .filter(|change| change.actor == actor)
            .last()
            .map_or(initial, |change| change.hp)
    }
}

/// Replays every HP-affecting effect on top of the log's initial HP.
///
/// Effects naming an actor absent from `initial_hp` start from zero.
pub fn reconstruct_hp(log: &BattleLog) -> HpTimeline {
    let mut hp = log.initial_hp.clone();
    let mut history = Vec::new();

    for (index, entry) in log.entries.iter().enumerate() {
        for effect in &entry.effects {
            let Some(target) = effect.target else {
                continue;
            };
            let current = hp.get(&target).copied().unwrap_or(0);
            if let Some(next) = apply(current, effect) {
                hp.insert(target, next);
                history.push(HpChange {
                    entry: index,
                    actor: target,
                    hp: next,
                });
            }
        }
    }

    HpTimeline {
        history,
        final_hp: hp,
    }
}

fn apply(current: u32, effect: &BattleEffect) -> Option<u32> {
    let value = effect.value.unwrap_or(0);
    match effect.kind {
        kind if kind.is_damage() => Some(current.saturating_sub(value)),
        kind if kind.is_heal() => Some(current.saturating_add(value)),
        kind if kind.is_revive() => Some(value),
        EffectKind::Defeated | EffectKind::Sacrificed => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{ActionKind, BattleActionEntry, BattleOutcome, LOG_VERSION, Participants};

    #[test]
    fn replay_follows_damage_heal_and_revive() {
        let hero = ActorIndex(1);
        let mut initial_hp = BTreeMap::new();
        initial_hp.insert(hero, 100);

        let mut hit = BattleActionEntry::declare(1, Some(ActorIndex(1001)), ActionKind::Breath);
        hit.effects
            .push(BattleEffect::on(EffectKind::BreathDamage, hero).with_value(130));
        hit.effects.push(BattleEffect::on(EffectKind::Defeated, hero));
        let mut revive = BattleActionEntry::declare(1, Some(hero), ActionKind::Resurrection);
        revive
            .effects
            .push(BattleEffect::on(EffectKind::Resurrected, hero).with_value(5));
        let mut heal = BattleActionEntry::declare(2, Some(hero), ActionKind::TurnEndHeal);
        heal.effects
            .push(BattleEffect::on(EffectKind::Heal, hero).with_value(20));

        let log = BattleLog {
            version: LOG_VERSION,
            initial_hp,
            entries: vec![hit, revive, heal],
            outcome: BattleOutcome::Retreat,
            turns: 2,
            participants: Participants::default(),
        };

        let timeline = reconstruct_hp(&log);
        assert_eq!(timeline.final_hp[&hero], 25);
        assert_eq!(timeline.hp_after(0, hero, 100), 0);
        assert_eq!(timeline.hp_after(1, hero, 100), 5);
        assert_eq!(timeline.history.len(), 4);
    }
}
