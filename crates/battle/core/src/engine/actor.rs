use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::skills::SkillEffects;
use crate::stats::CombatSnapshot;
use crate::types::{
    ActionChoice, ActorIndex, BuffKind, CombatStat, DamageType, HpScale, PerDamageType, PerStat,
    Row, Side, SpellId, StatusId,
};

/// Everything the engine needs to put one combatant on the field.
///
/// Produced by `roster::prepare_player` / `roster::prepare_enemy`, or built
/// by hand in tests.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleActorSeed {
    pub index: ActorIndex,
    pub side: Side,
    /// Character id for players, enemy master index for enemies.
    pub master_id: u16,
    pub level: u16,
    pub row: Row,
    pub snapshot: CombatSnapshot,
    pub effects: SkillEffects,
    /// Known spells in preference order.
    pub spells: Vec<SpellId>,
    /// Base weights of the action families; empty means "always attack".
    pub action_rates: BTreeMap<ActionChoice, f64>,
    /// Fighting without a weapon, or with a martial one.
    pub martial: bool,
    /// Starting HP; `None` starts at max HP.
    pub hp: Option<u32>,
}

impl BattleActorSeed {
    pub fn new(index: ActorIndex, side: Side, snapshot: CombatSnapshot) -> Self {
        Self {
            index,
            side,
            master_id: index.0,
            level: 1,
            row: Row::Front,
            snapshot,
            effects: SkillEffects::default(),
            spells: Vec::new(),
            action_rates: BTreeMap::new(),
            martial: false,
            hp: None,
        }
    }

    pub fn with_master_id(mut self, master_id: u16) -> Self {
        self.master_id = master_id;
        self
    }

    pub fn with_level(mut self, level: u16) -> Self {
        self.level = level;
        self
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.row = row;
        self
    }

    pub fn with_effects(mut self, effects: SkillEffects) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_spells(mut self, spells: Vec<SpellId>) -> Self {
        self.spells = spells;
        self
    }

    pub fn with_action_rate(mut self, choice: ActionChoice, weight: f64) -> Self {
        self.action_rates.insert(choice, weight);
        self
    }

    pub fn with_martial(mut self, martial: bool) -> Self {
        self.martial = martial;
        self
    }

    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }
}

/// A status currently afflicting an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveStatus {
    pub id: StatusId,
    pub remaining: u8,
}

/// A timed buff currently running on an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveBuff {
    pub kind: BuffKind,
    pub percent: f64,
    pub remaining: u8,
}

/// Live state of one combatant. Owned by the engine for one battle.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleActor {
    pub index: ActorIndex,
    pub side: Side,
    pub master_id: u16,
    pub level: u16,
    pub row: Row,
    pub snapshot: CombatSnapshot,
    pub effects: SkillEffects,
    pub martial: bool,
    pub hp: u32,
    pub max_hp: u32,
    pub spells: Vec<SpellId>,
    pub spell_charges: BTreeMap<SpellId, u8>,
    pub max_spell_charges: BTreeMap<SpellId, u8>,
    pub action_rates: BTreeMap<ActionChoice, f64>,
    pub barrier_charges: PerDamageType<u16>,
    pub statuses: ArrayVec<ActiveStatus, { BattleConfig::MAX_STATUS_EFFECTS }>,
    pub buffs: Vec<ActiveBuff>,
    /// Percent reductions applied by opponents' stat debuffs.
    pub debuffs: PerStat<f64>,
    /// Armor wear from critical hits taken; each step costs 2% physical defense.
    pub degradation: u8,
    pub forced_revive_used: bool,
    pub fled: bool,
}

impl BattleActor {
    const DEGRADATION_STEP_PERCENT: f64 = 2.0;

    /// `charges` holds the per-spell starting charge after overrides.
    pub(crate) fn from_seed(seed: BattleActorSeed, charges: BTreeMap<SpellId, u8>) -> Self {
        let max_hp = seed.snapshot.max_hp().max(1);
        let hp = seed.hp.map_or(max_hp, |hp| hp.min(max_hp));
        let barrier_charges = seed.effects.combat.barrier_charges();
        Self {
            index: seed.index,
            side: seed.side,
            master_id: seed.master_id,
            level: seed.level,
            row: seed.row,
            snapshot: seed.snapshot,
            martial: seed.martial,
            hp,
            max_hp,
            spells: seed.spells,
            max_spell_charges: charges.clone(),
            spell_charges: charges,
            action_rates: seed.action_rates,
            barrier_charges,
            statuses: ArrayVec::new(),
            buffs: Vec::new(),
            debuffs: PerStat::splat(0.0),
            degradation: 0,
            forced_revive_used: false,
            fled: false,
            effects: seed.effects,
        }
    }

    /// On the field and standing.
    pub fn is_alive(&self) -> bool {
        self.hp > 0 && !self.fled
    }

    /// On the field and fallen, so still revivable.
    pub fn is_fallen(&self) -> bool {
        self.hp == 0 && !self.fled
    }

    /// Fallen with an end-of-turn self-revival still available.
    pub fn can_self_revive(&self) -> bool {
        let resurrection = &self.effects.resurrection;
        self.is_fallen()
            && (!resurrection.active.is_empty()
                || (!self.forced_revive_used && !resurrection.forced.is_empty()))
    }

    pub fn hp_percent(&self) -> f64 {
        f64::from(self.hp) * 100.0 / f64::from(self.max_hp.max(1))
    }

    /// Combat stat after opponents' debuffs and, for physical defense,
    /// armor degradation. Never negative.
    pub fn stat(&self, stat: CombatStat) -> f64 {
        let base = self.snapshot.get(stat) as f64;
        let mut value = base * (1.0 - self.debuffs[stat] / 100.0);
        if stat == CombatStat::PhysicalDefense {
            value *= 1.0 - f64::from(self.degradation) * Self::DEGRADATION_STEP_PERCENT / 100.0;
        }
        value.max(0.0)
    }

    /// Product of every running buff of `kind`.
    pub fn buff_factor(&self, kind: BuffKind) -> f64 {
        self.buffs
            .iter()
            .filter(|buff| buff.kind == kind)
            .map(|buff| 1.0 + buff.percent / 100.0)
            .product::<f64>()
            .max(0.0)
    }

    pub fn attack_stat(&self, damage_type: DamageType) -> f64 {
        match damage_type {
            DamageType::Physical => self.stat(CombatStat::PhysicalAttack),
            DamageType::Magical => self.stat(CombatStat::MagicalAttack),
            DamageType::Breath => self.stat(CombatStat::BreathDamage),
        }
    }

    /// Breath ignores defense.
    pub fn defense_stat(&self, damage_type: DamageType) -> f64 {
        match damage_type {
            DamageType::Physical => self.stat(CombatStat::PhysicalDefense),
            DamageType::Magical => self.stat(CombatStat::MagicalDefense),
            DamageType::Breath => 0.0,
        }
    }

    pub fn has_status(&self, id: StatusId) -> bool {
        self.statuses.iter().any(|status| status.id == id)
    }

    /// Heals up to max HP; returns the HP actually restored.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.max_hp - self.hp.min(self.max_hp));
        self.hp += applied;
        applied
    }

    /// Brings a fallen actor back with `hp`, clearing what death wiped.
    pub(crate) fn revive(&mut self, hp: u32) {
        self.hp = hp.clamp(1, self.max_hp);
        self.statuses.clear();
        self.buffs.clear();
    }

    /// HP to set on revival with `scale`, after this actor's vitalize floor.
    pub fn revive_hp(&self, scale: HpScale) -> u32 {
        self.effects
            .resurrection
            .revive_scale(scale)
            .resolve(self.max_hp)
    }

    pub(crate) fn fall(&mut self) {
        self.hp = 0;
        self.statuses.clear();
        self.buffs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::ChanceRevive;

    fn actor(max_hp: i64) -> BattleActor {
        let mut snapshot = CombatSnapshot::default();
        snapshot.stats[CombatStat::MaxHp] = max_hp;
        snapshot.stats[CombatStat::PhysicalDefense] = 1000;
        BattleActor::from_seed(
            BattleActorSeed::new(ActorIndex(1), Side::Player, snapshot),
            BTreeMap::new(),
        )
    }

    #[test]
    fn degradation_erodes_physical_defense_only() {
        let mut actor = actor(100);
        actor.degradation = 5;
        assert!((actor.stat(CombatStat::PhysicalDefense) - 900.0).abs() < 1e-9);
        assert_eq!(actor.stat(CombatStat::MagicalDefense), 0.0);
    }

    #[test]
    fn heal_reports_applied_amount() {
        let mut actor = actor(100);
        actor.hp = 90;
        assert_eq!(actor.heal(25), 10);
        assert_eq!(actor.hp, 100);
    }

    #[test]
    fn revive_scale_never_drops_below_one() {
        let mut actor = actor(10);
        actor.fall();
        assert!(actor.is_fallen());
        assert_eq!(actor.revive_hp(HpScale::MaxHp5Percent), 1);
        actor.revive(actor.revive_hp(HpScale::Full));
        assert_eq!(actor.hp, 10);
    }

    #[test]
    fn forced_revival_is_spent_once() {
        let mut actor = actor(10);
        actor.effects.resurrection.forced.push(HpScale::Full);
        assert!(!actor.can_self_revive());

        actor.fall();
        assert!(actor.can_self_revive());
        actor.forced_revive_used = true;
        assert!(!actor.can_self_revive());

        actor.effects.resurrection.active.push(ChanceRevive {
            chance: 50.0,
            hp_scale: HpScale::MaxHp5Percent,
        });
        assert!(actor.can_self_revive());
    }

    #[test]
    fn fled_actors_are_neither_alive_nor_fallen() {
        let mut actor = actor(10);
        actor.fled = true;
        assert!(!actor.is_alive());
        assert!(!actor.is_fallen());
    }
}
