//! Typed payloads, one sum type per effect family.

use crate::types::{
    ActionChoice, Attribute, BuffKind, CombatStat, DamageType, EquipmentCategory, HpScale,
    ReactionTrigger, RowProfile, SpecialAttackId, SpellId, StatusId,
};

use super::kind::EffectFamily;

/// A scalar that composes multiplicatively with others aimed at the same target.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    /// `+p%`, contributes `1 + p / 100`.
    Percent(f64),
    /// `×m`, contributes `m`.
    Multiplier(f64),
}

impl Modifier {
    pub fn factor(self) -> f64 {
        match self {
            Self::Percent(p) => 1.0 + p / 100.0,
            Self::Multiplier(m) => m,
        }
    }
}

/// A decoded effect row.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectPayload {
    Damage(DamageEffect),
    Combat(CombatEffect),
    Spell(SpellEffect),
    Status(StatusModifierEffect),
    Resurrection(ResurrectionEffect),
    Misc(MiscEffect),
    Stat(StatEffect),
    EquipmentSlot(EquipmentSlotEffect),
    Spellbook(SpellbookEffect),
    Reward(RewardEffect),
    Exploration(ExplorationEffect),
}

impl EffectPayload {
    pub const fn family(&self) -> EffectFamily {
        match self {
            Self::Damage(_) => EffectFamily::Damage,
            Self::Combat(_) => EffectFamily::Combat,
            Self::Spell(_) => EffectFamily::Spell,
            Self::Status(_) => EffectFamily::Status,
            Self::Resurrection(_) => EffectFamily::Resurrection,
            Self::Misc(_) => EffectFamily::Misc,
            Self::Stat(_) => EffectFamily::Stat,
            Self::EquipmentSlot(_) => EffectFamily::EquipmentSlot,
            Self::Spellbook(_) => EffectFamily::Spellbook,
            Self::Reward(_) => EffectFamily::Reward,
            Self::Exploration(_) => EffectFamily::Exploration,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DamageEffect {
    Dealt {
        damage_type: DamageType,
        modifier: Modifier,
    },
    Taken {
        damage_type: DamageType,
        modifier: Modifier,
    },
    Critical(Modifier),
    CriticalTaken(f64),
    /// Applies only while the attacker fights unarmed or with gauntlets.
    Martial(Modifier),
    /// Percent of the defender's defense ignored.
    Penetration(f64),
    /// Extra multiplier while the target's HP is at or below `threshold_percent`.
    HpThreshold {
        threshold_percent: f64,
        multiplier: f64,
    },
    /// Damage taken shrinks by `per_level_percent` for every level the holder
    /// outranks the attacker, up to `cap_percent`.
    LevelComparison {
        per_level_percent: f64,
        cap_percent: f64,
    },
}

/// A conditional counter-move.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionRule {
    pub trigger: ReactionTrigger,
    /// Restricts `Damaged` triggers to one damage channel.
    pub damage_type: Option<DamageType>,
    pub chance: f64,
    /// Fraction of the reactor's attack count used by the reaction strike.
    pub attack_ratio: f64,
}

impl ReactionRule {
    pub const COUNTER_RATIO: f64 = 0.3;
    pub const FOLLOW_UP_RATIO: f64 = 0.5;
    pub const RETALIATION_RATIO: f64 = 1.0;

    /// Whether `trigger`, carrying `damage_type` when it has one, fires this rule.
    pub fn fires_on(&self, trigger: ReactionTrigger, damage_type: Option<DamageType>) -> bool {
        self.trigger == trigger
            && match (self.damage_type, damage_type) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            }
    }

    pub const fn default_ratio(trigger: ReactionTrigger) -> f64 {
        match trigger {
            ReactionTrigger::Damaged | ReactionTrigger::Evaded => Self::COUNTER_RATIO,
            ReactionTrigger::AllyAttacked => Self::FOLLOW_UP_RATIO,
            ReactionTrigger::AllyDefeated => Self::RETALIATION_RATIO,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CombatEffect {
    ProcRate(Modifier),
    ExtraAction { chance: f64, count: u8 },
    Reaction(ReactionRule),
    Barrier { damage_type: DamageType, charges: u8 },
    Parry { chance: f64 },
    ShieldBlock { chance: f64 },
    EnemyStatDebuff { stat: CombatStat, percent: f64 },
    ActionOrder(f64),
    ActionOrderShuffle,
    FirstStrike,
    MinHitScale(f64),
    DodgeCap(f64),
    CriticalRateMax(f64),
    SpecialAttack { id: SpecialAttackId, chance: f64 },
    ActionRate { choice: ActionChoice, weight: f64 },
    PartyHostile,
    PartyProtect,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SpellEffect {
    Power(Modifier),
    Specific { spells: Vec<SpellId>, multiplier: f64 },
    HealingPower(f64),
    ChargeOverride { spell: SpellId, charges: u8 },
    /// `spells` empty means every spell the holder knows.
    ChargeRecovery { spells: Vec<SpellId>, chance: f64 },
}

/// A scheduled buff: fires on `start_turn`, then every `interval` turns if set.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedBuffTrigger {
    pub kind: BuffKind,
    pub percent: f64,
    pub start_turn: u16,
    pub interval: Option<u16>,
    pub duration: u8,
}

impl TimedBuffTrigger {
    pub fn fires_on(&self, turn: u16) -> bool {
        match (turn.checked_sub(self.start_turn), self.interval) {
            (Some(0), _) => true,
            (Some(elapsed), Some(interval)) => elapsed % interval == 0,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatusModifierEffect {
    Susceptibility { status: StatusId, modifier: Modifier },
    Immunity(StatusId),
    Infliction { status: StatusId, chance: f64 },
    TimedBuff(TimedBuffTrigger),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResurrectionEffect {
    /// Revive a fallen ally the instant it falls.
    Rescue { chance: f64, hp_scale: HpScale },
    /// Revive self at end of turn.
    Active { chance: f64, hp_scale: HpScale },
    /// Revive self at end of turn, unconditionally, once per battle.
    Forced { hp_scale: HpScale },
    /// Floor on the HP any resurrection of the holder restores.
    Vitalize { hp_scale: HpScale },
    /// Revive one fallen ally every `interval` turns.
    Necromancer { interval: u16, hp_scale: HpScale },
    /// Every `interval` turns, trade the weakest living ally for a fallen one.
    Sacrifice { interval: u16 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum MiscEffect {
    TargetingWeight(f64),
    RowProfile(RowProfile),
    Absorption(f64),
    RetreatAtTurn(u16),
    Runaway { threshold_percent: f64, chance: f64 },
    DegradationRepair { chance: f64 },
    CoverRowsBehind,
    EndOfTurnHeal(f64),
    EndOfTurnHpDelta(f64),
}

/// Non-battle stat effects. Scaling variants carry their raw coefficients;
/// the compiler bakes them into flat numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum StatEffect {
    Additive { stat: CombatStat, amount: f64 },
    Scale { stat: CombatStat, modifier: Modifier },
    FixedToOne(CombatStat),
    ConversionPercent {
        source: CombatStat,
        target: CombatStat,
        percent: f64,
    },
    ConversionLinear {
        source: CombatStat,
        target: CombatStat,
        per_unit: f64,
        unit: f64,
    },
    AttributeAdditive { attribute: Attribute, amount: f64 },
    Talent(CombatStat),
    Incompetence(CombatStat),
    PercentPerLevel { stat: CombatStat, per_level: f64 },
    PercentFromAttribute {
        stat: CombatStat,
        attribute: Attribute,
        per_point: f64,
    },
    LevelMultiplier {
        stat: CombatStat,
        base: f64,
        per_level: f64,
    },
    Growth(f64),
    EquipmentCategory {
        category: EquipmentCategory,
        multiplier: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum EquipmentSlotEffect {
    Additive(u8),
    Multiplier(f64),
    Halving,
    Talent,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SpellbookEffect {
    Unlock(Vec<SpellId>),
    TierUnlock(u8),
}

#[derive(Clone, Debug, PartialEq)]
pub enum RewardEffect {
    Experience(f64),
    Gold(f64),
    DropRate(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExplorationEffect {
    Time(Modifier),
}
