//! The closed effect-type taxonomy and its required-field table.
//!
//! Both [`EffectType::family`] and [`EffectType::schema`] are exhaustive
//! matches without a wildcard arm, so adding a variant fails to compile until
//! it is classified and given a schema.

use strum::{Display, EnumCount, EnumIter, FromRepr, IntoStaticStr};

use super::keys::{ArrayKey, ParamKey, ValueKey};

/// Payload family an effect type decodes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "camelCase")]
pub enum EffectFamily {
    Damage,
    Combat,
    Spell,
    Status,
    Resurrection,
    Misc,
    /// Consumed by the stat calculator before battle.
    Stat,
    EquipmentSlot,
    Spellbook,
    Reward,
    Exploration,
}

impl EffectFamily {
    /// Families folded into the in-battle [`SkillEffects`](crate::SkillEffects) bundle.
    pub const fn is_battle_channel(self) -> bool {
        matches!(
            self,
            Self::Damage
                | Self::Combat
                | Self::Spell
                | Self::Status
                | Self::Resurrection
                | Self::Misc
        )
    }
}

/// Every effect tag a skill or item row may carry.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    EnumCount,
    FromRepr,
    Display,
    IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
#[repr(u16)]
pub enum EffectType {
    // damage
    DamageDealtPercent,
    DamageDealtMultiplier,
    DamageTakenPercent,
    DamageTakenMultiplier,
    CriticalDamagePercent,
    CriticalDamageMultiplier,
    CriticalDamageTakenMultiplier,
    MartialPercent,
    MartialMultiplier,
    DefensePenetration,
    HpThresholdMultiplier,
    LevelComparisonDamageTaken,
    // combat
    ProcRatePercent,
    ProcRateMultiplier,
    ExtraAction,
    CounterAttack,
    FollowUpAttack,
    Retaliation,
    Reaction,
    Barrier,
    Parry,
    ShieldBlock,
    EnemyStatDebuff,
    ActionOrderMultiplier,
    ActionOrderShuffle,
    FirstStrike,
    MinHitScale,
    DodgeCap,
    CriticalRateMax,
    SpecialAttack,
    ActionRate,
    PartyHostile,
    PartyProtect,
    // spell
    SpellPowerPercent,
    SpellPowerMultiplier,
    SpellSpecificMultiplier,
    HealingPowerMultiplier,
    SpellChargeOverride,
    SpellChargeRecovery,
    // status
    StatusSusceptibilityPercent,
    StatusSusceptibilityMultiplier,
    StatusImmunity,
    StatusInfliction,
    TimedBuff,
    // resurrection
    Rescue,
    ResurrectionActive,
    ResurrectionForced,
    ResurrectionVitalize,
    ResurrectionNecromancer,
    ResurrectionSacrifice,
    // misc
    TargetingWeight,
    RowProfile,
    Absorption,
    RetreatAtTurn,
    Runaway,
    DegradationRepair,
    CoverRowsBehind,
    EndOfTurnHeal,
    EndOfTurnHpDelta,
    // stat
    StatAdditive,
    StatPercent,
    StatMultiplier,
    StatFixedToOne,
    StatConversionPercent,
    StatConversionLinear,
    AttributeAdditive,
    Talent,
    Incompetence,
    StatPercentPerLevel,
    StatPercentFromAttribute,
    StatLevelMultiplier,
    GrowthMultiplier,
    EquipmentStatMultiplier,
    // equipment slots
    EquipmentCapacityAdditive,
    EquipmentCapacityMultiplier,
    EquipmentCapacityHalving,
    EquipmentCapacityTalent,
    // spellbook
    SpellbookUnlock,
    SpellbookTierUnlock,
    // reward
    ExperienceMultiplier,
    GoldMultiplier,
    DropRatePercent,
    // exploration
    ExplorationTimeMultiplier,
    ExplorationTimePercent,
}

/// Required fields of one effect type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectSchema {
    pub params: &'static [ParamKey],
    pub values: &'static [ValueKey],
    pub arrays: &'static [ArrayKey],
}

impl EffectSchema {
    const fn new(
        params: &'static [ParamKey],
        values: &'static [ValueKey],
        arrays: &'static [ArrayKey],
    ) -> Self {
        Self {
            params,
            values,
            arrays,
        }
    }

    const EMPTY: Self = Self::new(&[], &[], &[]);
}

impl EffectType {
    pub const fn family(self) -> EffectFamily {
        use EffectType::*;
        match self {
            DamageDealtPercent
            | DamageDealtMultiplier
            | DamageTakenPercent
            | DamageTakenMultiplier
            | CriticalDamagePercent
            | CriticalDamageMultiplier
            | CriticalDamageTakenMultiplier
            | MartialPercent
            | MartialMultiplier
            | DefensePenetration
            | HpThresholdMultiplier
            | LevelComparisonDamageTaken => EffectFamily::Damage,
            ProcRatePercent | ProcRateMultiplier | ExtraAction | CounterAttack | FollowUpAttack
            | Retaliation | Reaction | Barrier | Parry | ShieldBlock | EnemyStatDebuff
            | ActionOrderMultiplier | ActionOrderShuffle | FirstStrike | MinHitScale
            | DodgeCap | CriticalRateMax | SpecialAttack | ActionRate | PartyHostile
            | PartyProtect => EffectFamily::Combat,
            SpellPowerPercent
            | SpellPowerMultiplier
            | SpellSpecificMultiplier
            | HealingPowerMultiplier
            | SpellChargeOverride
            | SpellChargeRecovery => EffectFamily::Spell,
            StatusSusceptibilityPercent
            | StatusSusceptibilityMultiplier
            | StatusImmunity
            | StatusInfliction
            | TimedBuff => EffectFamily::Status,
            Rescue
            | ResurrectionActive
            | ResurrectionForced
            | ResurrectionVitalize
            | ResurrectionNecromancer
            | ResurrectionSacrifice => EffectFamily::Resurrection,
            TargetingWeight | RowProfile | Absorption | RetreatAtTurn | Runaway
            | DegradationRepair | CoverRowsBehind | EndOfTurnHeal | EndOfTurnHpDelta => {
                EffectFamily::Misc
            }
            StatAdditive
            | StatPercent
            | StatMultiplier
            | StatFixedToOne
            | StatConversionPercent
            | StatConversionLinear
            | AttributeAdditive
            | Talent
            | Incompetence
            | StatPercentPerLevel
            | StatPercentFromAttribute
            | StatLevelMultiplier
            | GrowthMultiplier
            | EquipmentStatMultiplier => EffectFamily::Stat,
            EquipmentCapacityAdditive
            | EquipmentCapacityMultiplier
            | EquipmentCapacityHalving
            | EquipmentCapacityTalent => EffectFamily::EquipmentSlot,
            SpellbookUnlock | SpellbookTierUnlock => EffectFamily::Spellbook,
            ExperienceMultiplier | GoldMultiplier | DropRatePercent => EffectFamily::Reward,
            ExplorationTimeMultiplier | ExplorationTimePercent => EffectFamily::Exploration,
        }
    }

    /// Mandatory parameter, value and array keys. Optional keys are not listed.
    pub const fn schema(self) -> EffectSchema {
        use ParamKey as P;
        use ValueKey as V;
        match self {
            Self::DamageDealtPercent | Self::DamageTakenPercent => {
                EffectSchema::new(&[P::DamageType], &[V::Percent], &[])
            }
            Self::DamageDealtMultiplier | Self::DamageTakenMultiplier => {
                EffectSchema::new(&[P::DamageType], &[V::Multiplier], &[])
            }
            Self::CriticalDamagePercent
            | Self::MartialPercent
            | Self::DefensePenetration
            | Self::ProcRatePercent
            | Self::SpellPowerPercent
            | Self::Absorption
            | Self::EndOfTurnHeal
            | Self::EndOfTurnHpDelta
            | Self::DropRatePercent
            | Self::ExplorationTimePercent => EffectSchema::new(&[], &[V::Percent], &[]),
            Self::CriticalDamageMultiplier
            | Self::CriticalDamageTakenMultiplier
            | Self::MartialMultiplier
            | Self::ProcRateMultiplier
            | Self::ActionOrderMultiplier
            | Self::MinHitScale
            | Self::SpellPowerMultiplier
            | Self::HealingPowerMultiplier
            | Self::GrowthMultiplier
            | Self::EquipmentCapacityMultiplier
            | Self::ExperienceMultiplier
            | Self::GoldMultiplier
            | Self::ExplorationTimeMultiplier => EffectSchema::new(&[], &[V::Multiplier], &[]),
            Self::HpThresholdMultiplier => {
                EffectSchema::new(&[], &[V::Threshold, V::Multiplier], &[])
            }
            Self::LevelComparisonDamageTaken => {
                EffectSchema::new(&[], &[V::PerLevel, V::Cap], &[])
            }
            Self::ExtraAction => EffectSchema::new(&[P::Count], &[V::Chance], &[]),
            Self::CounterAttack
            | Self::FollowUpAttack
            | Self::Retaliation
            | Self::Parry
            | Self::ShieldBlock
            | Self::DegradationRepair => EffectSchema::new(&[], &[V::Chance], &[]),
            Self::Reaction => EffectSchema::new(&[P::Trigger], &[V::Chance], &[]),
            Self::Barrier => EffectSchema::new(&[P::DamageType, P::Count], &[], &[]),
            Self::EnemyStatDebuff => EffectSchema::new(&[P::Stat], &[V::Percent], &[]),
            Self::ActionOrderShuffle
            | Self::FirstStrike
            | Self::PartyHostile
            | Self::PartyProtect
            | Self::CoverRowsBehind
            | Self::EquipmentCapacityHalving
            | Self::EquipmentCapacityTalent => EffectSchema::EMPTY,
            Self::DodgeCap | Self::CriticalRateMax => EffectSchema::new(&[], &[V::Cap], &[]),
            Self::SpecialAttack => EffectSchema::new(&[P::SpecialAttackId], &[V::Chance], &[]),
            Self::ActionRate => EffectSchema::new(&[P::Choice], &[V::Weight], &[]),
            Self::SpellSpecificMultiplier => {
                EffectSchema::new(&[], &[V::Multiplier], &[ArrayKey::SpellIds])
            }
            Self::SpellChargeOverride => EffectSchema::new(&[P::SpellId, P::Count], &[], &[]),
            Self::SpellChargeRecovery => EffectSchema::new(&[], &[V::Chance], &[]),
            Self::StatusSusceptibilityPercent => {
                EffectSchema::new(&[P::StatusId], &[V::Percent], &[])
            }
            Self::StatusSusceptibilityMultiplier => {
                EffectSchema::new(&[P::StatusId], &[V::Multiplier], &[])
            }
            Self::StatusImmunity => EffectSchema::new(&[P::StatusId], &[], &[]),
            Self::StatusInfliction => EffectSchema::new(&[P::StatusId], &[V::Chance], &[]),
            Self::TimedBuff => {
                EffectSchema::new(&[P::BuffKind, P::Turn, P::Duration], &[V::Percent], &[])
            }
            Self::Rescue | Self::ResurrectionActive => {
                EffectSchema::new(&[P::HpScale], &[V::Chance], &[])
            }
            Self::ResurrectionForced | Self::ResurrectionVitalize => {
                EffectSchema::new(&[P::HpScale], &[], &[])
            }
            Self::ResurrectionNecromancer => {
                EffectSchema::new(&[P::Interval, P::HpScale], &[], &[])
            }
            Self::ResurrectionSacrifice => EffectSchema::new(&[P::Interval], &[], &[]),
            Self::TargetingWeight => EffectSchema::new(&[], &[V::Weight], &[]),
            Self::RowProfile => EffectSchema::new(&[P::RowProfile], &[], &[]),
            Self::RetreatAtTurn => EffectSchema::new(&[P::Turn], &[], &[]),
            Self::Runaway => EffectSchema::new(&[], &[V::Threshold, V::Chance], &[]),
            Self::StatAdditive => EffectSchema::new(&[P::Stat], &[V::Additive], &[]),
            Self::StatPercent => EffectSchema::new(&[P::Stat], &[V::Percent], &[]),
            Self::StatMultiplier => EffectSchema::new(&[P::Stat], &[V::Multiplier], &[]),
            Self::StatFixedToOne | Self::Talent | Self::Incompetence => {
                EffectSchema::new(&[P::Stat], &[], &[])
            }
            Self::StatConversionPercent => {
                EffectSchema::new(&[P::SourceStat, P::TargetStat], &[V::Percent], &[])
            }
            Self::StatConversionLinear => EffectSchema::new(
                &[P::SourceStat, P::TargetStat],
                &[V::PerUnit, V::Unit],
                &[],
            ),
            Self::AttributeAdditive => EffectSchema::new(&[P::Attribute], &[V::Additive], &[]),
            Self::StatPercentPerLevel => EffectSchema::new(&[P::Stat], &[V::PerLevel], &[]),
            Self::StatPercentFromAttribute => {
                EffectSchema::new(&[P::Stat, P::Attribute], &[V::PerPoint], &[])
            }
            Self::StatLevelMultiplier => {
                EffectSchema::new(&[P::Stat], &[V::Base, V::PerLevel], &[])
            }
            Self::EquipmentStatMultiplier => {
                EffectSchema::new(&[P::Category], &[V::Multiplier], &[])
            }
            Self::EquipmentCapacityAdditive => EffectSchema::new(&[P::Count], &[], &[]),
            Self::SpellbookUnlock => EffectSchema::new(&[], &[], &[ArrayKey::SpellIds]),
            Self::SpellbookTierUnlock => EffectSchema::new(&[P::Tier], &[], &[]),
        }
    }
}
