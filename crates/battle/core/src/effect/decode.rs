//! Raw row → typed payload.

use crate::types::{
    ActionChoice, Attribute, BuffKind, CombatStat, DamageType, EquipmentCategory, HpScale,
    ReactionTrigger, RowProfile, SkillId, SpecialAttackId, SpellId, StatusId,
};

use super::error::{DecodeError, DecodeFailure};
use super::keys::{ArrayKey, ParamKey, ValueKey};
use super::kind::{EffectSchema, EffectType};
use super::payload::*;
use super::raw::RawEffect;

/// Conversion from an integer parameter into its typed domain.
trait FromParam: Sized {
    fn from_param(raw: i64) -> Option<Self>;
}

macro_rules! from_param_repr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(raw: i64) -> Option<Self> {
                    u8::try_from(raw).ok().and_then(<$ty>::from_repr)
                }
            }
        )*
    };
}

from_param_repr!(
    DamageType,
    CombatStat,
    Attribute,
    ReactionTrigger,
    ActionChoice,
    EquipmentCategory,
    HpScale,
    RowProfile,
    BuffKind,
);

macro_rules! from_param_id {
    ($($ty:ident),* $(,)?) => {
        $(
            impl FromParam for $ty {
                fn from_param(raw: i64) -> Option<Self> {
                    u8::try_from(raw).ok().map($ty)
                }
            }
        )*
    };
}

from_param_id!(StatusId, SpellId, SpecialAttackId);

impl FromParam for u8 {
    fn from_param(raw: i64) -> Option<Self> {
        u8::try_from(raw).ok()
    }
}

impl FromParam for u16 {
    fn from_param(raw: i64) -> Option<Self> {
        u16::try_from(raw).ok()
    }
}

struct RowReader<'a> {
    raw: &'a RawEffect,
}

impl RowReader<'_> {
    fn param<T: FromParam>(&self, key: ParamKey) -> Result<T, DecodeFailure> {
        self.optional_param(key)?
            .ok_or(DecodeFailure::MissingParameter(key))
    }

    fn optional_param<T: FromParam>(&self, key: ParamKey) -> Result<Option<T>, DecodeFailure> {
        let Some(&raw) = self.raw.parameters.get(&key) else {
            return Ok(None);
        };
        key.accepts(raw)
            .then(|| T::from_param(raw))
            .flatten()
            .map(Some)
            .ok_or(DecodeFailure::ParameterOutOfDomain { key, raw })
    }

    fn value(&self, key: ValueKey) -> Result<f64, DecodeFailure> {
        self.optional_value(key)?
            .ok_or(DecodeFailure::MissingValue(key))
    }

    fn optional_value(&self, key: ValueKey) -> Result<Option<f64>, DecodeFailure> {
        match self.raw.values.get(&key) {
            None => Ok(None),
            Some(&raw) if key.accepts(raw) => Ok(Some(raw)),
            Some(&raw) => Err(DecodeFailure::ValueOutOfDomain { key, raw }),
        }
    }

    fn array<T: FromParam>(&self, key: ArrayKey) -> Result<Vec<T>, DecodeFailure> {
        let items = self
            .raw
            .arrays
            .get(&key)
            .ok_or(DecodeFailure::MissingArray(key))?;
        Self::convert_array(key, items)
    }

    /// Absent arrays read as empty.
    fn optional_array<T: FromParam>(&self, key: ArrayKey) -> Result<Vec<T>, DecodeFailure> {
        match self.raw.arrays.get(&key) {
            Some(items) => Self::convert_array(key, items),
            None => Ok(Vec::new()),
        }
    }

    fn convert_array<T: FromParam>(key: ArrayKey, items: &[i64]) -> Result<Vec<T>, DecodeFailure> {
        items
            .iter()
            .enumerate()
            .map(|(index, &raw)| {
                T::from_param(raw).ok_or(DecodeFailure::ArrayElementOutOfDomain { key, index, raw })
            })
            .collect()
    }

    fn percent_or_multiplier(&self, ty: EffectType) -> Result<Modifier, DecodeFailure> {
        if ty.schema().values.contains(&ValueKey::Percent) {
            self.value(ValueKey::Percent).map(Modifier::Percent)
        } else {
            self.value(ValueKey::Multiplier).map(Modifier::Multiplier)
        }
    }
}

fn check_presence(schema: EffectSchema, raw: &RawEffect) -> Result<(), DecodeFailure> {
    if let Some(key) = schema
        .params
        .iter()
        .find(|key| !raw.parameters.contains_key(key))
    {
        return Err(DecodeFailure::MissingParameter(*key));
    }
    if let Some(key) = schema.values.iter().find(|key| !raw.values.contains_key(key)) {
        return Err(DecodeFailure::MissingValue(*key));
    }
    if let Some(key) = schema.arrays.iter().find(|key| !raw.arrays.contains_key(key)) {
        return Err(DecodeFailure::MissingArray(*key));
    }
    Ok(())
}

/// Decodes one effect row of `skill`.
///
/// A failure names the skill, the row index and the offending field. The
/// caller decides what a failure means; the compiler drops the row and keeps
/// going.
pub fn decode(
    skill: SkillId,
    effect_index: u16,
    raw: &RawEffect,
) -> Result<EffectPayload, DecodeError> {
    decode_row(raw).map_err(|reason| DecodeError {
        skill,
        effect_index,
        effect_type: raw.effect_type,
        reason,
    })
}

fn decode_row(raw: &RawEffect) -> Result<EffectPayload, DecodeFailure> {
    use EffectType as T;
    use ParamKey as P;
    use ValueKey as V;

    let ty = raw.effect_type;
    check_presence(ty.schema(), raw)?;
    let r = RowReader { raw };

    let payload = match ty {
        // ----- damage -----
        T::DamageDealtPercent | T::DamageDealtMultiplier => {
            EffectPayload::Damage(DamageEffect::Dealt {
                damage_type: r.param(P::DamageType)?,
                modifier: r.percent_or_multiplier(ty)?,
            })
        }
        T::DamageTakenPercent | T::DamageTakenMultiplier => {
            EffectPayload::Damage(DamageEffect::Taken {
                damage_type: r.param(P::DamageType)?,
                modifier: r.percent_or_multiplier(ty)?,
            })
        }
        T::CriticalDamagePercent | T::CriticalDamageMultiplier => {
            EffectPayload::Damage(DamageEffect::Critical(r.percent_or_multiplier(ty)?))
        }
        T::CriticalDamageTakenMultiplier => {
            EffectPayload::Damage(DamageEffect::CriticalTaken(r.value(V::Multiplier)?))
        }
        T::MartialPercent | T::MartialMultiplier => {
            EffectPayload::Damage(DamageEffect::Martial(r.percent_or_multiplier(ty)?))
        }
        T::DefensePenetration => {
            EffectPayload::Damage(DamageEffect::Penetration(r.value(V::Percent)?))
        }
        T::HpThresholdMultiplier => EffectPayload::Damage(DamageEffect::HpThreshold {
            threshold_percent: r.value(V::Threshold)?,
            multiplier: r.value(V::Multiplier)?,
        }),
        T::LevelComparisonDamageTaken => EffectPayload::Damage(DamageEffect::LevelComparison {
            per_level_percent: r.value(V::PerLevel)?,
            cap_percent: r.value(V::Cap)?,
        }),

        // ----- combat -----
        T::ProcRatePercent | T::ProcRateMultiplier => {
            EffectPayload::Combat(CombatEffect::ProcRate(r.percent_or_multiplier(ty)?))
        }
        T::ExtraAction => EffectPayload::Combat(CombatEffect::ExtraAction {
            chance: r.value(V::Chance)?,
            count: r.param(P::Count)?,
        }),
        T::CounterAttack | T::FollowUpAttack | T::Retaliation | T::Reaction => {
            let trigger = match ty {
                T::CounterAttack => ReactionTrigger::Damaged,
                T::FollowUpAttack => ReactionTrigger::AllyAttacked,
                T::Retaliation => ReactionTrigger::AllyDefeated,
                _ => r.param(P::Trigger)?,
            };
            EffectPayload::Combat(CombatEffect::Reaction(ReactionRule {
                trigger,
                damage_type: r.optional_param(P::DamageType)?,
                chance: r.value(V::Chance)?,
                attack_ratio: r
                    .optional_value(V::Ratio)?
                    .unwrap_or(ReactionRule::default_ratio(trigger)),
            }))
        }
        T::Barrier => EffectPayload::Combat(CombatEffect::Barrier {
            damage_type: r.param(P::DamageType)?,
            charges: r.param(P::Count)?,
        }),
        T::Parry => EffectPayload::Combat(CombatEffect::Parry {
            chance: r.value(V::Chance)?,
        }),
        T::ShieldBlock => EffectPayload::Combat(CombatEffect::ShieldBlock {
            chance: r.value(V::Chance)?,
        }),
        T::EnemyStatDebuff => EffectPayload::Combat(CombatEffect::EnemyStatDebuff {
            stat: r.param(P::Stat)?,
            percent: r.value(V::Percent)?,
        }),
        T::ActionOrderMultiplier => {
            EffectPayload::Combat(CombatEffect::ActionOrder(r.value(V::Multiplier)?))
        }
        T::ActionOrderShuffle => EffectPayload::Combat(CombatEffect::ActionOrderShuffle),
        T::FirstStrike => EffectPayload::Combat(CombatEffect::FirstStrike),
        T::MinHitScale => EffectPayload::Combat(CombatEffect::MinHitScale(r.value(V::Multiplier)?)),
        T::DodgeCap => EffectPayload::Combat(CombatEffect::DodgeCap(r.value(V::Cap)?)),
        T::CriticalRateMax => {
            EffectPayload::Combat(CombatEffect::CriticalRateMax(r.value(V::Cap)?))
        }
        T::SpecialAttack => EffectPayload::Combat(CombatEffect::SpecialAttack {
            id: r.param(P::SpecialAttackId)?,
            chance: r.value(V::Chance)?,
        }),
        T::ActionRate => EffectPayload::Combat(CombatEffect::ActionRate {
            choice: r.param(P::Choice)?,
            weight: r.value(V::Weight)?,
        }),
        T::PartyHostile => EffectPayload::Combat(CombatEffect::PartyHostile),
        T::PartyProtect => EffectPayload::Combat(CombatEffect::PartyProtect),

        // ----- spell -----
        T::SpellPowerPercent | T::SpellPowerMultiplier => {
            EffectPayload::Spell(SpellEffect::Power(r.percent_or_multiplier(ty)?))
        }
        T::SpellSpecificMultiplier => EffectPayload::Spell(SpellEffect::Specific {
            spells: r.array(ArrayKey::SpellIds)?,
            multiplier: r.value(V::Multiplier)?,
        }),
        T::HealingPowerMultiplier => {
            EffectPayload::Spell(SpellEffect::HealingPower(r.value(V::Multiplier)?))
        }
        T::SpellChargeOverride => EffectPayload::Spell(SpellEffect::ChargeOverride {
            spell: r.param(P::SpellId)?,
            charges: r.param(P::Count)?,
        }),
        T::SpellChargeRecovery => EffectPayload::Spell(SpellEffect::ChargeRecovery {
            spells: r.optional_array(ArrayKey::SpellIds)?,
            chance: r.value(V::Chance)?,
        }),

        // ----- status -----
        T::StatusSusceptibilityPercent | T::StatusSusceptibilityMultiplier => {
            EffectPayload::Status(StatusModifierEffect::Susceptibility {
                status: r.param(P::StatusId)?,
                modifier: r.percent_or_multiplier(ty)?,
            })
        }
        T::StatusImmunity => {
            EffectPayload::Status(StatusModifierEffect::Immunity(r.param(P::StatusId)?))
        }
        T::StatusInfliction => EffectPayload::Status(StatusModifierEffect::Infliction {
            status: r.param(P::StatusId)?,
            chance: r.value(V::Chance)?,
        }),
        T::TimedBuff => EffectPayload::Status(StatusModifierEffect::TimedBuff(TimedBuffTrigger {
            kind: r.param(P::BuffKind)?,
            percent: r.value(V::Percent)?,
            start_turn: r.param(P::Turn)?,
            interval: r.optional_param(P::Interval)?,
            duration: r.param(P::Duration)?,
        })),

        // ----- resurrection -----
        T::Rescue => EffectPayload::Resurrection(ResurrectionEffect::Rescue {
            chance: r.value(V::Chance)?,
            hp_scale: r.param(P::HpScale)?,
        }),
        T::ResurrectionActive => EffectPayload::Resurrection(ResurrectionEffect::Active {
            chance: r.value(V::Chance)?,
            hp_scale: r.param(P::HpScale)?,
        }),
        T::ResurrectionForced => EffectPayload::Resurrection(ResurrectionEffect::Forced {
            hp_scale: r.param(P::HpScale)?,
        }),
        T::ResurrectionVitalize => EffectPayload::Resurrection(ResurrectionEffect::Vitalize {
            hp_scale: r.param(P::HpScale)?,
        }),
        T::ResurrectionNecromancer => {
            EffectPayload::Resurrection(ResurrectionEffect::Necromancer {
                interval: r.param(P::Interval)?,
                hp_scale: r.param(P::HpScale)?,
            })
        }
        T::ResurrectionSacrifice => EffectPayload::Resurrection(ResurrectionEffect::Sacrifice {
            interval: r.param(P::Interval)?,
        }),

        // ----- misc -----
        T::TargetingWeight => EffectPayload::Misc(MiscEffect::TargetingWeight(r.value(V::Weight)?)),
        T::RowProfile => EffectPayload::Misc(MiscEffect::RowProfile(r.param(P::RowProfile)?)),
        T::Absorption => EffectPayload::Misc(MiscEffect::Absorption(r.value(V::Percent)?)),
        T::RetreatAtTurn => EffectPayload::Misc(MiscEffect::RetreatAtTurn(r.param(P::Turn)?)),
        T::Runaway => EffectPayload::Misc(MiscEffect::Runaway {
            threshold_percent: r.value(V::Threshold)?,
            chance: r.value(V::Chance)?,
        }),
        T::DegradationRepair => EffectPayload::Misc(MiscEffect::DegradationRepair {
            chance: r.value(V::Chance)?,
        }),
        T::CoverRowsBehind => EffectPayload::Misc(MiscEffect::CoverRowsBehind),
        T::EndOfTurnHeal => EffectPayload::Misc(MiscEffect::EndOfTurnHeal(r.value(V::Percent)?)),
        T::EndOfTurnHpDelta => {
            EffectPayload::Misc(MiscEffect::EndOfTurnHpDelta(r.value(V::Percent)?))
        }

        // ----- stat -----
        T::StatAdditive => EffectPayload::Stat(StatEffect::Additive {
            stat: r.param(P::Stat)?,
            amount: r.value(V::Additive)?,
        }),
        T::StatPercent | T::StatMultiplier => EffectPayload::Stat(StatEffect::Scale {
            stat: r.param(P::Stat)?,
            modifier: r.percent_or_multiplier(ty)?,
        }),
        T::StatFixedToOne => EffectPayload::Stat(StatEffect::FixedToOne(r.param(P::Stat)?)),
        T::StatConversionPercent => EffectPayload::Stat(StatEffect::ConversionPercent {
            source: r.param(P::SourceStat)?,
            target: r.param(P::TargetStat)?,
            percent: r.value(V::Percent)?,
        }),
        T::StatConversionLinear => EffectPayload::Stat(StatEffect::ConversionLinear {
            source: r.param(P::SourceStat)?,
            target: r.param(P::TargetStat)?,
            per_unit: r.value(V::PerUnit)?,
            unit: r.value(V::Unit)?,
        }),
        T::AttributeAdditive => EffectPayload::Stat(StatEffect::AttributeAdditive {
            attribute: r.param(P::Attribute)?,
            amount: r.value(V::Additive)?,
        }),
        T::Talent => EffectPayload::Stat(StatEffect::Talent(r.param(P::Stat)?)),
        T::Incompetence => EffectPayload::Stat(StatEffect::Incompetence(r.param(P::Stat)?)),
        T::StatPercentPerLevel => EffectPayload::Stat(StatEffect::PercentPerLevel {
            stat: r.param(P::Stat)?,
            per_level: r.value(V::PerLevel)?,
        }),
        T::StatPercentFromAttribute => EffectPayload::Stat(StatEffect::PercentFromAttribute {
            stat: r.param(P::Stat)?,
            attribute: r.param(P::Attribute)?,
            per_point: r.value(V::PerPoint)?,
        }),
        T::StatLevelMultiplier => EffectPayload::Stat(StatEffect::LevelMultiplier {
            stat: r.param(P::Stat)?,
            base: r.value(V::Base)?,
            per_level: r.value(V::PerLevel)?,
        }),
        T::GrowthMultiplier => EffectPayload::Stat(StatEffect::Growth(r.value(V::Multiplier)?)),
        T::EquipmentStatMultiplier => EffectPayload::Stat(StatEffect::EquipmentCategory {
            category: r.param(P::Category)?,
            multiplier: r.value(V::Multiplier)?,
        }),

        // ----- equipment slots -----
        T::EquipmentCapacityAdditive => {
            EffectPayload::EquipmentSlot(EquipmentSlotEffect::Additive(r.param(P::Count)?))
        }
        T::EquipmentCapacityMultiplier => EffectPayload::EquipmentSlot(
            EquipmentSlotEffect::Multiplier(r.value(V::Multiplier)?),
        ),
        T::EquipmentCapacityHalving => EffectPayload::EquipmentSlot(EquipmentSlotEffect::Halving),
        T::EquipmentCapacityTalent => EffectPayload::EquipmentSlot(EquipmentSlotEffect::Talent),

        // ----- spellbook -----
        T::SpellbookUnlock => {
            EffectPayload::Spellbook(SpellbookEffect::Unlock(r.array(ArrayKey::SpellIds)?))
        }
        T::SpellbookTierUnlock => {
            EffectPayload::Spellbook(SpellbookEffect::TierUnlock(r.param(P::Tier)?))
        }

        // ----- reward -----
        T::ExperienceMultiplier => {
            EffectPayload::Reward(RewardEffect::Experience(r.value(V::Multiplier)?))
        }
        T::GoldMultiplier => EffectPayload::Reward(RewardEffect::Gold(r.value(V::Multiplier)?)),
        T::DropRatePercent => EffectPayload::Reward(RewardEffect::DropRate(r.value(V::Percent)?)),

        // ----- exploration -----
        T::ExplorationTimeMultiplier | T::ExplorationTimePercent => {
            EffectPayload::Exploration(ExplorationEffect::Time(r.percent_or_multiplier(ty)?))
        }
    };

    debug_assert_eq!(payload.family(), ty.family());
    Ok(payload)
}

#[cfg(test)]
pub(crate) mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::error::BattleCoreError;

    /// In-range sample for every parameter key.
    fn sample_param(key: ParamKey) -> i64 {
        match key {
            ParamKey::Turn | ParamKey::Interval | ParamKey::Count | ParamKey::Duration => 2,
            _ => 1,
        }
    }

    /// A row carrying every required field with an in-range value.
    pub(crate) fn complete_row(ty: EffectType) -> RawEffect {
        let schema = ty.schema();
        let mut raw = RawEffect::new(ty);
        for key in schema.params {
            raw.parameters.insert(*key, sample_param(*key));
        }
        for key in schema.values {
            raw.values.insert(*key, 1.0);
        }
        for key in schema.arrays {
            raw.arrays.insert(*key, vec![1, 2]);
        }
        raw
    }

    #[test]
    fn complete_rows_decode_for_every_type() {
        for ty in EffectType::iter() {
            let payload = decode(SkillId(1), 0, &complete_row(ty))
                .unwrap_or_else(|err| panic!("{ty}: {err}"));
            assert_eq!(payload.family(), ty.family(), "{ty}");
        }
    }

    #[test]
    fn every_missing_required_field_fails() {
        for ty in EffectType::iter() {
            let schema = ty.schema();
            for key in schema.params {
                let mut raw = complete_row(ty);
                raw.parameters.remove(key);
                let err = decode(SkillId(9), 3, &raw).expect_err("missing param must fail");
                assert_eq!(err.reason, DecodeFailure::MissingParameter(*key), "{ty}");
                assert_eq!((err.skill, err.effect_index), (SkillId(9), 3));
            }
            for key in schema.values {
                let mut raw = complete_row(ty);
                raw.values.remove(key);
                let err = decode(SkillId(9), 3, &raw).expect_err("missing value must fail");
                assert_eq!(err.reason, DecodeFailure::MissingValue(*key), "{ty}");
            }
            for key in schema.arrays {
                let mut raw = complete_row(ty);
                raw.arrays.remove(key);
                let err = decode(SkillId(9), 3, &raw).expect_err("missing array must fail");
                assert_eq!(err.reason, DecodeFailure::MissingArray(*key), "{ty}");
            }
        }
    }

    #[test]
    fn damage_type_outside_domain_is_rejected() {
        let raw = RawEffect::new(EffectType::DamageDealtPercent)
            .with_param(ParamKey::DamageType, 3)
            .with_value(ValueKey::Percent, 10.0);
        let err = decode(SkillId(4), 0, &raw).expect_err("damage type 3 is not a channel");
        assert_eq!(
            err.reason,
            DecodeFailure::ParameterOutOfDomain {
                key: ParamKey::DamageType,
                raw: 3
            }
        );
        assert_eq!(err.error_code(), "DECODE_PARAMETER_OUT_OF_DOMAIN");
    }

    #[test]
    fn chance_above_hundred_is_rejected() {
        let raw = RawEffect::new(EffectType::Parry).with_value(ValueKey::Chance, 150.0);
        let err = decode(SkillId(4), 1, &raw).expect_err("chance is a percent");
        assert!(matches!(
            err.reason,
            DecodeFailure::ValueOutOfDomain {
                key: ValueKey::Chance,
                ..
            }
        ));
    }

    #[test]
    fn counter_attack_defaults_to_thirty_percent_of_attacks() {
        let raw = RawEffect::new(EffectType::CounterAttack).with_value(ValueKey::Chance, 15.0);
        let payload = decode(SkillId(2), 0, &raw).expect("complete row");
        let EffectPayload::Combat(CombatEffect::Reaction(rule)) = payload else {
            panic!("counter attack decodes to a reaction");
        };
        assert_eq!(rule.trigger, ReactionTrigger::Damaged);
        assert_eq!(rule.attack_ratio, ReactionRule::COUNTER_RATIO);
        assert_eq!(rule.chance, 15.0);
    }

    #[test]
    fn bad_array_element_reports_its_index() {
        let raw = RawEffect::new(EffectType::SpellbookUnlock)
            .with_array(ArrayKey::SpellIds, vec![1, 2, 900]);
        let err = decode(SkillId(5), 0, &raw).expect_err("spell id 900 does not fit");
        assert_eq!(
            err.reason,
            DecodeFailure::ArrayElementOutOfDomain {
                key: ArrayKey::SpellIds,
                index: 2,
                raw: 900
            }
        );
    }
}
