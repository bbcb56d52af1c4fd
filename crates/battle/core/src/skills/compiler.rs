//! Folds decoded payloads into per-actor bundles.

use crate::effect::{
    CombatEffect, DamageEffect, DecodeError, EffectPayload, EquipmentSlotEffect,
    ExplorationEffect, MiscEffect, Modifier, ResurrectionEffect, RewardEffect, SpellEffect,
    SpellbookEffect, StatEffect, StatusModifierEffect, decode,
};
use crate::env::{BattleEnv, OracleError, SkillDefinition};
use crate::types::{PerAttribute, SkillId};

use super::bundle::*;
use super::channels::*;

/// What scaling effects resolve against. Captured once at compile time;
/// scaling is never re-evaluated mid-battle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScalingContext {
    pub level: u16,
    /// `None` makes attribute-scaled effects contribute nothing.
    pub attributes: Option<PerAttribute<i64>>,
}

impl ScalingContext {
    pub fn new(level: u16) -> Self {
        Self {
            level,
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: PerAttribute<i64>) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

/// Everything one actor's skills compile into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledSkills {
    pub battle: SkillEffects,
    pub stats: StatModifierSet,
    pub equipment: EquipmentSlotModifiers,
    pub spellbook: SpellbookAccess,
    pub reward: RewardScalars,
    pub exploration: ExplorationScalars,
    /// Rows that failed to decode and were compiled as no-ops.
    pub rejected: Vec<DecodeError>,
}

/// Compiles skill lists against master data.
#[derive(Clone, Copy, Debug)]
pub struct SkillCompiler<'a> {
    env: BattleEnv<'a>,
}

impl<'a> SkillCompiler<'a> {
    pub fn new(env: BattleEnv<'a>) -> Self {
        Self { env }
    }

    /// Resolves every skill id and folds its rows.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SkillNotFound` for the first id absent from master
    /// data. Malformed rows do not fail the compile; they land in
    /// [`CompiledSkills::rejected`].
    pub fn compile(
        &self,
        skills: &[SkillId],
        scaling: &ScalingContext,
    ) -> Result<CompiledSkills, OracleError> {
        let definitions = skills
            .iter()
            .map(|id| self.env.skill(*id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(compile_definitions(&definitions, scaling))
    }
}

/// Folds already-resolved skill definitions.
pub fn compile_definitions(skills: &[SkillDefinition], scaling: &ScalingContext) -> CompiledSkills {
    let mut compiled = CompiledSkills::default();
    for skill in skills {
        for (index, raw) in skill.effects.iter().enumerate() {
            let index = u16::try_from(index).unwrap_or(u16::MAX);
            match decode(skill.id, index, raw) {
                Ok(payload) => compiled.fold(payload, scaling),
                Err(err) => compiled.rejected.push(err),
            }
        }
    }
    compiled
}

impl CompiledSkills {
    fn fold(&mut self, payload: EffectPayload, scaling: &ScalingContext) {
        match payload {
            EffectPayload::Damage(effect) => fold_damage(&mut self.battle.damage, effect),
            EffectPayload::Combat(effect) => fold_combat(&mut self.battle.combat, effect),
            EffectPayload::Spell(effect) => fold_spell(&mut self.battle.spell, effect),
            EffectPayload::Status(effect) => fold_status(&mut self.battle.status, effect),
            EffectPayload::Resurrection(effect) => {
                fold_resurrection(&mut self.battle.resurrection, effect)
            }
            EffectPayload::Misc(effect) => fold_misc(&mut self.battle.misc, effect),
            EffectPayload::Stat(effect) => fold_stat(&mut self.stats, effect, scaling),
            EffectPayload::EquipmentSlot(effect) => match effect {
                EquipmentSlotEffect::Additive(count) => {
                    self.equipment.additive = self.equipment.additive.saturating_add(count.into())
                }
                EquipmentSlotEffect::Multiplier(m) => self.equipment.multiplier.scale(m),
                EquipmentSlotEffect::Halving => self.equipment.halving = true,
                EquipmentSlotEffect::Talent => self.equipment.talent = true,
            },
            EffectPayload::Spellbook(effect) => match effect {
                SpellbookEffect::Unlock(spells) => self.spellbook.unlocked.extend(spells),
                SpellbookEffect::TierUnlock(tier) => {
                    self.spellbook.max_tier = self.spellbook.max_tier.max(tier)
                }
            },
            EffectPayload::Reward(effect) => match effect {
                RewardEffect::Experience(m) => self.reward.experience.scale(m),
                RewardEffect::Gold(m) => self.reward.gold.scale(m),
                RewardEffect::DropRate(p) => self.reward.drop_rate.apply(Modifier::Percent(p)),
            },
            EffectPayload::Exploration(ExplorationEffect::Time(modifier)) => {
                self.exploration.time.apply(modifier)
            }
        }
    }
}

fn fold_damage(damage: &mut DamageModifiers, effect: DamageEffect) {
    match effect {
        DamageEffect::Dealt {
            damage_type,
            modifier,
        } => damage.dealt[damage_type].apply(modifier),
        DamageEffect::Taken {
            damage_type,
            modifier,
        } => damage.taken[damage_type].apply(modifier),
        DamageEffect::Critical(modifier) => damage.critical.apply(modifier),
        DamageEffect::CriticalTaken(m) => damage.critical_taken.scale(m),
        DamageEffect::Martial(modifier) => damage.martial.apply(modifier),
        DamageEffect::Penetration(p) => damage.penetration_percent += p,
        DamageEffect::HpThreshold {
            threshold_percent,
            multiplier,
        } => damage.hp_thresholds.push(HpThresholdRule {
            threshold_percent,
            multiplier,
        }),
        DamageEffect::LevelComparison {
            per_level_percent,
            cap_percent,
        } => {
            damage.level_reduction_per_level += per_level_percent;
            damage.level_reduction_cap = damage.level_reduction_cap.max(cap_percent);
        }
    }
}

fn fold_combat(combat: &mut CombatModifiers, effect: CombatEffect) {
    match effect {
        CombatEffect::ProcRate(modifier) => combat.proc_rate.apply(modifier),
        CombatEffect::ExtraAction { chance, count } => combat
            .extra_actions
            .push(ExtraActionGrant { chance, count }),
        CombatEffect::Reaction(rule) => combat.reactions.push(rule),
        CombatEffect::Barrier {
            damage_type,
            charges,
        } => combat.barriers.push(BarrierGrant {
            damage_type,
            charges,
        }),
        CombatEffect::Parry { chance } => combat.parry_chance += chance,
        CombatEffect::ShieldBlock { chance } => combat.block_chance += chance,
        CombatEffect::EnemyStatDebuff { stat, percent } => {
            combat.enemy_debuffs.push(StatDebuff { stat, percent })
        }
        CombatEffect::ActionOrder(m) => combat.action_order.scale(m),
        CombatEffect::ActionOrderShuffle => combat.shuffle_order = true,
        CombatEffect::FirstStrike => combat.first_strike = true,
        CombatEffect::MinHitScale(scale) => combat.min_hit_scale = max_option(combat.min_hit_scale, scale),
        CombatEffect::DodgeCap(cap) => combat.dodge_cap = max_option(combat.dodge_cap, cap),
        CombatEffect::CriticalRateMax(cap) => {
            combat.critical_cap = max_option(combat.critical_cap, cap)
        }
        CombatEffect::SpecialAttack { id, chance } => combat
            .special_attacks
            .push(SpecialAttackGrant { id, chance }),
        CombatEffect::ActionRate { choice, weight } => {
            *combat.action_rates.entry(choice).or_insert(0.0) += weight
        }
        CombatEffect::PartyHostile => combat.party_hostile = true,
        CombatEffect::PartyProtect => combat.party_protect = true,
    }
}

fn fold_spell(spell: &mut SpellModifiers, effect: SpellEffect) {
    match effect {
        SpellEffect::Power(modifier) => spell.power.apply(modifier),
        SpellEffect::Specific { spells, multiplier } => {
            for id in spells {
                spell.specific.entry(id).or_default().scale(multiplier);
            }
        }
        SpellEffect::HealingPower(m) => spell.healing.scale(m),
        SpellEffect::ChargeOverride {
            spell: id,
            charges,
        } => {
            let slot = spell.charge_overrides.entry(id).or_insert(0);
            *slot = (*slot).max(charges);
        }
        SpellEffect::ChargeRecovery { spells, chance } => spell
            .charge_recovery
            .push(ChargeRecoveryRule { spells, chance }),
    }
}

fn fold_status(status: &mut StatusModifiers, effect: StatusModifierEffect) {
    match effect {
        StatusModifierEffect::Susceptibility {
            status: id,
            modifier,
        } => status.susceptibility.entry(id).or_default().apply(modifier),
        StatusModifierEffect::Immunity(id) => {
            status.immunities.insert(id);
        }
        StatusModifierEffect::Infliction { status: id, chance } => status
            .inflictions
            .push(StatusInfliction { status: id, chance }),
        StatusModifierEffect::TimedBuff(trigger) => status.timed_buffs.push(trigger),
    }
}

fn fold_resurrection(resurrection: &mut ResurrectionModifiers, effect: ResurrectionEffect) {
    match effect {
        ResurrectionEffect::Rescue { chance, hp_scale } => resurrection
            .rescue
            .push(ChanceRevive { chance, hp_scale }),
        ResurrectionEffect::Active { chance, hp_scale } => resurrection
            .active
            .push(ChanceRevive { chance, hp_scale }),
        ResurrectionEffect::Forced { hp_scale } => resurrection.forced.push(hp_scale),
        ResurrectionEffect::Vitalize { hp_scale } => {
            resurrection.vitalize = Some(resurrection.vitalize.map_or(hp_scale, |v| v.max(hp_scale)))
        }
        ResurrectionEffect::Necromancer { interval, hp_scale } => resurrection
            .necromancer
            .push(IntervalRevive { interval, hp_scale }),
        ResurrectionEffect::Sacrifice { interval } => {
            resurrection.sacrifice_intervals.push(interval)
        }
    }
}

fn fold_misc(misc: &mut MiscModifiers, effect: MiscEffect) {
    match effect {
        MiscEffect::TargetingWeight(weight) => misc.targeting_weight.scale(weight),
        MiscEffect::RowProfile(profile) => {
            misc.row_profile = Some(misc.row_profile.map_or(profile, |p| p.max(profile)))
        }
        MiscEffect::Absorption(p) => misc.absorption_percent += p,
        MiscEffect::RetreatAtTurn(turn) => {
            misc.retreat_at_turn = Some(misc.retreat_at_turn.map_or(turn, |t| t.min(turn)))
        }
        MiscEffect::Runaway {
            threshold_percent,
            chance,
        } => misc.runaway.push(RunawayRule {
            threshold_percent,
            chance,
        }),
        MiscEffect::DegradationRepair { chance } => misc.degradation_repair_chance += chance,
        MiscEffect::CoverRowsBehind => misc.cover_rows_behind = true,
        MiscEffect::EndOfTurnHeal(p) => misc.end_of_turn_heal_percent += p,
        MiscEffect::EndOfTurnHpDelta(p) => misc.end_of_turn_hp_delta_percent += p,
    }
}

fn fold_stat(stats: &mut StatModifierSet, effect: StatEffect, scaling: &ScalingContext) {
    let level = f64::from(scaling.level);
    match effect {
        StatEffect::Additive { stat, amount } => stats.additive[stat] += amount,
        StatEffect::Scale { stat, modifier } => stats.multiplier[stat].apply(modifier),
        StatEffect::FixedToOne(stat) => stats.fixed_to_one[stat] = true,
        StatEffect::ConversionPercent {
            source,
            target,
            percent,
        } => stats.conversions.push(StatConversion::Percent {
            source,
            target,
            percent,
        }),
        StatEffect::ConversionLinear {
            source,
            target,
            per_unit,
            unit,
        } => stats.conversions.push(StatConversion::Linear {
            source,
            target,
            per_unit,
            unit,
        }),
        StatEffect::AttributeAdditive { attribute, amount } => {
            stats.attributes[attribute] += amount
        }
        StatEffect::Talent(stat) => stats.multiplier[stat].scale(StatModifierSet::TALENT),
        StatEffect::Incompetence(stat) => {
            stats.multiplier[stat].scale(StatModifierSet::INCOMPETENCE)
        }
        StatEffect::PercentPerLevel { stat, per_level } => {
            stats.multiplier[stat].apply(Modifier::Percent(level * per_level))
        }
        StatEffect::PercentFromAttribute {
            stat,
            attribute,
            per_point,
        } => {
            if let Some(attributes) = scaling.attributes {
                let points = attributes[attribute] as f64;
                stats.multiplier[stat].apply(Modifier::Percent(points * per_point));
            }
        }
        StatEffect::LevelMultiplier {
            stat,
            base,
            per_level,
        } => stats.multiplier[stat].scale(base + per_level * level),
        StatEffect::Growth(m) => stats.growth.scale(m),
        StatEffect::EquipmentCategory {
            category,
            multiplier,
        } => stats.equipment.entry(category).or_default().scale(multiplier),
    }
}

fn max_option(current: Option<f64>, candidate: f64) -> Option<f64> {
    Some(current.map_or(candidate, |c| c.max(candidate)))
}
