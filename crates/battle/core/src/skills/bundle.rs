//! The in-battle modifier bundle.
//!
//! Built once per actor at battle start and only read afterwards. List-shaped
//! entries keep one element per granting effect; the engine evaluates each of
//! them independently whenever its trigger recurs.

use std::collections::{BTreeMap, BTreeSet};

use crate::effect::{ReactionRule, TimedBuffTrigger};
use crate::types::{
    ActionChoice, CombatStat, DamageType, HpScale, PerDamageType, RowProfile, SpecialAttackId,
    SpellId, StatusId,
};

use super::product::ModifierProduct;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillEffects {
    pub damage: DamageModifiers,
    pub combat: CombatModifiers,
    pub spell: SpellModifiers,
    pub status: StatusModifiers,
    pub resurrection: ResurrectionModifiers,
    pub misc: MiscModifiers,
}

// ============================================================================
// damage
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HpThresholdRule {
    pub threshold_percent: f64,
    pub multiplier: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DamageModifiers {
    pub dealt: PerDamageType<ModifierProduct>,
    pub taken: PerDamageType<ModifierProduct>,
    pub critical: ModifierProduct,
    pub critical_taken: ModifierProduct,
    pub martial: ModifierProduct,
    /// Summed; consumers clamp to `[0, 100]`.
    pub penetration_percent: f64,
    pub hp_thresholds: Vec<HpThresholdRule>,
    /// Summed per-level reduction of damage taken.
    pub level_reduction_per_level: f64,
    /// Largest cap granted.
    pub level_reduction_cap: f64,
}

impl DamageModifiers {
    /// Product of every threshold rule the target's HP currently satisfies.
    pub fn threshold_multiplier(&self, hp_percent: f64) -> f64 {
        self.hp_thresholds
            .iter()
            .filter(|rule| hp_percent <= rule.threshold_percent)
            .map(|rule| rule.multiplier)
            .product()
    }

    /// Damage-taken factor when the holder outranks the attacker by `levels`.
    pub fn level_reduction(&self, levels: i32) -> f64 {
        if levels <= 0 || self.level_reduction_per_level <= 0.0 {
            return 1.0;
        }
        let percent = (f64::from(levels) * self.level_reduction_per_level)
            .min(self.level_reduction_cap)
            .clamp(0.0, 100.0);
        1.0 - percent / 100.0
    }
}

// ============================================================================
// combat
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtraActionGrant {
    pub chance: f64,
    pub count: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrierGrant {
    pub damage_type: DamageType,
    pub charges: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatDebuff {
    pub stat: CombatStat,
    pub percent: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpecialAttackGrant {
    pub id: SpecialAttackId,
    pub chance: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatModifiers {
    /// Scales every proc chance the holder rolls (reactions, specials, inflictions).
    pub proc_rate: ModifierProduct,
    pub extra_actions: Vec<ExtraActionGrant>,
    pub reactions: Vec<ReactionRule>,
    pub barriers: Vec<BarrierGrant>,
    pub parry_chance: f64,
    pub block_chance: f64,
    pub enemy_debuffs: Vec<StatDebuff>,
    pub action_order: ModifierProduct,
    pub shuffle_order: bool,
    pub first_strike: bool,
    /// Largest scale granted; `None` keeps the configured floor.
    pub min_hit_scale: Option<f64>,
    /// Largest evasion cap granted.
    pub dodge_cap: Option<f64>,
    /// Largest critical-chance cap granted.
    pub critical_cap: Option<f64>,
    pub special_attacks: Vec<SpecialAttackGrant>,
    /// Added on top of the actor's base action weights.
    pub action_rates: BTreeMap<ActionChoice, f64>,
    pub party_hostile: bool,
    pub party_protect: bool,
}

impl CombatModifiers {
    /// Barrier charges per damage type at battle start.
    pub fn barrier_charges(&self) -> PerDamageType<u16> {
        let mut charges = PerDamageType::splat(0u16);
        for grant in &self.barriers {
            charges[grant.damage_type] =
                charges[grant.damage_type].saturating_add(u16::from(grant.charges));
        }
        charges
    }

    /// A chance after the holder's proc-rate scaling.
    pub fn proc_chance(&self, chance: f64) -> f64 {
        chance * self.proc_rate.value()
    }
}

// ============================================================================
// spell
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct ChargeRecoveryRule {
    /// Empty means every known spell.
    pub spells: Vec<SpellId>,
    pub chance: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpellModifiers {
    pub power: ModifierProduct,
    pub specific: BTreeMap<SpellId, ModifierProduct>,
    pub healing: ModifierProduct,
    /// Largest override per spell.
    pub charge_overrides: BTreeMap<SpellId, u8>,
    pub charge_recovery: Vec<ChargeRecoveryRule>,
}

impl SpellModifiers {
    pub fn power_for(&self, spell: SpellId) -> f64 {
        let specific = self
            .specific
            .get(&spell)
            .copied()
            .unwrap_or_default()
            .value();
        self.power.value() * specific
    }
}

// ============================================================================
// status
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusInfliction {
    pub status: StatusId,
    pub chance: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusModifiers {
    /// Multiplies the chance of a status landing on the holder.
    pub susceptibility: BTreeMap<StatusId, ModifierProduct>,
    pub immunities: BTreeSet<StatusId>,
    pub inflictions: Vec<StatusInfliction>,
    pub timed_buffs: Vec<TimedBuffTrigger>,
}

impl StatusModifiers {
    /// Chance that `status` lands on the holder, given the attacker's base chance.
    pub fn landing_chance(&self, status: StatusId, chance: f64) -> f64 {
        if self.immunities.contains(&status) {
            return 0.0;
        }
        let scale = self
            .susceptibility
            .get(&status)
            .copied()
            .unwrap_or_default()
            .value();
        chance * scale
    }
}

// ============================================================================
// resurrection
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChanceRevive {
    pub chance: f64,
    pub hp_scale: HpScale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalRevive {
    pub interval: u16,
    pub hp_scale: HpScale,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResurrectionModifiers {
    pub rescue: Vec<ChanceRevive>,
    pub active: Vec<ChanceRevive>,
    pub forced: Vec<HpScale>,
    pub vitalize: Option<HpScale>,
    pub necromancer: Vec<IntervalRevive>,
    pub sacrifice_intervals: Vec<u16>,
}

impl ResurrectionModifiers {
    /// Applies the holder's vitalize floor to a revive scale.
    pub fn revive_scale(&self, scale: HpScale) -> HpScale {
        match self.vitalize {
            Some(floor) => scale.max(floor),
            None => scale,
        }
    }
}

// ============================================================================
// misc
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunawayRule {
    pub threshold_percent: f64,
    pub chance: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MiscModifiers {
    pub targeting_weight: ModifierProduct,
    /// Most permissive profile granted.
    pub row_profile: Option<RowProfile>,
    pub absorption_percent: f64,
    /// Earliest retreat turn granted.
    pub retreat_at_turn: Option<u16>,
    pub runaway: Vec<RunawayRule>,
    pub degradation_repair_chance: f64,
    pub cover_rows_behind: bool,
    pub end_of_turn_heal_percent: f64,
    pub end_of_turn_hp_delta_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barriers_sum_per_damage_type() {
        let combat = CombatModifiers {
            barriers: vec![
                BarrierGrant {
                    damage_type: DamageType::Physical,
                    charges: 2,
                },
                BarrierGrant {
                    damage_type: DamageType::Magical,
                    charges: 1,
                },
                BarrierGrant {
                    damage_type: DamageType::Physical,
                    charges: 1,
                },
            ],
            ..CombatModifiers::default()
        };
        let charges = combat.barrier_charges();
        assert_eq!(charges[DamageType::Physical], 3);
        assert_eq!(charges[DamageType::Magical], 1);
        assert_eq!(charges[DamageType::Breath], 0);
    }

    #[test]
    fn level_reduction_is_capped() {
        let damage = DamageModifiers {
            level_reduction_per_level: 5.0,
            level_reduction_cap: 30.0,
            ..DamageModifiers::default()
        };
        assert_eq!(damage.level_reduction(-3), 1.0);
        assert!((damage.level_reduction(2) - 0.9).abs() < 1e-12);
        assert!((damage.level_reduction(20) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn immunity_beats_susceptibility() {
        let mut status = StatusModifiers::default();
        status.immunities.insert(StatusId(3));
        status
            .susceptibility
            .insert(StatusId(3), ModifierProduct::default());
        assert_eq!(status.landing_chance(StatusId(3), 80.0), 0.0);
        assert_eq!(status.landing_chance(StatusId(4), 80.0), 80.0);
    }

    #[test]
    fn vitalize_raises_low_revives_only() {
        let resurrection = ResurrectionModifiers {
            vitalize: Some(HpScale::MaxHp25Percent),
            ..ResurrectionModifiers::default()
        };
        assert_eq!(
            resurrection.revive_scale(HpScale::MaxHp5Percent),
            HpScale::MaxHp25Percent
        );
        assert_eq!(resurrection.revive_scale(HpScale::Full), HpScale::Full);
    }
}
