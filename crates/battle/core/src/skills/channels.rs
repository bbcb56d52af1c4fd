//! Compiled bundles that never reach an in-battle actor.

use std::collections::{BTreeMap, BTreeSet};

use crate::env::SpellDefinition;
use crate::types::{CombatStat, EquipmentCategory, PerAttribute, PerStat, SpellId};

use super::product::ModifierProduct;

/// A stat-to-stat conversion, evaluated after the multiplicative stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatConversion {
    /// `target += source × percent / 100`
    Percent {
        source: CombatStat,
        target: CombatStat,
        percent: f64,
    },
    /// `target += trunc(source / unit) × per_unit`
    Linear {
        source: CombatStat,
        target: CombatStat,
        per_unit: f64,
        unit: f64,
    },
}

impl StatConversion {
    pub fn target(&self) -> CombatStat {
        match *self {
            Self::Percent { target, .. } | Self::Linear { target, .. } => target,
        }
    }

    /// Amount added to the target, truncated toward zero.
    pub fn contribution(&self, stats: &PerStat<i64>) -> i64 {
        match *self {
            Self::Percent {
                source, percent, ..
            } => (stats[source] as f64 * percent / 100.0) as i64,
            Self::Linear {
                source,
                per_unit,
                unit,
                ..
            } => ((stats[source] as f64 / unit) as i64 as f64 * per_unit) as i64,
        }
    }
}

/// Input of the stat calculator's modifier stages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatModifierSet {
    pub additive: PerStat<f64>,
    /// Plain percent/multiplier effects, scaling effects baked in, and
    /// talent (`×1.5`) / incompetence (`×0.5`).
    pub multiplier: PerStat<ModifierProduct>,
    pub conversions: Vec<StatConversion>,
    pub fixed_to_one: PerStat<bool>,
    pub attributes: PerAttribute<f64>,
    pub growth: ModifierProduct,
    pub equipment: BTreeMap<EquipmentCategory, ModifierProduct>,
}

impl StatModifierSet {
    pub const TALENT: f64 = 1.5;
    pub const INCOMPETENCE: f64 = 0.5;

    pub fn equipment_multiplier(&self, category: EquipmentCategory) -> f64 {
        self.equipment
            .get(&category)
            .copied()
            .unwrap_or_default()
            .value()
    }
}

/// Modifiers to how many equipment slots a character has.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EquipmentSlotModifiers {
    pub additive: u16,
    pub multiplier: ModifierProduct,
    pub halving: bool,
    pub talent: bool,
}

impl EquipmentSlotModifiers {
    /// Slot count from a base capacity. Additive slots apply first, then every
    /// multiplier; the result is truncated and never drops below one slot.
    pub fn capacity(&self, base: u8) -> u8 {
        let mut slots = f64::from(u16::from(base).saturating_add(self.additive));
        slots *= self.multiplier.value();
        if self.talent {
            slots *= StatModifierSet::TALENT;
        }
        if self.halving {
            slots *= 0.5;
        }
        (slots as i64).clamp(1, i64::from(u8::MAX)) as u8
    }
}

/// Which spells a character may learn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpellbookAccess {
    pub unlocked: BTreeSet<SpellId>,
    pub max_tier: u8,
}

impl SpellbookAccess {
    pub fn permits(&self, spell: &SpellDefinition) -> bool {
        self.unlocked.contains(&spell.id) || spell.tier <= self.max_tier
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardScalars {
    pub experience: ModifierProduct,
    pub gold: ModifierProduct,
    pub drop_rate: ModifierProduct,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExplorationScalars {
    pub time: ModifierProduct,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Modifier;

    #[test]
    fn capacity_applies_additive_before_multipliers() {
        let mut slots = EquipmentSlotModifiers {
            additive: 1,
            ..EquipmentSlotModifiers::default()
        };
        assert_eq!(slots.capacity(4), 5);
        slots.talent = true;
        assert_eq!(slots.capacity(4), 7);
        slots.halving = true;
        assert_eq!(slots.capacity(4), 3);
    }

    #[test]
    fn capacity_never_reaches_zero() {
        let mut slots = EquipmentSlotModifiers::default();
        slots.multiplier.apply(Modifier::Multiplier(0.0));
        assert_eq!(slots.capacity(6), 1);
    }

    #[test]
    fn linear_conversion_truncates_units() {
        let mut stats = PerStat::splat(0i64);
        stats[CombatStat::MagicalAttack] = 250;
        let conversion = StatConversion::Linear {
            source: CombatStat::MagicalAttack,
            target: CombatStat::MagicalHealing,
            per_unit: 3.0,
            unit: 100.0,
        };
        assert_eq!(conversion.contribution(&stats), 6);
    }
}
