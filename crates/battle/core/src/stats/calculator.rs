use strum::IntoEnumIterator;

use crate::env::{ItemDefinition, JobDefinition, RaceDefinition};
use crate::skills::StatModifierSet;
use crate::types::{Attribute, CombatStat, PerAttribute, PerStat};

use super::base;

/// Battle-ready stat block of one actor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSnapshot {
    pub attributes: PerAttribute<i64>,
    pub stats: PerStat<i64>,
}

impl CombatSnapshot {
    pub fn get(&self, stat: CombatStat) -> i64 {
        self.stats[stat]
    }

    pub fn attribute(&self, attribute: Attribute) -> i64 {
        self.attributes[attribute]
    }

    pub fn max_hp(&self) -> u32 {
        self.stats[CombatStat::MaxHp].clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn attack_count(&self) -> u32 {
        self.stats[CombatStat::AttackCount].clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Everything the calculator reads. Nothing here is mutated.
#[derive(Clone, Copy, Debug)]
pub struct StatInputs<'a> {
    pub level: u16,
    pub race: &'a RaceDefinition,
    pub job: Option<&'a JobDefinition>,
    pub items: &'a [ItemDefinition],
    pub modifiers: &'a StatModifierSet,
}

/// Attributes from race and equipment, before skill bonuses.
///
/// This is the snapshot scaling effects resolve against.
pub fn base_attributes(race: &RaceDefinition, items: &[ItemDefinition]) -> PerAttribute<i64> {
    let mut attributes = PerAttribute::splat(0i64);
    for (attribute, value) in &race.attributes {
        attributes[*attribute] += value;
    }
    for item in items {
        for (attribute, value) in &item.attributes {
            attributes[*attribute] += value;
        }
    }
    attributes
}

/// Runs the stat pipeline.
///
/// Stages, in order: base stats, additive, multiplicative, conversions
/// (reading the post-multiplicative block), floors, fixed-to-one. Every
/// product is truncated toward zero before the next stage reads it.
pub fn calculate(inputs: &StatInputs<'_>) -> CombatSnapshot {
    let modifiers = inputs.modifiers;

    let mut attributes = base_attributes(inputs.race, inputs.items);
    for (attribute, bonus) in modifiers.attributes.iter() {
        attributes[attribute] += *bonus as i64;
    }

    let mut stats = base_stats(inputs, &attributes);

    for (stat, amount) in modifiers.additive.iter() {
        stats[stat] += *amount as i64;
    }

    for (stat, product) in modifiers.multiplier.iter() {
        stats[stat] = (stats[stat] as f64 * product.value()) as i64;
    }

    let frozen = stats;
    for conversion in &modifiers.conversions {
        stats[conversion.target()] += conversion.contribution(&frozen);
    }

    for stat in CombatStat::iter() {
        let floor = match stat {
            CombatStat::MaxHp | CombatStat::AttackCount => 1,
            _ => 0,
        };
        stats[stat] = stats[stat].max(floor);
        if modifiers.fixed_to_one[stat] {
            stats[stat] = 1;
        }
    }

    CombatSnapshot { attributes, stats }
}

fn base_stats(inputs: &StatInputs<'_>, attributes: &PerAttribute<i64>) -> PerStat<i64> {
    let growth = inputs.modifiers.growth.value();
    let mut stats = PerStat::splat(0i64);
    for stat in CombatStat::iter() {
        let (attribute_term, growth_term) = base::terms(stat, attributes, inputs.level);
        let coefficient = inputs.job.map_or(1.0, |job| job.coefficient(stat));
        let grown = attribute_term + (growth_term * growth) as i64;
        stats[stat] = (grown as f64 * coefficient) as i64;
    }
    for item in inputs.items {
        let multiplier = inputs.modifiers.equipment_multiplier(item.category);
        for (stat, value) in &item.stats {
            stats[*stat] += (*value as f64 * multiplier) as i64;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::effect::Modifier;
    use crate::skills::StatConversion;
    use crate::types::{EquipmentCategory, ItemId, JobId, RaceId};

    fn race() -> RaceDefinition {
        RaceDefinition {
            id: RaceId(1),
            attributes: Attribute::iter().map(|a| (a, 10)).collect(),
            skills: Vec::new(),
        }
    }

    fn sword(attack: i64) -> ItemDefinition {
        ItemDefinition {
            id: ItemId(1),
            category: EquipmentCategory::Sword,
            stats: BTreeMap::from([(CombatStat::PhysicalAttack, attack)]),
            attributes: BTreeMap::new(),
            skills: Vec::new(),
        }
    }

    fn run(level: u16, items: &[ItemDefinition], modifiers: &StatModifierSet) -> CombatSnapshot {
        let race = race();
        calculate(&StatInputs {
            level,
            race: &race,
            job: None,
            items,
            modifiers,
        })
    }

    #[test]
    fn unmodified_block_follows_base_formulas() {
        let snapshot = run(1, &[], &StatModifierSet::default());
        // vit*10 + str*2 + lv*(8 + vit/4)
        assert_eq!(snapshot.get(CombatStat::MaxHp), 100 + 20 + 10);
        // str*2 + agi/2 + lv*2
        assert_eq!(snapshot.get(CombatStat::PhysicalAttack), 20 + 5 + 2);
        assert_eq!(snapshot.attack_count(), 1);
    }

    #[test]
    fn additive_applies_before_multiplier() {
        let mut modifiers = StatModifierSet::default();
        modifiers.additive[CombatStat::PhysicalAttack] = 3.0;
        modifiers.multiplier[CombatStat::PhysicalAttack].apply(Modifier::Percent(50.0));
        let snapshot = run(1, &[], &modifiers);
        // (27 + 3) * 1.5
        assert_eq!(snapshot.get(CombatStat::PhysicalAttack), 45);
    }

    #[test]
    fn products_truncate_toward_zero() {
        let mut modifiers = StatModifierSet::default();
        modifiers.multiplier[CombatStat::PhysicalAttack].scale(1.1);
        let snapshot = run(1, &[], &modifiers);
        // 27 * 1.1 = 29.7
        assert_eq!(snapshot.get(CombatStat::PhysicalAttack), 29);
    }

    #[test]
    fn conversions_read_post_multiplier_sources() {
        let mut modifiers = StatModifierSet::default();
        modifiers.multiplier[CombatStat::PhysicalAttack].scale(2.0);
        modifiers.conversions.push(StatConversion::Percent {
            source: CombatStat::PhysicalAttack,
            target: CombatStat::AdditionalDamage,
            percent: 50.0,
        });
        let snapshot = run(1, &[], &modifiers);
        // additional damage: str/2 + lv = 6, plus 54 * 0.5
        assert_eq!(snapshot.get(CombatStat::AdditionalDamage), 6 + 27);
    }

    #[test]
    fn fixed_to_one_ignores_every_other_modifier() {
        let mut modifiers = StatModifierSet::default();
        modifiers.additive[CombatStat::AttackCount] = 12.0;
        modifiers.multiplier[CombatStat::AttackCount].scale(3.0);
        modifiers.conversions.push(StatConversion::Percent {
            source: CombatStat::PhysicalAttack,
            target: CombatStat::AttackCount,
            percent: 100.0,
        });
        modifiers.fixed_to_one[CombatStat::AttackCount] = true;
        let snapshot = run(60, &[sword(500)], &modifiers);
        assert_eq!(snapshot.get(CombatStat::AttackCount), 1);
    }

    #[test]
    fn max_hp_never_drops_below_one() {
        let mut modifiers = StatModifierSet::default();
        modifiers.multiplier[CombatStat::MaxHp].scale(0.0);
        assert_eq!(run(1, &[], &modifiers).max_hp(), 1);
    }

    #[test]
    fn equipment_category_multiplier_scales_item_stats() {
        let mut modifiers = StatModifierSet::default();
        modifiers
            .equipment
            .entry(EquipmentCategory::Sword)
            .or_default()
            .scale(1.5);
        let snapshot = run(1, &[sword(15)], &modifiers);
        assert_eq!(snapshot.get(CombatStat::PhysicalAttack), 27 + 22);
    }

    #[test]
    fn job_coefficient_scales_base_terms() {
        let race = race();
        let job = JobDefinition {
            id: JobId(1),
            coefficients: BTreeMap::from([(CombatStat::PhysicalAttack, 2.0)]),
            skills: Vec::new(),
        };
        let modifiers = StatModifierSet::default();
        let snapshot = calculate(&StatInputs {
            level: 1,
            race: &race,
            job: Some(&job),
            items: &[],
            modifiers: &modifiers,
        });
        assert_eq!(snapshot.get(CombatStat::PhysicalAttack), 54);
    }
}
