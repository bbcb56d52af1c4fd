//! Base stat formulas: attributes and level into an untouched stat block.
//!
//! Each stat has an attribute term and a growth term. The growth term is
//! scaled by the growth multiplier and truncated before it joins the
//! attribute term; the sum is then scaled by the job coefficient.

use crate::types::{Attribute, CombatStat, PerAttribute};

/// `(attribute term, growth term)` for one stat.
pub(super) fn terms(stat: CombatStat, a: &PerAttribute<i64>, level: u16) -> (i64, f64) {
    let str_ = a[Attribute::Strength];
    let wis = a[Attribute::Wisdom];
    let spi = a[Attribute::Spirit];
    let vit = a[Attribute::Vitality];
    let agi = a[Attribute::Agility];
    let luk = a[Attribute::Luck];
    let lv = i64::from(level);

    let (attribute, growth) = match stat {
        CombatStat::MaxHp => (vit * 10 + str_ * 2, lv * (8 + vit / 4)),
        CombatStat::PhysicalAttack => (str_ * 2 + agi / 2, lv * 2),
        CombatStat::MagicalAttack => (wis * 2 + spi / 2, lv * 2),
        CombatStat::PhysicalDefense => (vit + str_ / 2, lv),
        CombatStat::MagicalDefense => (spi + wis / 2, lv),
        CombatStat::HitScore => (agi + luk / 2 + 50, lv),
        CombatStat::EvasionScore => (agi + luk / 2, lv / 2),
        CombatStat::CriticalChance => (luk / 5, 0),
        CombatStat::AttackCount => (1 + lv / 20, 0),
        CombatStat::MagicalHealing => (spi * 2, lv * 2),
        CombatStat::TrapRemoval => (agi + luk, lv),
        CombatStat::AdditionalDamage => (str_ / 2, lv),
        CombatStat::BreathDamage => (vit * 2, lv * 2),
    };
    (attribute, growth as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_count_grows_every_twenty_levels() {
        let attributes = PerAttribute::splat(10);
        assert_eq!(terms(CombatStat::AttackCount, &attributes, 1).0, 1);
        assert_eq!(terms(CombatStat::AttackCount, &attributes, 40).0, 3);
    }

    #[test]
    fn max_hp_growth_uses_vitality() {
        let mut attributes = PerAttribute::splat(0);
        attributes[Attribute::Vitality] = 20;
        let (attribute, growth) = terms(CombatStat::MaxHp, &attributes, 10);
        assert_eq!(attribute, 200);
        assert_eq!(growth, 130.0);
    }
}
