//! Hit, critical and damage formulas.
//!
//! Pure functions over already-resolved numbers; the resolution pipeline in
//! `resolve` gathers the inputs from both actors and applies the results.
//!
//! ```text
//! hit_chance = clamp(90 + (hit - evasion) / 2, max(floor, 100 - dodge_cap), 100)
//! base       = attack × variance - defense × 0.5 × (1 - penetration / 100)
//! damage     = trunc(base × dealt × taken × critical × martial × row
//!                         × threshold × level × buffs × ratio)
//! barrier    = damage / 3
//! landed     = max(1, damage after barrier and block)
//! ```

/// Hit chance before any floor: a perfectly matched pair lands 90%.
const BASE_HIT_PERCENT: f64 = 90.0;
/// Fraction of defense subtracted from attack.
const DEFENSE_WEIGHT: f64 = 0.5;
/// A barrier charge lets one third of the hit through.
const BARRIER_DIVISOR: u32 = 3;
/// A block halves the hit.
const BLOCK_DIVISOR: u32 = 2;
/// Least damage a landed hit deals.
const MIN_LANDED_DAMAGE: u32 = 1;

/// Percent chance that an evadable strike lands.
///
/// `floor` is the attacker's minimum hit chance, `dodge_cap` the most the
/// defender may evade.
pub fn hit_chance(hit_score: f64, evasion_score: f64, floor: f64, dodge_cap: f64) -> f64 {
    let lower = floor.max(100.0 - dodge_cap).clamp(0.0, 100.0);
    (BASE_HIT_PERCENT + (hit_score - evasion_score) / 2.0).clamp(lower, 100.0)
}

/// Critical chance clamped into `[0, cap]`.
pub fn critical_chance(critical_score: f64, cap: f64) -> f64 {
    critical_score.clamp(0.0, cap.clamp(0.0, 100.0))
}

/// Damage before multipliers. Never negative.
pub fn base_damage(attack: f64, variance: f64, defense: f64, penetration_percent: f64) -> f64 {
    let penetration = penetration_percent.clamp(0.0, 100.0) / 100.0;
    (attack * variance - defense * DEFENSE_WEIGHT * (1.0 - penetration)).max(0.0)
}

/// Every multiplier applied on top of the base damage. All default to `1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageFactors {
    /// Attacker's dealt modifier for the damage type.
    pub dealt: f64,
    /// Defender's taken modifier for the damage type.
    pub taken: f64,
    pub critical: f64,
    pub martial: f64,
    pub row: f64,
    pub hp_threshold: f64,
    pub level: f64,
    pub buffs: f64,
    /// Share of a full strike: reaction ratio or special-attack multiplier.
    pub ratio: f64,
}

impl Default for DamageFactors {
    fn default() -> Self {
        Self {
            dealt: 1.0,
            taken: 1.0,
            critical: 1.0,
            martial: 1.0,
            row: 1.0,
            hp_threshold: 1.0,
            level: 1.0,
            buffs: 1.0,
            ratio: 1.0,
        }
    }
}

impl DamageFactors {
    pub fn product(&self) -> f64 {
        self.dealt
            * self.taken
            * self.critical
            * self.martial
            * self.row
            * self.hp_threshold
            * self.level
            * self.buffs
            * self.ratio
    }
}

/// Applies the factors and truncates toward zero.
pub fn final_damage(base: f64, factors: &DamageFactors) -> u32 {
    let damage = base * factors.product();
    if damage.is_nan() || damage <= 0.0 {
        0
    } else if damage >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        damage as u32
    }
}

/// Damage that passes through one barrier charge.
pub fn barrier(damage: u32) -> u32 {
    damage / BARRIER_DIVISOR
}

/// Damage a landed hit deals after an optional barrier charge and block.
pub fn landed_damage(damage: u32, barrier_charge: bool, blocked: bool) -> u32 {
    let mut damage = damage;
    if barrier_charge {
        damage = barrier(damage);
    }
    if blocked {
        damage /= BLOCK_DIVISOR;
    }
    damage.max(MIN_LANDED_DAMAGE)
}

/// `max_hp × percent / 100`, truncated, at least 1 when `percent > 0`.
pub fn percent_of_max_hp(max_hp: u32, percent: f64) -> u32 {
    if percent <= 0.0 {
        return 0;
    }
    ((f64::from(max_hp) * percent / 100.0) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_5000_against_defense_2000_deals_4000_at_median() {
        let base = base_damage(5000.0, 1.0, 2000.0, 0.0);
        assert_eq!(final_damage(base, &DamageFactors::default()), 4000);
    }

    #[test]
    fn ten_percent_dealt_bonus_scales_by_exactly_1_1() {
        let base = base_damage(5000.0, 1.0, 2000.0, 0.0);
        let factors = DamageFactors {
            dealt: 1.1,
            ..DamageFactors::default()
        };
        assert_eq!(final_damage(base, &factors), 4400);
    }

    #[test]
    fn barrier_lets_a_third_through() {
        assert_eq!(barrier(4000), 1333);
        assert_eq!(barrier(9), 3);
    }

    #[test]
    fn landed_hits_deal_at_least_one() {
        assert_eq!(landed_damage(2, true, false), 1);
        assert_eq!(landed_damage(1, true, true), 1);
        assert_eq!(landed_damage(0, false, false), 1);
        assert_eq!(landed_damage(9, true, true), 1);
        assert_eq!(landed_damage(4000, true, true), 666);
        assert_eq!(landed_damage(4000, false, true), 2000);
    }

    #[test]
    fn full_penetration_ignores_defense() {
        assert_eq!(base_damage(100.0, 1.0, 80.0, 100.0), 100.0);
        assert_eq!(base_damage(100.0, 1.0, 400.0, 0.0), 0.0);
    }

    #[test]
    fn hit_chance_respects_floor_and_dodge_cap() {
        assert_eq!(hit_chance(100.0, 100.0, 5.0, 95.0), 90.0);
        assert_eq!(hit_chance(0.0, 1000.0, 5.0, 95.0), 5.0);
        assert_eq!(hit_chance(0.0, 1000.0, 5.0, 70.0), 30.0);
        assert_eq!(hit_chance(0.0, 1000.0, 40.0, 95.0), 40.0);
        assert_eq!(hit_chance(500.0, 0.0, 5.0, 95.0), 100.0);
    }

    #[test]
    fn critical_chance_is_capped() {
        assert_eq!(critical_chance(80.0, 50.0), 50.0);
        assert_eq!(critical_chance(-3.0, 50.0), 0.0);
    }

    #[test]
    fn percent_of_max_hp_truncates_with_floor() {
        assert_eq!(percent_of_max_hp(199, 5.0), 9);
        assert_eq!(percent_of_max_hp(10, 1.0), 1);
        assert_eq!(percent_of_max_hp(10, 0.0), 0);
    }
}
