//! Closed key vocabularies of a raw effect row.

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Integer parameter slot of an effect row.
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
    Display,
    IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
pub enum ParamKey {
    DamageType,
    Stat,
    SourceStat,
    TargetStat,
    Attribute,
    StatusId,
    SpellId,
    SpecialAttackId,
    Trigger,
    Choice,
    Category,
    HpScale,
    RowProfile,
    BuffKind,
    Turn,
    Interval,
    Count,
    Duration,
    Tier,
}

impl ParamKey {
    /// Range check applied on top of the target type's own conversion.
    ///
    /// Counters and schedule parameters must be positive; everything else is
    /// constrained only by the type it converts into.
    pub const fn accepts(self, raw: i64) -> bool {
        match self {
            Self::Turn | Self::Interval | Self::Count | Self::Duration => raw >= 1,
            _ => true,
        }
    }
}

/// Numeric value slot of an effect row.
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
    Display,
    IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
pub enum ValueKey {
    Percent,
    Multiplier,
    Additive,
    Chance,
    Threshold,
    Weight,
    PerLevel,
    PerPoint,
    Base,
    PerUnit,
    Unit,
    Ratio,
    Cap,
}

impl ValueKey {
    /// Domain of each value slot. Percent-like slots are left unbounded here;
    /// consumers clamp them where the rule needs it.
    pub fn accepts(self, raw: f64) -> bool {
        if !raw.is_finite() {
            return false;
        }
        match self {
            Self::Chance | Self::Threshold | Self::Cap => (0.0..=100.0).contains(&raw),
            Self::Multiplier | Self::Weight | Self::Ratio => raw >= 0.0,
            Self::Unit => raw > 0.0,
            Self::Percent
            | Self::Additive
            | Self::PerLevel
            | Self::PerPoint
            | Self::Base
            | Self::PerUnit => true,
        }
    }
}

/// Integer array slot of an effect row.
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
    Display,
    IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
pub enum ArrayKey {
    SpellIds,
    StatusIds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chance_is_bounded_to_percent_range() {
        assert!(ValueKey::Chance.accepts(0.0));
        assert!(ValueKey::Chance.accepts(100.0));
        assert!(!ValueKey::Chance.accepts(100.5));
        assert!(!ValueKey::Chance.accepts(-1.0));
    }

    #[test]
    fn non_finite_values_are_rejected_everywhere() {
        use strum::IntoEnumIterator;
        for key in ValueKey::iter() {
            assert!(!key.accepts(f64::NAN), "{key}");
            assert!(!key.accepts(f64::INFINITY), "{key}");
        }
    }

    #[test]
    fn schedule_parameters_must_be_positive() {
        assert!(!ParamKey::Interval.accepts(0));
        assert!(ParamKey::Interval.accepts(3));
        assert!(ParamKey::Stat.accepts(0));
    }
}
