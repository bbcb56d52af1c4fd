//! Offline check that every master-data row decodes.

use crate::types::SkillId;

use super::decode::decode;
use super::error::DecodeError;
use super::raw::RawEffect;

/// Result of running the decoder over a body of master data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub skills: usize,
    pub rows: usize,
    pub failures: Vec<DecodeError>,
}

impl ValidationReport {
    pub fn decoded(&self) -> usize {
        self.rows - self.failures.len()
    }

    /// Shipped data must produce a clean report.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decodes every row of every skill and collects the failures.
pub fn validate_rows<'a, I>(skills: I) -> ValidationReport
where
    I: IntoIterator<Item = (SkillId, &'a [RawEffect])>,
{
    let mut report = ValidationReport::default();
    for (skill, rows) in skills {
        report.skills += 1;
        for (index, raw) in rows.iter().enumerate() {
            report.rows += 1;
            let index = u16::try_from(index).unwrap_or(u16::MAX);
            if let Err(err) = decode(skill, index, raw) {
                report.failures.push(err);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::decode::tests::complete_row;
    use crate::effect::{EffectType, ValueKey};

    #[test]
    fn report_counts_rows_and_failures() {
        let good = vec![
            complete_row(EffectType::DamageDealtPercent),
            complete_row(EffectType::Barrier),
        ];
        let bad = vec![
            complete_row(EffectType::FirstStrike),
            RawEffect::new(EffectType::Parry).with_value(ValueKey::Chance, -5.0),
        ];

        let report = validate_rows([(SkillId(1), good.as_slice()), (SkillId(2), bad.as_slice())]);

        assert_eq!(report.skills, 2);
        assert_eq!(report.rows, 4);
        assert_eq!(report.decoded(), 3);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].skill, SkillId(2));
        assert_eq!(report.failures[0].effect_index, 1);
    }
}
