//! Offline master-data validation.
//!
//! Two passes: every skill row goes through the effect decoder, then every
//! id a definition mentions must resolve to a definition of its own.

use std::fmt;

use battle_core::{MasterData, SkillId, ValidationReport, validate_rows};

/// An id mentioned by a definition that the master data does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Definition holding the reference, e.g. `enemy#3`.
    pub owner: String,
    /// The missing id, e.g. `skill#12`.
    pub missing: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} references undefined {}", self.owner, self.missing)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentReport {
    pub decoder: ValidationReport,
    pub dangling: Vec<DanglingReference>,
}

impl ContentReport {
    pub fn is_clean(&self) -> bool {
        self.decoder.is_clean() && self.dangling.is_empty()
    }
}

/// Validates a whole master-data set.
pub fn validate_master_data(master: &MasterData) -> ContentReport {
    let decoder = validate_rows(
        master
            .skills
            .values()
            .map(|skill| (skill.id, skill.effects.as_slice())),
    );

    let mut dangling = Vec::new();
    let mut check = |owner: &dyn fmt::Display, missing: &dyn fmt::Display, present: bool| {
        if !present {
            dangling.push(DanglingReference {
                owner: owner.to_string(),
                missing: missing.to_string(),
            });
        }
    };
    let has_skill = |id: &SkillId| master.skills.contains_key(id);

    for spell in master.spells.values() {
        if let Some(status) = spell.status {
            check(&spell.id, &status, master.statuses.contains_key(&status));
        }
    }
    for special in master.special_attacks.values() {
        if let Some(status) = special.status {
            check(&special.id, &status, master.statuses.contains_key(&status));
        }
    }
    for race in master.races.values() {
        for skill in &race.skills {
            check(&race.id, skill, has_skill(skill));
        }
    }
    for job in master.jobs.values() {
        for skill in &job.skills {
            check(&job.id, skill, has_skill(skill));
        }
    }
    for item in master.items.values() {
        for skill in &item.skills {
            check(&item.id, skill, has_skill(skill));
        }
    }
    for enemy in master.enemies.values() {
        check(&enemy.id, &enemy.race, master.races.contains_key(&enemy.race));
        if let Some(job) = enemy.job {
            check(&enemy.id, &job, master.jobs.contains_key(&job));
        }
        for skill in &enemy.skills {
            check(&enemy.id, skill, has_skill(skill));
        }
        for spell in &enemy.spells {
            check(&enemy.id, spell, master.spells.contains_key(spell));
        }
    }

    ContentReport { decoder, dangling }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use battle_core::{
        EffectType, EnemyDefinition, EnemyId, ParamKey, RaceDefinition, RaceId, RawEffect, Row,
        SkillDefinition, SpellId,
    };

    use super::*;

    #[test]
    fn reports_decoder_failures_and_dangling_ids() {
        let master = MasterData::new()
            .with_skill(SkillDefinition::new(
                SkillId(1),
                vec![RawEffect::new(EffectType::DamageDealtPercent).with_param(ParamKey::DamageType, 0)],
            ))
            .with_race(RaceDefinition {
                id: RaceId(1),
                attributes: BTreeMap::new(),
                skills: vec![SkillId(1)],
            })
            .with_enemy(EnemyDefinition {
                id: EnemyId(3),
                level: 1,
                race: RaceId(1),
                job: None,
                skills: vec![SkillId(9)],
                spells: vec![SpellId(2)],
                action_rates: BTreeMap::new(),
                row: Row::Front,
            });

        let report = validate_master_data(&master);
        assert_eq!(report.decoder.rows, 1);
        assert_eq!(report.decoder.failures.len(), 1);
        assert_eq!(
            report.dangling,
            vec![
                DanglingReference {
                    owner: "enemy#3".into(),
                    missing: "skill#9".into(),
                },
                DanglingReference {
                    owner: "enemy#3".into(),
                    missing: "spell#2".into(),
                },
            ]
        );
        assert!(!report.is_clean());
    }
}
