//! In-memory master data backing every oracle.
//!
//! Loaders fill a [`MasterData`]; tests build one by hand.

use std::collections::BTreeMap;

use super::{
    CharacterOracle, EnemyDefinition, EnemyOracle, ItemDefinition, JobDefinition,
    RaceDefinition, SkillDefinition, SkillOracle, SpecialAttackDefinition, SpecialAttackOracle,
    SpellDefinition, SpellOracle, StatusDefinition, StatusOracle,
};
use crate::types::{
    EnemyId, ItemId, JobId, RaceId, SkillId, SpecialAttackId, SpellId, StatusId,
};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MasterData {
    pub skills: BTreeMap<SkillId, SkillDefinition>,
    pub spells: BTreeMap<SpellId, SpellDefinition>,
    pub statuses: BTreeMap<StatusId, StatusDefinition>,
    pub special_attacks: BTreeMap<SpecialAttackId, SpecialAttackDefinition>,
    pub races: BTreeMap<RaceId, RaceDefinition>,
    pub jobs: BTreeMap<JobId, JobDefinition>,
    pub items: BTreeMap<ItemId, ItemDefinition>,
    pub enemies: BTreeMap<EnemyId, EnemyDefinition>,
}

impl MasterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.skills.insert(skill.id, skill);
        self
    }

    pub fn with_spell(mut self, spell: SpellDefinition) -> Self {
        self.spells.insert(spell.id, spell);
        self
    }

    pub fn with_status(mut self, status: StatusDefinition) -> Self {
        self.statuses.insert(status.id, status);
        self
    }

    pub fn with_special_attack(mut self, special: SpecialAttackDefinition) -> Self {
        self.special_attacks.insert(special.id, special);
        self
    }

    pub fn with_race(mut self, race: RaceDefinition) -> Self {
        self.races.insert(race.id, race);
        self
    }

    pub fn with_job(mut self, job: JobDefinition) -> Self {
        self.jobs.insert(job.id, job);
        self
    }

    pub fn with_item(mut self, item: ItemDefinition) -> Self {
        self.items.insert(item.id, item);
        self
    }

    pub fn with_enemy(mut self, enemy: EnemyDefinition) -> Self {
        self.enemies.insert(enemy.id, enemy);
        self
    }
}

impl SkillOracle for MasterData {
    fn skill(&self, id: SkillId) -> Option<SkillDefinition> {
        self.skills.get(&id).cloned()
    }
}

impl SpellOracle for MasterData {
    fn spell(&self, id: SpellId) -> Option<SpellDefinition> {
        self.spells.get(&id).cloned()
    }
}

impl StatusOracle for MasterData {
    fn status(&self, id: StatusId) -> Option<StatusDefinition> {
        self.statuses.get(&id).cloned()
    }
}

impl SpecialAttackOracle for MasterData {
    fn special_attack(&self, id: SpecialAttackId) -> Option<SpecialAttackDefinition> {
        self.special_attacks.get(&id).cloned()
    }
}

impl CharacterOracle for MasterData {
    fn race(&self, id: RaceId) -> Option<RaceDefinition> {
        self.races.get(&id).cloned()
    }

    fn job(&self, id: JobId) -> Option<JobDefinition> {
        self.jobs.get(&id).cloned()
    }

    fn item(&self, id: ItemId) -> Option<ItemDefinition> {
        self.items.get(&id).cloned()
    }
}

impl EnemyOracle for MasterData {
    fn enemy(&self, id: EnemyId) -> Option<EnemyDefinition> {
        self.enemies.get(&id).cloned()
    }
}
