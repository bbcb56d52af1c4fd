//! Traits describing read-only master data.
//!
//! Oracles expose skill rows, spell and status tables, special attacks, and
//! the race/job/item/enemy definitions that feed the stat calculator. The
//! [`BattleEnv`] aggregate bundles them so the compiler and the engine reach
//! master data through one explicit handle instead of ambient state.
mod characters;
mod enemies;
mod error;
mod rng;
mod skills;
mod snapshot;
mod specials;
mod spells;
mod statuses;

pub use characters::{CharacterOracle, ItemDefinition, JobDefinition, RaceDefinition};
pub use enemies::{EnemyDefinition, EnemyOracle};
pub use error::OracleError;
pub use rng::{BattleRng, PcgRng, RngOracle, RollContext, compute_seed};
pub use skills::{SkillDefinition, SkillOracle};
pub use snapshot::MasterData;
pub use specials::{SpecialAttackDefinition, SpecialAttackOracle};
pub use spells::{SpellDefinition, SpellKind, SpellOracle, SpellTarget};
pub use statuses::{StatusDefinition, StatusOracle};

use crate::types::{
    EnemyId, ItemId, JobId, RaceId, SkillId, SpecialAttackId, SpellId, StatusId,
};

/// Aggregates the read-only oracles used by compilation and battle setup.
#[derive(Clone, Copy, Default)]
pub struct BattleEnv<'a> {
    skills: Option<&'a dyn SkillOracle>,
    spells: Option<&'a dyn SpellOracle>,
    statuses: Option<&'a dyn StatusOracle>,
    special_attacks: Option<&'a dyn SpecialAttackOracle>,
    characters: Option<&'a dyn CharacterOracle>,
    enemies: Option<&'a dyn EnemyOracle>,
}

impl<'a> BattleEnv<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every oracle served by one backing store.
    pub fn with_all<O>(oracle: &'a O) -> Self
    where
        O: SkillOracle
            + SpellOracle
            + StatusOracle
            + SpecialAttackOracle
            + CharacterOracle
            + EnemyOracle,
    {
        Self {
            skills: Some(oracle),
            spells: Some(oracle),
            statuses: Some(oracle),
            special_attacks: Some(oracle),
            characters: Some(oracle),
            enemies: Some(oracle),
        }
    }

    pub fn with_skills(mut self, oracle: &'a dyn SkillOracle) -> Self {
        self.skills = Some(oracle);
        self
    }

    pub fn with_spells(mut self, oracle: &'a dyn SpellOracle) -> Self {
        self.spells = Some(oracle);
        self
    }

    pub fn with_statuses(mut self, oracle: &'a dyn StatusOracle) -> Self {
        self.statuses = Some(oracle);
        self
    }

    pub fn with_special_attacks(mut self, oracle: &'a dyn SpecialAttackOracle) -> Self {
        self.special_attacks = Some(oracle);
        self
    }

    pub fn with_characters(mut self, oracle: &'a dyn CharacterOracle) -> Self {
        self.characters = Some(oracle);
        self
    }

    pub fn with_enemies(mut self, oracle: &'a dyn EnemyOracle) -> Self {
        self.enemies = Some(oracle);
        self
    }

    /// # Errors
    ///
    /// Returns `OracleError::SkillsNotAvailable` if no skill oracle was provided.
    pub fn skills(&self) -> Result<&'a dyn SkillOracle, OracleError> {
        self.skills.ok_or(OracleError::SkillsNotAvailable)
    }

    pub fn spells(&self) -> Result<&'a dyn SpellOracle, OracleError> {
        self.spells.ok_or(OracleError::SpellsNotAvailable)
    }

    pub fn statuses(&self) -> Result<&'a dyn StatusOracle, OracleError> {
        self.statuses.ok_or(OracleError::StatusesNotAvailable)
    }

    pub fn special_attacks(&self) -> Result<&'a dyn SpecialAttackOracle, OracleError> {
        self.special_attacks
            .ok_or(OracleError::SpecialAttacksNotAvailable)
    }

    pub fn characters(&self) -> Result<&'a dyn CharacterOracle, OracleError> {
        self.characters.ok_or(OracleError::CharactersNotAvailable)
    }

    pub fn enemies(&self) -> Result<&'a dyn EnemyOracle, OracleError> {
        self.enemies.ok_or(OracleError::EnemiesNotAvailable)
    }

    // ===== resolving lookups: absent ids become configuration errors =====

    pub fn skill(&self, id: SkillId) -> Result<SkillDefinition, OracleError> {
        self.skills()?.skill(id).ok_or(OracleError::SkillNotFound(id))
    }

    pub fn spell(&self, id: SpellId) -> Result<SpellDefinition, OracleError> {
        self.spells()?.spell(id).ok_or(OracleError::SpellNotFound(id))
    }

    pub fn status(&self, id: StatusId) -> Result<StatusDefinition, OracleError> {
        self.statuses()?
            .status(id)
            .ok_or(OracleError::StatusNotFound(id))
    }

    pub fn special_attack(
        &self,
        id: SpecialAttackId,
    ) -> Result<SpecialAttackDefinition, OracleError> {
        self.special_attacks()?
            .special_attack(id)
            .ok_or(OracleError::SpecialAttackNotFound(id))
    }

    pub fn race(&self, id: RaceId) -> Result<RaceDefinition, OracleError> {
        self.characters()?
            .race(id)
            .ok_or(OracleError::RaceNotFound(id))
    }

    pub fn job(&self, id: JobId) -> Result<JobDefinition, OracleError> {
        self.characters()?.job(id).ok_or(OracleError::JobNotFound(id))
    }

    pub fn item(&self, id: ItemId) -> Result<ItemDefinition, OracleError> {
        self.characters()?
            .item(id)
            .ok_or(OracleError::ItemNotFound(id))
    }

    pub fn enemy(&self, id: EnemyId) -> Result<EnemyDefinition, OracleError> {
        self.enemies()?
            .enemy(id)
            .ok_or(OracleError::EnemyNotFound(id))
    }
}

impl core::fmt::Debug for BattleEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BattleEnv")
            .field("skills", &self.skills.is_some())
            .field("spells", &self.spells.is_some())
            .field("statuses", &self.statuses.is_some())
            .field("special_attacks", &self.special_attacks.is_some())
            .field("characters", &self.characters.is_some())
            .field("enemies", &self.enemies.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BattleCoreError;

    #[test]
    fn missing_oracle_is_reported_by_name() {
        let env = BattleEnv::empty();
        let err = env.skill(SkillId(1)).expect_err("no skill oracle");
        assert_eq!(err, OracleError::SkillsNotAvailable);
    }

    #[test]
    fn unknown_id_names_the_id() {
        let data = MasterData::new();
        let env = BattleEnv::with_all(&data);
        let err = env.spell(SpellId(12)).expect_err("empty master data");
        assert_eq!(err, OracleError::SpellNotFound(SpellId(12)));
        assert_eq!(err.error_code(), "ORACLE_SPELL_NOT_FOUND");
        assert_eq!(err.to_string(), "spell#12 not found");
    }
}
