//! Master-data access errors.

use crate::error::{BattleCoreError, ErrorSeverity};
use crate::types::{
    EnemyId, ItemId, JobId, RaceId, SkillId, SpecialAttackId, SpellId, StatusId,
};

/// A referenced id could not be resolved, or the oracle serving it was never
/// provided.
///
/// Both cases are configuration errors: compilation or battle setup stops and
/// the caller gets the offending id.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("SkillOracle not available")]
    SkillsNotAvailable,

    #[error("SpellOracle not available")]
    SpellsNotAvailable,

    #[error("StatusOracle not available")]
    StatusesNotAvailable,

    #[error("SpecialAttackOracle not available")]
    SpecialAttacksNotAvailable,

    #[error("CharacterOracle not available")]
    CharactersNotAvailable,

    #[error("EnemyOracle not available")]
    EnemiesNotAvailable,

    #[error("{0} not found")]
    SkillNotFound(SkillId),

    #[error("{0} not found")]
    SpellNotFound(SpellId),

    #[error("{0} not found")]
    StatusNotFound(StatusId),

    #[error("{0} not found")]
    SpecialAttackNotFound(SpecialAttackId),

    #[error("{0} not found")]
    RaceNotFound(RaceId),

    #[error("{0} not found")]
    JobNotFound(JobId),

    #[error("{0} not found")]
    ItemNotFound(ItemId),

    #[error("{0} not found")]
    EnemyNotFound(EnemyId),
}

impl BattleCoreError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            SkillsNotAvailable => "ORACLE_SKILLS_NOT_AVAILABLE",
            SpellsNotAvailable => "ORACLE_SPELLS_NOT_AVAILABLE",
            StatusesNotAvailable => "ORACLE_STATUSES_NOT_AVAILABLE",
            SpecialAttacksNotAvailable => "ORACLE_SPECIAL_ATTACKS_NOT_AVAILABLE",
            CharactersNotAvailable => "ORACLE_CHARACTERS_NOT_AVAILABLE",
            EnemiesNotAvailable => "ORACLE_ENEMIES_NOT_AVAILABLE",
            SkillNotFound(_) => "ORACLE_SKILL_NOT_FOUND",
            SpellNotFound(_) => "ORACLE_SPELL_NOT_FOUND",
            StatusNotFound(_) => "ORACLE_STATUS_NOT_FOUND",
            SpecialAttackNotFound(_) => "ORACLE_SPECIAL_ATTACK_NOT_FOUND",
            RaceNotFound(_) => "ORACLE_RACE_NOT_FOUND",
            JobNotFound(_) => "ORACLE_JOB_NOT_FOUND",
            ItemNotFound(_) => "ORACLE_ITEM_NOT_FOUND",
            EnemyNotFound(_) => "ORACLE_ENEMY_NOT_FOUND",
        }
    }
}
