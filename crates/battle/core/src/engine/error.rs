use crate::env::OracleError;
use crate::error::{BattleCoreError, ErrorSeverity};
use crate::types::{ActorIndex, EnemyId, Side};

use super::state::BattleState;

/// Roster problems detected before any log exists.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SetupError {
    #[error("{side:?} side has no actors")]
    EmptySide { side: Side },

    #[error("{side:?} side has {count} actors, at most {max} allowed")]
    TooManyActors { side: Side, count: usize, max: usize },

    #[error("{actor} appears more than once")]
    DuplicateActor { actor: ActorIndex },

    #[error("{actor} is seeded on the {found:?} side but listed with the {expected:?} roster")]
    WrongSide {
        actor: ActorIndex,
        expected: Side,
        found: Side,
    },

    #[error("enemy slot {slot} with {enemy} has no battle index")]
    EnemyIndexOutOfRange { slot: u16, enemy: EnemyId },
}

impl BattleCoreError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySide { .. } => "SETUP_EMPTY_SIDE",
            Self::TooManyActors { .. } => "SETUP_TOO_MANY_ACTORS",
            Self::DuplicateActor { .. } => "SETUP_DUPLICATE_ACTOR",
            Self::WrongSide { .. } => "SETUP_WRONG_SIDE",
            Self::EnemyIndexOutOfRange { .. } => "SETUP_ENEMY_INDEX_OUT_OF_RANGE",
        }
    }
}

/// Errors surfaced by [`super::BattleEngine`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("master data unavailable: {0}")]
    Oracle(#[from] OracleError),

    #[error("battle already finished ({state:?})")]
    AlreadyFinished { state: BattleState },

    #[error("battle is still {state:?}; it has no sealed log yet")]
    NotFinished { state: BattleState },
}

impl BattleCoreError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Setup(err) => err.severity(),
            Self::Oracle(err) => err.severity(),
            Self::AlreadyFinished { .. } | Self::NotFinished { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Setup(err) => err.error_code(),
            Self::Oracle(err) => err.error_code(),
            Self::AlreadyFinished { .. } => "BATTLE_ALREADY_FINISHED",
            Self::NotFinished { .. } => "BATTLE_NOT_FINISHED",
        }
    }
}
