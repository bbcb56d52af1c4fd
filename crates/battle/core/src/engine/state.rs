use crate::log::{BattleActionEntry, BattleOutcome};
use crate::types::ActorIndex;

/// Lifecycle of one battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Defeated,
    Retreated,
}

impl BattleState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Defeated | Self::Retreated)
    }

    pub const fn outcome(self) -> Option<BattleOutcome> {
        match self {
            Self::Completed => Some(BattleOutcome::Victory),
            Self::Defeated => Some(BattleOutcome::Defeat),
            Self::Retreated => Some(BattleOutcome::Retreat),
            Self::NotStarted | Self::Running => None,
        }
    }

    pub(crate) const fn from_outcome(outcome: BattleOutcome) -> Self {
        match outcome {
            BattleOutcome::Victory => Self::Completed,
            BattleOutcome::Defeat => Self::Defeated,
            BattleOutcome::Retreat => Self::Retreated,
        }
    }
}

/// What one call to `BattleEngine::step` resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepKind {
    /// Opening declarations and battle-start effects.
    BattleStart,
    /// Turn counter advanced, order computed, timed buffs fired.
    TurnStart,
    /// One actor's action, including its extra actions and every reaction it caused.
    Action(ActorIndex),
    /// The end-of-turn phase.
    TurnEnd,
}

/// One resolved phase or action, with the entries it appended.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepOutcome {
    pub kind: StepKind,
    pub turn: u16,
    pub entries: Vec<BattleActionEntry>,
    /// State after the step.
    pub state: BattleState,
}

impl StepOutcome {
    pub fn is_final(&self) -> bool {
        self.state.is_finished()
    }
}
