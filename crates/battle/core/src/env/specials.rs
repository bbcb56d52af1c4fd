use crate::types::{DamageType, SpecialAttackId, StatusId};

pub trait SpecialAttackOracle: Send + Sync {
    fn special_attack(&self, id: SpecialAttackId) -> Option<SpecialAttackDefinition>;
}

/// A signature technique, rolled before the regular action choice.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialAttackDefinition {
    pub id: SpecialAttackId,
    pub damage_type: DamageType,
    /// Multiplier on the attacker's attack score for this technique.
    pub multiplier: f64,
    pub hits: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_all: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<StatusId>,
}
