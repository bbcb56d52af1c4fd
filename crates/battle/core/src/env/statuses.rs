use crate::types::StatusId;

pub trait StatusOracle: Send + Sync {
    fn status(&self, id: StatusId) -> Option<StatusDefinition>;
}

/// Static description of a status effect (poison, paralysis, silence, ...).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusDefinition {
    pub id: StatusId,
    /// Turns the status lasts once inflicted.
    pub turns: u8,
    /// Damage taken at end of turn, in percent of max HP.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_damage_percent: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub prevents_action: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub prevents_spell: bool,
}
