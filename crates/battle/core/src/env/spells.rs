use crate::types::{SpellId, StatusId};

pub trait SpellOracle: Send + Sync {
    fn spell(&self, id: SpellId) -> Option<SpellDefinition>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellKind {
    /// Magical damage scaled from the caster's magical attack.
    Damage,
    /// Healing scaled from the caster's magical healing.
    Heal,
    /// Pure status infliction; `power` is the base chance in percent.
    Status,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellTarget {
    SingleEnemy,
    AllEnemies,
    SingleAlly,
    AllAllies,
}

impl SpellTarget {
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::SingleEnemy | Self::AllEnemies)
    }

    pub const fn is_area(self) -> bool {
        matches!(self, Self::AllEnemies | Self::AllAllies)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDefinition {
    pub id: SpellId,
    pub kind: SpellKind,
    pub target: SpellTarget,
    pub power: f64,
    /// Casts per battle before any override or recovery.
    pub charges: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<StatusId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier: u8,
}
