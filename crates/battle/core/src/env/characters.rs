use std::collections::BTreeMap;

use crate::types::{Attribute, CombatStat, EquipmentCategory, ItemId, JobId, RaceId, SkillId};

/// Race, job and item tables used to build player (and enemy) stat blocks.
pub trait CharacterOracle: Send + Sync {
    fn race(&self, id: RaceId) -> Option<RaceDefinition>;
    fn job(&self, id: JobId) -> Option<JobDefinition>;
    fn item(&self, id: ItemId) -> Option<ItemDefinition>;
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaceDefinition {
    pub id: RaceId,
    pub attributes: BTreeMap<Attribute, i64>,
    /// Racial skills every member learns.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
}

impl RaceDefinition {
    pub fn attribute(&self, attribute: Attribute) -> i64 {
        self.attributes.get(&attribute).copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobDefinition {
    pub id: JobId,
    /// Stat coefficients; a missing entry means `1.0`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub coefficients: BTreeMap<CombatStat, f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
}

impl JobDefinition {
    pub fn coefficient(&self, stat: CombatStat) -> f64 {
        self.coefficients.get(&stat).copied().unwrap_or(1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub id: ItemId,
    pub category: EquipmentCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: BTreeMap<CombatStat, i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: BTreeMap<Attribute, i64>,
    /// Skills granted while equipped.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
}
