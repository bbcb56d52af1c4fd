use std::collections::BTreeMap;

use crate::types::{ActionChoice, EnemyId, JobId, RaceId, Row, SkillId, SpellId};

pub trait EnemyOracle: Send + Sync {
    fn enemy(&self, id: EnemyId) -> Option<EnemyDefinition>;
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyDefinition {
    pub id: EnemyId,
    pub level: u16,
    pub race: RaceId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub job: Option<JobId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells: Vec<SpellId>,
    /// Base action weights; skill `actionRate` effects add on top.
    #[cfg_attr(feature = "serde", serde(default))]
    pub action_rates: BTreeMap<ActionChoice, f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub row: Row,
}
