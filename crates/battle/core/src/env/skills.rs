use crate::effect::RawEffect;
use crate::types::SkillId;

pub trait SkillOracle: Send + Sync {
    fn skill(&self, id: SkillId) -> Option<SkillDefinition>;
}

/// A skill is nothing but its effect rows.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: SkillId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<RawEffect>,
}

impl SkillDefinition {
    pub fn new(id: SkillId, effects: Vec<RawEffect>) -> Self {
        Self { id, effects }
    }
}
