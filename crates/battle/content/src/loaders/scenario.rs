//! Battle scenario loader.

use std::path::Path;

use battle_core::{EnemyId, PlayerCharacter};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One battle setup: who fights whom, under which seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    /// Party members in party order.
    pub party: Vec<PlayerCharacter>,
    /// Enemy master ids in roster order; the position is the enemy's slot.
    pub enemies: Vec<EnemyId>,
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let scenario: Scenario = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON {}: {}", path.display(), e))?;

        if scenario.party.is_empty() || scenario.enemies.is_empty() {
            anyhow::bail!("Scenario {} needs at least one fighter per side", scenario.name);
        }
        Ok(scenario)
    }
}
