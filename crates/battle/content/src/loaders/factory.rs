//! Content factory for building master data and scenarios from data files.

use std::path::{Path, PathBuf};

use battle_core::MasterData;
use serde::de::DeserializeOwned;

use crate::loaders::{ConfigLoader, LoadResult, MasterDataLoader, Scenario, ScenarioLoader};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── skills.ron
/// ├── spells.ron
/// ├── statuses.ron
/// ├── special_attacks.ron
/// ├── races.ron
/// ├── jobs.ron
/// ├── items.ron
/// ├── enemies.ron
/// └── scenarios/
///     └── goblin_ambush.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load configuration from `config.toml`.
    pub fn load_config<T: DeserializeOwned>(&self) -> LoadResult<T> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load every master-data catalog.
    pub fn load_master_data(&self) -> LoadResult<MasterData> {
        MasterDataLoader::load(&self.data_dir)
    }

    /// Load `scenarios/<name>.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
