//! Configuration loader.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// Loader for configuration from TOML files.
///
/// The target type is chosen by the caller: a bare `BattleConfig` or a
/// configuration that embeds one.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file
    pub fn load<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
        let content = read_file(path)?;
        let config: T = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use battle_core::{BattleConfig, RandomMode};

    use super::*;

    #[test]
    fn omitted_fields_keep_their_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "turn_limit = 8\nrandom_mode = \"FixedMedian\"").unwrap();

        let config: BattleConfig = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.turn_limit, 8);
        assert_eq!(config.random_mode, RandomMode::FixedMedian);
        assert_eq!(config.max_reaction_depth, BattleConfig::DEFAULT_MAX_REACTION_DEPTH);
    }

    #[test]
    fn malformed_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "turn_limit = \"many\"").unwrap();

        let err = ConfigLoader::load::<BattleConfig>(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config TOML"));
    }
}
