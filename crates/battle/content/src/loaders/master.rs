//! Master-data directory loader.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use battle_core::{
    EnemyDefinition, ItemDefinition, JobDefinition, MasterData, RaceDefinition, SkillDefinition,
    SpecialAttackDefinition, SpellDefinition, StatusDefinition,
};
use serde::de::DeserializeOwned;

use crate::loaders::{CatalogLoader, LoadResult};

/// Loader assembling every catalog of a directory into one [`MasterData`].
///
/// Expected files: `skills.ron`, `spells.ron`, `statuses.ron`,
/// `special_attacks.ron`, `races.ron`, `jobs.ron`, `items.ron`, `enemies.ron`.
pub struct MasterDataLoader;

impl MasterDataLoader {
    pub fn load(dir: &Path) -> LoadResult<MasterData> {
        Ok(MasterData {
            skills: load_keyed(&dir.join("skills.ron"), |s: &SkillDefinition| s.id)?,
            spells: load_keyed(&dir.join("spells.ron"), |s: &SpellDefinition| s.id)?,
            statuses: load_keyed(&dir.join("statuses.ron"), |s: &StatusDefinition| s.id)?,
            special_attacks: load_keyed(
                &dir.join("special_attacks.ron"),
                |s: &SpecialAttackDefinition| s.id,
            )?,
            races: load_keyed(&dir.join("races.ron"), |r: &RaceDefinition| r.id)?,
            jobs: load_keyed(&dir.join("jobs.ron"), |j: &JobDefinition| j.id)?,
            items: load_keyed(&dir.join("items.ron"), |i: &ItemDefinition| i.id)?,
            enemies: load_keyed(&dir.join("enemies.ron"), |e: &EnemyDefinition| e.id)?,
        })
    }
}

/// Loads a catalog and keys it by id. A repeated id is an error.
fn load_keyed<K, T>(path: &Path, key: impl Fn(&T) -> K) -> LoadResult<BTreeMap<K, T>>
where
    K: Ord + Display,
    T: DeserializeOwned,
{
    let mut keyed = BTreeMap::new();
    for entry in CatalogLoader::load::<T>(path)? {
        let id = key(&entry);
        if keyed.contains_key(&id) {
            anyhow::bail!("Duplicate {} in {}", id, path.display());
        }
        keyed.insert(id, entry);
    }
    Ok(keyed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statuses.ron");
        std::fs::write(&path, "(entries: [(id: 4, turns: 1), (id: 4, turns: 2)])").unwrap();

        let err = load_keyed(&path, |s: &StatusDefinition| s.id).unwrap_err();
        assert!(err.to_string().contains("Duplicate status#4"));
    }
}
