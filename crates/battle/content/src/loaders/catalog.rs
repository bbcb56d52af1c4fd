//! Generic RON catalog loader.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Catalog structure shared by every master-data RON file.
///
/// ```ron
/// (
///     entries: [
///         (id: 1, turns: 3, prevents_action: true),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog<T> {
    pub entries: Vec<T>,
}

/// Loader for RON catalogs.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load the entries of a catalog file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a RON file holding a [`Catalog`]
    pub fn load<T: DeserializeOwned>(path: &Path) -> LoadResult<Vec<T>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog {}: {}", path.display(), e))
    }

    /// Parse catalog entries from RON text.
    pub fn parse<T: DeserializeOwned>(content: &str) -> LoadResult<Vec<T>> {
        let catalog: Catalog<T> = ron::from_str(content)?;
        Ok(catalog.entries)
    }
}
