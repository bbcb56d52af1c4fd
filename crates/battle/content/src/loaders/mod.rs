//! Content loaders for reading battle data from files.
//!
//! Every loader returns [`LoadResult`] and names the offending file in its
//! error message.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod master;
pub mod scenario;
pub mod validate;

pub use catalog::{Catalog, CatalogLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use master::MasterDataLoader;
pub use scenario::{Scenario, ScenarioLoader};
pub use validate::{ContentReport, DanglingReference, validate_master_data};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
