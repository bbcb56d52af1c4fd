//! Data-driven battle content and its loaders.
//!
//! This crate reads master data and battle setups from RON/TOML files:
//! - Skill, spell, status and special-attack catalogs (RON)
//! - Races, jobs, items and enemies (RON)
//! - Battle scenarios: a party, an enemy roster and a seed (RON)
//! - Runtime configuration (TOML)
//!
//! Everything lands in battle-core types. Loaded catalogs are assembled into a
//! [`battle_core::MasterData`], which serves every oracle the engine asks for.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    Catalog, CatalogLoader, ConfigLoader, ContentFactory, ContentReport, DanglingReference,
    MasterDataLoader, Scenario, ScenarioLoader, validate_master_data,
};
