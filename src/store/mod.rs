//! Module store
//!
//! Read-only access to modules and their releases. Administrative flows that
//! create or delete modules live outside this service; the server only needs
//! a case-insensitive lookup by name.

mod catalog;
pub mod version;

pub use catalog::CatalogStore;
pub use version::{release_for_mod_version, VersionError};

use serde::Deserialize;

/// A named add-on package with its published releases
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Module {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// One published version of a module's artifacts
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub id: u64,
    /// Version of the release itself
    pub release_version: String,
    /// Client mod version this release was built against
    pub mod_version: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read module catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse module catalog '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("duplicate module name '{0}' (names are case-insensitive)")]
    DuplicateModule(String),
    #[error("duplicate module id {0}")]
    DuplicateModuleId(u64),
}

/// Lookup interface over the persistent module store
pub trait ModuleStore: Send + Sync {
    /// Find a module by name, ignoring letter case
    fn find_module_by_name(&self, name: &str) -> Result<Option<Module>, StoreError>;
}
