// Application state module
// Holds the module store and tag cache shared by all connections

use std::path::PathBuf;
use std::sync::Arc;

use super::types::Config;
use crate::store::ModuleStore;
use crate::tags::TagCache;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ModuleStore>,
    pub tags: TagCache,
    pub storage_root: PathBuf,
    pub access_log: bool,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn ModuleStore>, tags: TagCache) -> Self {
        Self {
            config: config.clone(),
            store,
            tags,
            storage_root: PathBuf::from(&config.storage.root),
            access_log: config.logging.access_log,
        }
    }
}
