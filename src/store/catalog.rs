// TOML-backed module catalog
//
// Format:
//
//   [[modules]]
//   id = 1
//   name = "SkyblockAddon"
//
//   [[modules.releases]]
//   id = 7
//   release_version = "1.0.0"
//   mod_version = "1.2.0"

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use super::{Module, ModuleStore, StoreError};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    modules: Vec<Module>,
}

/// In-memory module store loaded once at startup
#[derive(Debug, Default)]
pub struct CatalogStore {
    /// Keyed by lower-cased module name
    modules: HashMap<String, Module>,
}

impl CatalogStore {
    /// Load the catalog from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: display.clone(),
            source,
        })?;
        let file: CatalogFile = toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: display,
            source,
        })?;
        Self::from_modules(file.modules)
    }

    /// Build a store from already-parsed modules
    pub fn from_modules(modules: Vec<Module>) -> Result<Self, StoreError> {
        let mut index = HashMap::with_capacity(modules.len());
        let mut ids = HashSet::with_capacity(modules.len());
        for module in modules {
            if !ids.insert(module.id) {
                return Err(StoreError::DuplicateModuleId(module.id));
            }
            let key = module.name.to_lowercase();
            if index.contains_key(&key) {
                return Err(StoreError::DuplicateModule(module.name));
            }
            index.insert(key, module);
        }
        Ok(Self { modules: index })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn release_count(&self) -> usize {
        self.modules.values().map(|m| m.releases.len()).sum()
    }
}

impl ModuleStore for CatalogStore {
    fn find_module_by_name(&self, name: &str) -> Result<Option<Module>, StoreError> {
        Ok(self.modules.get(&name.to_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[modules]]
id = 1
name = "SkyblockAddon"

[[modules.releases]]
id = 7
release_version = "1.0.0"
mod_version = "1.2.0"

[[modules.releases]]
id = 8
release_version = "1.1.0"
mod_version = "1.2.1"

[[modules]]
id = 2
name = "Chat-Utils"
"#;

    fn write_catalog(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modules.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_catalog() {
        let (_dir, path) = write_catalog(CATALOG);
        let store = CatalogStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.release_count(), 2);

        let module = store.find_module_by_name("SkyblockAddon").unwrap().unwrap();
        assert_eq!(module.id, 1);
        assert_eq!(module.releases[0].id, 7);
        assert_eq!(module.releases[1].mod_version, "1.2.1");
    }

    #[test]
    fn test_lookup_ignores_case() {
        let (_dir, path) = write_catalog(CATALOG);
        let store = CatalogStore::load(&path).unwrap();

        let expected = store.find_module_by_name("SkyblockAddon").unwrap();
        for name in ["skyblockaddon", "SKYBLOCKADDON", "sKyBlOcKaDdOn"] {
            assert_eq!(store.find_module_by_name(name).unwrap(), expected);
        }
        assert!(store.find_module_by_name("chat-utils").unwrap().is_some());
    }

    #[test]
    fn test_unknown_module() {
        let (_dir, path) = write_catalog(CATALOG);
        let store = CatalogStore::load(&path).unwrap();
        assert!(store.find_module_by_name("doesnotexist").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let modules = vec![
            Module {
                id: 1,
                name: "Foo".to_string(),
                releases: Vec::new(),
            },
            Module {
                id: 2,
                name: "foo".to_string(),
                releases: Vec::new(),
            },
        ];
        assert!(matches!(
            CatalogStore::from_modules(modules),
            Err(StoreError::DuplicateModule(name)) if name == "foo"
        ));

        let same_id = vec![
            Module {
                id: 3,
                name: "Foo".to_string(),
                releases: Vec::new(),
            },
            Module {
                id: 3,
                name: "Bar".to_string(),
                releases: Vec::new(),
            },
        ];
        assert!(matches!(
            CatalogStore::from_modules(same_id),
            Err(StoreError::DuplicateModuleId(3))
        ));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            CatalogStore::load(&missing),
            Err(StoreError::Io { .. })
        ));

        let (_dir, path) = write_catalog("[[modules]]\nname = 3");
        assert!(matches!(
            CatalogStore::load(&path),
            Err(StoreError::Parse { .. })
        ));
    }
}
