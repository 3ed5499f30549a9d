//! Release folder resolution
//!
//! Maps a module name and a client mod version to the storage folder of the
//! release that applies: `<storage_root>/<module-name-lowercase>/<release-id>`.
//! The folder's existence is not checked here.

use std::path::{Path, PathBuf};

use hyper::StatusCode;

use crate::store::{release_for_mod_version, ModuleStore, StoreError, VersionError};

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("missing 'modVersion' query parameter")]
    MissingParameter,
    #[error("no module named '{0}'")]
    ModuleNotFound(String),
    #[error("no release of '{module}' applies to mod version '{mod_version}'")]
    NoMatchingRelease { module: String, mod_version: String },
    #[error(transparent)]
    VersionParse(#[from] VersionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolutionError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter | Self::VersionParse(_) => StatusCode::BAD_REQUEST,
            Self::ModuleNotFound(_) | Self::NoMatchingRelease { .. } => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Version errors are deliberately generic.
    pub const fn client_message(&self) -> &'static str {
        match self {
            Self::MissingParameter => "Missing 'modVersion' query parameter.",
            Self::ModuleNotFound(_) => "No module with that module-name",
            Self::NoMatchingRelease { .. } => "No release applicable for specified mod version.",
            Self::VersionParse(_) => "Invalid query.",
            Self::Store(_) => "Internal server error",
        }
    }
}

/// On-disk folder of a resolved release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFolder {
    pub release_id: u64,
    pub path: PathBuf,
}

impl ReleaseFolder {
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Resolve the release folder for `module_name` at `mod_version`
pub fn resolve_release_folder(
    store: &dyn ModuleStore,
    storage_root: &Path,
    module_name: &str,
    mod_version: Option<&str>,
) -> Result<ReleaseFolder, ResolutionError> {
    let mod_version = mod_version.ok_or(ResolutionError::MissingParameter)?;
    let module_name = module_name.to_lowercase();

    let module = store
        .find_module_by_name(&module_name)?
        .ok_or_else(|| ResolutionError::ModuleNotFound(module_name.clone()))?;

    let release = release_for_mod_version(&module, mod_version)?.ok_or_else(|| {
        ResolutionError::NoMatchingRelease {
            module: module.name.clone(),
            mod_version: mod_version.to_string(),
        }
    })?;

    Ok(ReleaseFolder {
        release_id: release.id,
        path: storage_root.join(module_name).join(release.id.to_string()),
    })
}
