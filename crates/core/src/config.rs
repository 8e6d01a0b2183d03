//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! In particular the collection directory is loaded here, so no transaction ever touches
//! the file system or the environment.

use crate::collections::CollectionDirectory;
use crate::constants::DEFAULT_COLLECTION_CONFIG;
use crate::{RecordError, RecordResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    collections: CollectionDirectory,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidConfig` if the directory defines no collections, since
    /// every partition-scoped operation would then fail.
    pub fn new(collections: CollectionDirectory) -> RecordResult<Self> {
        if collections.definitions().is_empty() {
            return Err(RecordError::InvalidConfig(
                "collection config defines no collections".into(),
            ));
        }

        Ok(Self { collections })
    }

    /// Loads the collection directory from `path` and builds a `CoreConfig` around it.
    pub fn load(path: &Path) -> RecordResult<Self> {
        Self::new(CollectionDirectory::load(path)?)
    }

    pub fn collections(&self) -> &CollectionDirectory {
        &self.collections
    }
}

/// Resolve the collection configuration file without reading environment variables.
///
/// If `override_path` is provided it must name an existing file. Otherwise this looks for
/// `collection_config.json` in the current working directory and then walks up from
/// `CARGO_MANIFEST_DIR`.
pub fn resolve_collection_config_path(override_path: Option<PathBuf>) -> RecordResult<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path);
        }
        return Err(RecordError::InvalidInput(format!(
            "collection config override {} is not a file",
            path.display()
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_COLLECTION_CONFIG);
    if cwd_relative.is_file() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_COLLECTION_CONFIG);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(RecordError::InvalidInput(format!(
        "could not locate {DEFAULT_COLLECTION_CONFIG}"
    )))
}
