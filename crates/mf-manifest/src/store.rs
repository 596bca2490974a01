//! # Manifest Storage
//!
//! The storage collaborator is a capability set `{read_manifest,
//! write_manifest}`. Production deployments persist descriptive JSON
//! documents under a directory; tests use the in-memory variant.

use crate::builder::Manifest;
use crate::errors::ManifestError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, info};

/// Interface for reading and writing manifests by name.
pub trait ManifestStore: Send + Sync {
    /// Loads the manifest stored under `name`.
    fn read_manifest(&self, name: &str) -> Result<Manifest, ManifestError>;

    /// Stores `manifest` under `name`, replacing any previous document.
    fn write_manifest(&self, name: &str, manifest: &Manifest) -> Result<(), ManifestError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Directory-backed manifest store writing `<dir>/<name>.json`.
#[derive(Debug)]
pub struct FileManifestStore {
    dir: PathBuf,
}

impl FileManifestStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// write, not here.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ManifestError> {
        // Names are plain identifiers, never paths.
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(ManifestError::Storage(format!(
                "invalid manifest name: {name:?}"
            )));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl ManifestStore for FileManifestStore {
    fn read_manifest(&self, name: &str) -> Result<Manifest, ManifestError> {
        let path = self.path_for(name)?;
        debug!(name, path = %path.display(), "reading manifest");
        let json = fs::read_to_string(&path)
            .map_err(|e| ManifestError::Storage(format!("read {}: {e}", path.display())))?;
        Manifest::from_descriptive(&json)
    }

    fn write_manifest(&self, name: &str, manifest: &Manifest) -> Result<(), ManifestError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| ManifestError::Storage(format!("create {}: {e}", self.dir.display())))?;
        let json = manifest.to_descriptive()?;
        fs::write(&path, json)
            .map_err(|e| ManifestError::Storage(format!("write {}: {e}", path.display())))?;
        info!(
            name,
            root = %manifest.root,
            routes = manifest.routes.len(),
            "manifest written"
        );
        Ok(())
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory manifest store for testing.
#[derive(Debug, Default)]
pub struct InMemoryManifestStore {
    manifests: RwLock<HashMap<String, Manifest>>,
}

impl InMemoryManifestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored manifests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.manifests.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ManifestStore for InMemoryManifestStore {
    fn read_manifest(&self, name: &str) -> Result<Manifest, ManifestError> {
        self.manifests
            .read()
            .map_err(|_| ManifestError::Storage("store lock poisoned".to_string()))?
            .get(name)
            .cloned()
            .ok_or_else(|| ManifestError::Storage(format!("manifest not found: {name}")))
    }

    fn write_manifest(&self, name: &str, manifest: &Manifest) -> Result<(), ManifestError> {
        self.manifests
            .write()
            .map_err(|_| ManifestError::Storage("store lock poisoned".to_string()))?
            .insert(name.to_string(), manifest.clone());
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
