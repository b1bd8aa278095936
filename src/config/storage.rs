//! Storage configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::ValidationError;

/// Which SessionStore backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for session documents and memory atoms
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("governance")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            base_dir: default_base_dir(),
        }
    }
}

impl StorageConfig {
    /// Directory memory atoms are written to
    pub fn memory_atoms_dir(&self) -> PathBuf {
        self.base_dir.join("memory").join("atoms")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.base_dir"));
        }
        Ok(())
    }
}
