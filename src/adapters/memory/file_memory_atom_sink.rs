//! File-based memory atom sink.
//!
//! Writes each atom as JSON to `<dir>/<sanitized id>.json`. The id's `/`
//! separator becomes `_`, so `semantic/synthesis_<uuid>` lands at
//! `semantic_synthesis_<uuid>.json`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::synthesis::MemoryAtom;
use crate::ports::{MemoryAtomSink, SinkError};

#[derive(Debug, Clone)]
pub struct FileMemoryAtomSink {
    dir: PathBuf,
}

impl FileMemoryAtomSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path an atom with `atom_id` is written to.
    pub fn path_for(&self, atom_id: &str) -> PathBuf {
        let file_name: String = atom_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl MemoryAtomSink for FileMemoryAtomSink {
    async fn emit(&self, atom: &MemoryAtom) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SinkError::IoError(e.to_string()))?;

        let bytes = serde_json::to_vec_pretty(atom)
            .map_err(|e| SinkError::SerializationFailed(e.to_string()))?;
        let path = self.path_for(&atom.id);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| SinkError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| SinkError::IoError(e.to_string()))?;

        tracing::debug!(atom_id = %atom.id, path = %path.display(), "Wrote memory atom");
        Ok(())
    }
}
