//! Memory Atom Sink Port - durable store for semantic memory atoms.

use async_trait::async_trait;

use crate::domain::foundation::GovernanceError;
use crate::domain::synthesis::MemoryAtom;

/// Errors that can occur while emitting an atom
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to serialize memory atom: {0}")]
    SerializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<SinkError> for GovernanceError {
    fn from(err: SinkError) -> Self {
        GovernanceError::MemorySink(err.to_string())
    }
}

/// Port for persisting memory atoms
#[async_trait]
pub trait MemoryAtomSink: Send + Sync {
    /// Durably persist `atom`, keyed by its id. Emitting the same id again
    /// replaces the earlier atom.
    async fn emit(&self, atom: &MemoryAtom) -> Result<(), SinkError>;
}
