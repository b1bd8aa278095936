//! In-memory memory atom sink for tests and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::synthesis::MemoryAtom;
use crate::ports::{MemoryAtomSink, SinkError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryMemoryAtomSink {
    atoms: Arc<RwLock<HashMap<String, MemoryAtom>>>,
}

impl InMemoryMemoryAtomSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, atom_id: &str) -> Option<MemoryAtom> {
        self.atoms.read().await.get(atom_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.atoms.read().await.len()
    }
}

#[async_trait]
impl MemoryAtomSink for InMemoryMemoryAtomSink {
    async fn emit(&self, atom: &MemoryAtom) -> Result<(), SinkError> {
        self.atoms.write().await.insert(atom.id.clone(), atom.clone());
        Ok(())
    }
}
