//! In-Memory Session Store Adapter
//!
//! Stores governance documents in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionStatus;
use crate::ports::{filter_and_order, DocumentKind, SessionStore, StoreError};

/// In-memory storage for governance documents
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    documents: Arc<RwLock<HashMap<(DocumentKind, String), Value>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored documents (useful for tests)
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    /// Get the number of stored documents of a kind
    pub async fn count(&self, kind: DocumentKind) -> usize {
        self.documents
            .read()
            .await
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        kind: DocumentKind,
        id: &str,
        document: &Value,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let key = (kind, id.to_string());
        if documents.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind,
                id: id.to_string(),
            });
        }
        documents.insert(key, document.clone());
        Ok(())
    }

    async fn load(&self, kind: DocumentKind, id: &str) -> Result<Value, StoreError> {
        self.documents
            .read()
            .await
            .get(&(kind, id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })
    }

    async fn save(&self, kind: DocumentKind, id: &str, document: &Value) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .insert((kind, id.to_string()), document.clone());
        Ok(())
    }

    async fn list(
        &self,
        kind: DocumentKind,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Value>, StoreError> {
        let documents: Vec<Value> = self
            .documents
            .read()
            .await
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, doc)| doc.clone())
            .collect();
        Ok(filter_and_order(documents, status))
    }

    async fn exists(&self, kind: DocumentKind, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .contains_key(&(kind, id.to_string())))
    }

    async fn delete(&self, kind: DocumentKind, id: &str) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .remove(&(kind, id.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })
    }
}
