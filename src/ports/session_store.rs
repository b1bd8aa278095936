//! Session Store Port - Interface for persisting governance documents.
//!
//! Cycles, exploration sessions and synthesis sessions are each stored as one
//! JSON document keyed by `(kind, id)`. Writes are last-writer-wins; there is
//! no cross-document transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::domain::cycle::Cycle;
use crate::domain::exploration::ExplorationSession;
use crate::domain::foundation::{GovernanceError, SessionStatus};
use crate::domain::synthesis::SynthesisSession;

/// The three document collections the governance core persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Cycle,
    Exploration,
    Synthesis,
}

impl DocumentKind {
    /// Directory (or namespace) name for this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            DocumentKind::Cycle => "cycles",
            DocumentKind::Exploration => "explorations",
            DocumentKind::Synthesis => "syntheses",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentKind::Cycle => "cycle",
            DocumentKind::Exploration => "exploration",
            DocumentKind::Synthesis => "synthesis",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No {kind} document with id {id}")]
    NotFound { kind: DocumentKind, id: String },

    #[error("A {kind} document with id {id} already exists")]
    AlreadyExists { kind: DocumentKind, id: String },

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Failed to serialize document: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize document: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<StoreError> for GovernanceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists { kind, id } => {
                GovernanceError::AlreadyExists(format!("{} {}", kind, id))
            }
            other => GovernanceError::Persistence(other.to_string()),
        }
    }
}

/// Port for persisting and loading governance documents
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a new document
    ///
    /// # Errors
    /// Returns `StoreError::AlreadyExists` if a document with this id exists
    async fn create(&self, kind: DocumentKind, id: &str, document: &Value)
        -> Result<(), StoreError>;

    /// Load a document
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no document exists
    async fn load(&self, kind: DocumentKind, id: &str) -> Result<Value, StoreError>;

    /// Overwrite a document. A failed save leaves the previous version intact.
    async fn save(&self, kind: DocumentKind, id: &str, document: &Value) -> Result<(), StoreError>;

    /// List documents of a kind, optionally filtered by their `status` field,
    /// newest `start_time` first
    async fn list(
        &self,
        kind: DocumentKind,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Check whether a document exists
    async fn exists(&self, kind: DocumentKind, id: &str) -> Result<bool, StoreError>;

    /// Delete a document
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no document exists
    async fn delete(&self, kind: DocumentKind, id: &str) -> Result<(), StoreError>;
}

/// Applies the `list` contract to an unordered batch of documents.
///
/// Documents without a parseable `start_time` sort last.
pub fn filter_and_order(documents: Vec<Value>, status: Option<SessionStatus>) -> Vec<Value> {
    let mut documents: Vec<Value> = documents
        .into_iter()
        .filter(|doc| match status {
            Some(wanted) => doc.get("status").and_then(Value::as_str) == Some(wanted.as_str()),
            None => true,
        })
        .collect();

    documents.sort_by(|a, b| start_time_of(b).cmp(&start_time_of(a)));
    documents
}

fn start_time_of(document: &Value) -> Option<DateTime<Utc>> {
    document
        .get("start_time")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Rejects ids that cannot safely name a document.
pub fn validate_document_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

// ───────────────────────────────────────────────────────────────
// Typed access
// ───────────────────────────────────────────────────────────────

/// An aggregate that is persisted as one document.
pub trait StoredDocument: Serialize + DeserializeOwned + Send + Sync {
    const KIND: DocumentKind;

    /// The id this document is stored under.
    fn document_id(&self) -> String;
}

fn to_value<T: StoredDocument>(document: &T) -> Result<Value, StoreError> {
    serde_json::to_value(document).map_err(|e| StoreError::SerializationFailed(e.to_string()))
}

fn from_value<T: StoredDocument>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::DeserializationFailed(e.to_string()))
}

pub async fn create_document<T: StoredDocument>(
    store: &dyn SessionStore,
    document: &T,
) -> Result<(), StoreError> {
    store
        .create(T::KIND, &document.document_id(), &to_value(document)?)
        .await
}

pub async fn load_document<T: StoredDocument>(
    store: &dyn SessionStore,
    id: &str,
) -> Result<T, StoreError> {
    from_value(store.load(T::KIND, id).await?)
}

pub async fn save_document<T: StoredDocument>(
    store: &dyn SessionStore,
    document: &T,
) -> Result<(), StoreError> {
    store
        .save(T::KIND, &document.document_id(), &to_value(document)?)
        .await
}

/// Lists and decodes documents. Documents that no longer decode are skipped.
pub async fn list_documents<T: StoredDocument>(
    store: &dyn SessionStore,
    status: Option<SessionStatus>,
) -> Result<Vec<T>, StoreError> {
    let documents = store.list(T::KIND, status).await?;
    let mut decoded = Vec::with_capacity(documents.len());
    for value in documents {
        match from_value::<T>(value) {
            Ok(document) => decoded.push(document),
            Err(e) => tracing::warn!(kind = %T::KIND, error = %e, "Skipping undecodable document"),
        }
    }
    Ok(decoded)
}

impl StoredDocument for Cycle {
    const KIND: DocumentKind = DocumentKind::Cycle;

    fn document_id(&self) -> String {
        self.id().to_string()
    }
}

impl StoredDocument for ExplorationSession {
    const KIND: DocumentKind = DocumentKind::Exploration;

    fn document_id(&self) -> String {
        self.id().to_string()
    }
}

impl StoredDocument for SynthesisSession {
    const KIND: DocumentKind = DocumentKind::Synthesis;

    fn document_id(&self) -> String {
        self.id().to_string()
    }
}
