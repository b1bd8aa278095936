//! File-based Session Store Adapter
//!
//! Stores each document as pretty-printed JSON at
//! `<base>/<collection>/<id>.json`. Creates stage the document in a uniquely
//! named file and hard-link it into place; saves go through a temporary file
//! and a rename. An interrupted write never leaves a partial document.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::foundation::SessionStatus;
use crate::ports::{
    filter_and_order, validate_document_id, DocumentKind, SessionStore, StoreError,
};

/// File-based storage for governance documents
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./governance");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn collection_dir(&self, kind: DocumentKind) -> PathBuf {
        self.base_path.join(kind.collection())
    }

    fn document_path(&self, kind: DocumentKind, id: &str) -> Result<PathBuf, StoreError> {
        validate_document_id(id)?;
        Ok(self.collection_dir(kind).join(format!("{}.json", id)))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    fn encode(document: &Value) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(document)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))
    }

    async fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn read_document(path: PathBuf) -> Result<Value, (PathBuf, String)> {
        let raw = fs::read(&path)
            .await
            .map_err(|e| (path.clone(), e.to_string()))?;
        serde_json::from_slice(&raw).map_err(|e| (path, e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(
        &self,
        kind: DocumentKind,
        id: &str,
        document: &Value,
    ) -> Result<(), StoreError> {
        let path = self.document_path(kind, id)?;
        self.ensure_dir(&self.collection_dir(kind)).await?;
        let bytes = Self::encode(document)?;

        // Stage the full document, then link it into place. The link fails if
        // the id is taken, and a failed write never leaves a partial document.
        let staging = path.with_extension(format!("json.{}.create", Uuid::new_v4().simple()));
        let linked = match Self::write_synced(&staging, &bytes).await {
            Ok(()) => fs::hard_link(&staging, &path).await.map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                    kind,
                    id: id.to_string(),
                },
                _ => StoreError::IoError(e.to_string()),
            }),
            Err(e) => Err(e),
        };
        if let Err(e) = fs::remove_file(&staging).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %staging.display(), error = %e, "Failed to remove staging file");
            }
        }
        linked?;

        tracing::debug!(kind = %kind, id, "Created document");
        Ok(())
    }

    async fn load(&self, kind: DocumentKind, id: &str) -> Result<Value, StoreError> {
        let path = self.document_path(kind, id)?;
        let raw = fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                kind,
                id: id.to_string(),
            },
            _ => StoreError::IoError(e.to_string()),
        })?;
        serde_json::from_slice(&raw).map_err(|e| StoreError::DeserializationFailed(e.to_string()))
    }

    async fn save(&self, kind: DocumentKind, id: &str, document: &Value) -> Result<(), StoreError> {
        let path = self.document_path(kind, id)?;
        self.ensure_dir(&self.collection_dir(kind)).await?;
        let bytes = Self::encode(document)?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        Ok(())
    }

    async fn list(
        &self,
        kind: DocumentKind,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Value>, StoreError> {
        let dir = self.collection_dir(kind);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::IoError(e.to_string())),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }

        let mut documents = Vec::with_capacity(paths.len());
        for result in join_all(paths.into_iter().map(Self::read_document)).await {
            match result {
                Ok(document) => documents.push(document),
                Err((path, error)) => {
                    tracing::warn!(path = %path.display(), %error, "Skipping unreadable document");
                }
            }
        }

        Ok(filter_and_order(documents, status))
    }

    async fn exists(&self, kind: DocumentKind, id: &str) -> Result<bool, StoreError> {
        let path = self.document_path(kind, id)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn delete(&self, kind: DocumentKind, id: &str) -> Result<(), StoreError> {
        let path = self.document_path(kind, id)?;
        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                kind,
                id: id.to_string(),
            },
            _ => StoreError::IoError(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(id: &str, status: &str, start: &str) -> Value {
        json!({"id": id, "status": status, "start_time": start})
    }

    #[tokio::test]
    async fn test_file_store_create_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        let document = doc("abc", "active", "2024-01-01T00:00:00Z");

        store.create(DocumentKind::Cycle, "abc", &document).await.unwrap();

        assert!(temp_dir.path().join("cycles").join("abc.json").exists());
        assert_eq!(store.load(DocumentKind::Cycle, "abc").await.unwrap(), document);
    }

    #[tokio::test]
    async fn test_file_store_create_collision() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        store.create(DocumentKind::Cycle, "abc", &json!({})).await.unwrap();

        let result = store.create(DocumentKind::Cycle, "abc", &json!({})).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    fn collection_entries(temp_dir: &TempDir, collection: &str) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(temp_dir.path().join(collection))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_file_store_create_leaves_no_staging_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());

        store.create(DocumentKind::Cycle, "abc", &json!({"v": 1})).await.unwrap();
        let collision = store.create(DocumentKind::Cycle, "abc", &json!({"v": 2})).await;

        assert!(matches!(collision, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(collection_entries(&temp_dir, "cycles"), vec!["abc.json"]);
        assert_eq!(store.load(DocumentKind::Cycle, "abc").await.unwrap()["v"], 1);
    }

    #[tokio::test]
    async fn test_file_store_create_ignores_abandoned_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        let dir = temp_dir.path().join("cycles");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("abc.json.0123abcd.create"), "{\"v\": ").unwrap();

        store.create(DocumentKind::Cycle, "abc", &json!({"id": "abc"})).await.unwrap();

        assert_eq!(store.load(DocumentKind::Cycle, "abc").await.unwrap()["id"], "abc");
        assert_eq!(store.list(DocumentKind::Cycle, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());

        let result = store.load(DocumentKind::Synthesis, "nope").await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_file_store_save_replaces_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        store.create(DocumentKind::Cycle, "abc", &json!({"v": 1})).await.unwrap();

        store.save(DocumentKind::Cycle, "abc", &json!({"v": 2})).await.unwrap();

        assert_eq!(store.load(DocumentKind::Cycle, "abc").await.unwrap()["v"], 2);
        assert!(!temp_dir.path().join("cycles").join("abc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_list_orders_and_skips_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        store
            .create(DocumentKind::Exploration, "old", &doc("old", "active", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .create(DocumentKind::Exploration, "new", &doc("new", "active", "2024-05-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .create(DocumentKind::Exploration, "done", &doc("done", "completed", "2024-03-01T00:00:00Z"))
            .await
            .unwrap();
        std::fs::write(temp_dir.path().join("explorations").join("broken.json"), "{not json").unwrap();

        let all = store.list(DocumentKind::Exploration, None).await.unwrap();
        let ids: Vec<_> = all.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["new", "done", "old"]);

        let active = store
            .list(DocumentKind::Exploration, Some(SessionStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
    }

    #[tokio::test]
    async fn test_file_store_list_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        assert!(store.list(DocumentKind::Cycle, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        let result = store.save(DocumentKind::Cycle, "../escape", &json!({})).await;
        assert!(matches!(result, Err(StoreError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_file_store_exists_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        store.create(DocumentKind::Cycle, "abc", &json!({})).await.unwrap();
        assert!(store.exists(DocumentKind::Cycle, "abc").await.unwrap());

        store.delete(DocumentKind::Cycle, "abc").await.unwrap();

        assert!(!store.exists(DocumentKind::Cycle, "abc").await.unwrap());
        assert!(matches!(
            store.delete(DocumentKind::Cycle, "abc").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
