//! Per-document mutual exclusion for read-modify-write operations.
//!
//! Each engine operation loads a whole document, mutates it, and saves it
//! back. Two such operations on the same document id would otherwise race
//! and silently drop one writer's changes. Locks are process-local; separate
//! processes sharing one store still see last-writer-wins.
//!
//! Lock order across engines is cycle, then synthesis, then exploration.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ports::DocumentKind;

type LockMap = HashMap<(DocumentKind, String), Arc<AsyncMutex<()>>>;

/// Registry of async mutexes keyed by document kind and id.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to one document. Released on drop.
    pub async fn acquire(&self, kind: DocumentKind, id: impl ToString) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Entries nobody holds or waits on can go.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry((kind, id.to_string())).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of documents currently locked or awaited.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .map(|locks| locks.values().filter(|l| Arc::strong_count(l) > 1).count())
            .unwrap_or(0)
    }
}
