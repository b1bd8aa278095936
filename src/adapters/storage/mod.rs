//! Storage Adapters
//!
//! Implementations of the SessionStore port for persisting governance documents.
//!
//! ## Available Adapters
//!
//! - **FileSessionStore** - Stores documents as JSON files on disk
//! - **InMemorySessionStore** - Stores documents in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSessionStore, InMemorySessionStore};
//!
//! // Production: file-based storage
//! let store = FileSessionStore::new("./governance");
//!
//! // Testing: in-memory storage
//! let store = InMemorySessionStore::new();
//! ```

mod file_session_store;
mod in_memory_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;
