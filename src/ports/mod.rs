//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the governance core and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - document persistence for cycles and sessions
//! - `ContentGenerator` - topics, node text, syntheses, quality judgements
//! - `MemoryAtomSink` - durable store for memory atoms

mod content_generator;
mod memory_atom_sink;
mod session_store;

pub use content_generator::{ContentGenerator, GenerationError, SynthesisDraft};
pub use memory_atom_sink::{MemoryAtomSink, SinkError};
pub use session_store::{
    create_document, filter_and_order, list_documents, load_document, save_document,
    validate_document_id, DocumentKind, SessionStore, StoreError, StoredDocument,
};
