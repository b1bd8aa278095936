//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the governance core to external systems:
//! - `storage` - SessionStore implementations (file, in-memory)
//! - `content` - ContentGenerator implementations (templates, mock)
//! - `memory` - MemoryAtomSink implementations (file, in-memory)

pub mod content;
pub mod memory;
pub mod storage;

pub use content::{MockContentGenerator, TemplateContentGenerator};
pub use memory::{FileMemoryAtomSink, InMemoryMemoryAtomSink};
pub use storage::{FileSessionStore, InMemorySessionStore};
