//! Memory atom sink adapters.
//!
//! - **FileMemoryAtomSink** - one JSON file per atom
//! - **InMemoryMemoryAtomSink** - keeps atoms in memory (testing/development)

mod file_memory_atom_sink;
mod in_memory_memory_atom_sink;

pub use file_memory_atom_sink::FileMemoryAtomSink;
pub use in_memory_memory_atom_sink::InMemoryMemoryAtomSink;
