//! Synthesis module - DarkFace sessions, synthesis nodes and memory atoms.

mod memory_atom;
mod node;
mod session;

pub use memory_atom::{AtomLink, MemoryAtom, MEMORY_ATOM_QUALITY_THRESHOLD};
pub use node::{Criterion, SynthesisNode};
pub use session::{SynthesisResults, SynthesisSession};
