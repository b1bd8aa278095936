//! Exploration module - LightFace sessions and their node forest.

mod node;
mod session;

pub use node::{Branch, ExplorationNode};
pub use session::{derive_effective_status, ExplorationResults, ExplorationSession, MAX_DURATION_DAYS};
