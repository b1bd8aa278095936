//! Application layer - engines and handlers that coordinate domain aggregates
//! and ports.
//!
//! - `ExplorationEngine` - LightFace session lifecycle
//! - `SynthesisEngine` - DarkFace session lifecycle and memory atoms
//! - `handlers::cycle` - one command or query handler per cycle operation
//! - `CycleOrchestrator` - facade wiring the engines and cycle handlers
//!
//! Each operation is a load, mutate, persist cycle on one document,
//! serialized per document id through `SessionLocks`.

mod cycle_orchestrator;
mod exploration_engine;
pub mod handlers;
mod session_locks;
mod synthesis_engine;

pub use cycle_orchestrator::CycleOrchestrator;
pub use exploration_engine::ExplorationEngine;
pub use session_locks::SessionLocks;
pub use synthesis_engine::SynthesisEngine;
