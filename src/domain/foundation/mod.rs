//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the governance domain.

mod errors;
mod ids;
mod quality_score;
mod session_status;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCategory, ErrorCode, GovernanceError, ValidationError};
pub use ids::{ClusterId, CycleId, ExplorationId, NodeId, SynthesisId, SynthesisNodeId};
pub use quality_score::QualityScore;
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
