//! Error types for the governance domain.

use std::fmt;
use thiserror::Error;

use super::{CycleId, ExplorationId, NodeId, SynthesisId};

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Broad classification callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    InvalidState,
    Validation,
    Persistence,
    /// A collaborator outside the core (content generator, memory sink) failed.
    External,
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    ParentNotFound,
    UnknownMethod,
    NoNodesToCluster,

    // Not found errors
    ExplorationNotFound,
    SynthesisNotFound,
    CycleNotFound,

    // State errors
    AlreadyExists,
    SessionNotActive,
    SynthesisNotActive,
    SynthesisAlreadyFinalized,
    CycleNotActive,
    NoActivePhase,
    PhaseNotActive,
    PhaseAlreadyActive,
    PhaseOutOfOrder,
    NoLightfaceFound,
    InvalidStateTransition,

    // Infrastructure errors
    PersistenceError,
    ContentGenerationError,
    MemorySinkError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::ParentNotFound => "PARENT_NOT_FOUND",
            ErrorCode::UnknownMethod => "UNKNOWN_METHOD",
            ErrorCode::ExplorationNotFound => "EXPLORATION_NOT_FOUND",
            ErrorCode::SynthesisNotFound => "SYNTHESIS_NOT_FOUND",
            ErrorCode::CycleNotFound => "CYCLE_NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::SessionNotActive => "SESSION_NOT_ACTIVE",
            ErrorCode::SynthesisNotActive => "SYNTHESIS_NOT_ACTIVE",
            ErrorCode::SynthesisAlreadyFinalized => "SYNTHESIS_ALREADY_FINALIZED",
            ErrorCode::CycleNotActive => "CYCLE_NOT_ACTIVE",
            ErrorCode::NoActivePhase => "NO_ACTIVE_PHASE",
            ErrorCode::PhaseNotActive => "PHASE_NOT_ACTIVE",
            ErrorCode::PhaseAlreadyActive => "PHASE_ALREADY_ACTIVE",
            ErrorCode::PhaseOutOfOrder => "PHASE_OUT_OF_ORDER",
            ErrorCode::NoLightfaceFound => "NO_LIGHTFACE_FOUND",
            ErrorCode::NoNodesToCluster => "NO_NODES_TO_CLUSTER",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::PersistenceError => "PERSISTENCE_ERROR",
            ErrorCode::ContentGenerationError => "CONTENT_GENERATION_ERROR",
            ErrorCode::MemorySinkError => "MEMORY_SINK_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Every failure an engine or the orchestrator can report.
#[derive(Debug, Clone, Error)]
pub enum GovernanceError {
    #[error("Exploration session not found: {0}")]
    ExplorationNotFound(ExplorationId),

    #[error("Synthesis session not found: {0}")]
    SynthesisNotFound(SynthesisId),

    #[error("Cycle not found: {0}")]
    CycleNotFound(CycleId),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Exploration session {0} is not active")]
    SessionNotActive(ExplorationId),

    #[error("Synthesis session {0} is not active")]
    SynthesisNotActive(SynthesisId),

    #[error("Synthesis session {0} has already been finalized")]
    SynthesisAlreadyFinalized(SynthesisId),

    #[error("Cycle {0} is not active")]
    CycleNotActive(CycleId),

    #[error("Cycle {0} has no phases")]
    NoActivePhase(CycleId),

    #[error("The current phase of cycle {0} is not active")]
    PhaseNotActive(CycleId),

    #[error("Cycle {0} already has an active phase")]
    PhaseAlreadyActive(CycleId),

    #[error("Cycle {cycle_id} cannot start a {phase} phase now")]
    PhaseOutOfOrder { cycle_id: CycleId, phase: String },

    #[error("Cycle {0} has no lightface phase to synthesize")]
    NoLightfaceFound(CycleId),

    #[error("Exploration {exploration_id} has no nodes to cluster")]
    NoNodesToCluster { exploration_id: ExplorationId },

    #[error("Parent node {parent_id} not found in exploration {exploration_id}")]
    ParentNotFound {
        exploration_id: ExplorationId,
        parent_id: NodeId,
    },

    #[error("Unknown clustering method: {0}")]
    UnknownMethod(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Content generation failed: {0}")]
    ContentGeneration(String),

    #[error("Memory atom emission failed: {0}")]
    MemorySink(String),
}

impl GovernanceError {
    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        use GovernanceError::*;
        match self {
            ExplorationNotFound(_) | SynthesisNotFound(_) | CycleNotFound(_) => {
                ErrorCategory::NotFound
            }
            AlreadyExists(_)
            | SessionNotActive(_)
            | SynthesisNotActive(_)
            | SynthesisAlreadyFinalized(_)
            | CycleNotActive(_)
            | NoActivePhase(_)
            | PhaseNotActive(_)
            | PhaseAlreadyActive(_)
            | PhaseOutOfOrder { .. }
            | NoLightfaceFound(_) => ErrorCategory::InvalidState,
            Validation(ValidationError::InvalidFormat { field, .. })
                if field == "state_transition" =>
            {
                ErrorCategory::InvalidState
            }
            ParentNotFound { .. } | NoNodesToCluster { .. } | UnknownMethod(_) | Validation(_) => {
                ErrorCategory::Validation
            }
            Persistence(_) => ErrorCategory::Persistence,
            ContentGeneration(_) | MemorySink(_) => ErrorCategory::External,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> ErrorCode {
        use GovernanceError::*;
        match self {
            ExplorationNotFound(_) => ErrorCode::ExplorationNotFound,
            SynthesisNotFound(_) => ErrorCode::SynthesisNotFound,
            CycleNotFound(_) => ErrorCode::CycleNotFound,
            AlreadyExists(_) => ErrorCode::AlreadyExists,
            SessionNotActive(_) => ErrorCode::SessionNotActive,
            SynthesisNotActive(_) => ErrorCode::SynthesisNotActive,
            SynthesisAlreadyFinalized(_) => ErrorCode::SynthesisAlreadyFinalized,
            CycleNotActive(_) => ErrorCode::CycleNotActive,
            NoActivePhase(_) => ErrorCode::NoActivePhase,
            PhaseNotActive(_) => ErrorCode::PhaseNotActive,
            PhaseAlreadyActive(_) => ErrorCode::PhaseAlreadyActive,
            PhaseOutOfOrder { .. } => ErrorCode::PhaseOutOfOrder,
            NoLightfaceFound(_) => ErrorCode::NoLightfaceFound,
            NoNodesToCluster { .. } => ErrorCode::NoNodesToCluster,
            ParentNotFound { .. } => ErrorCode::ParentNotFound,
            UnknownMethod(_) => ErrorCode::UnknownMethod,
            Validation(ValidationError::InvalidFormat { field, .. })
                if field == "state_transition" =>
            {
                ErrorCode::InvalidStateTransition
            }
            Validation(_) => ErrorCode::ValidationFailed,
            Persistence(_) => ErrorCode::PersistenceError,
            ContentGeneration(_) => ErrorCode::ContentGenerationError,
            MemorySink(_) => ErrorCode::MemorySinkError,
        }
    }
}
