//! Cycle phases and the phase marker state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::exploration::ExplorationResults;
use crate::domain::foundation::{
    ExplorationId, SessionStatus, StateMachine, SynthesisId, Timestamp,
};
use crate::domain::synthesis::SynthesisResults;

/// Which part of the cycle is currently running.
///
/// Valid transitions:
/// - Init -> Lightface
/// - Lightface -> Complete
/// - Complete -> Darkface
/// - Darkface -> Complete
///
/// `Complete` means the current phase is complete. Whether a darkface phase
/// may still follow depends on the cycle's phase list, which the `Cycle`
/// aggregate checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Init,
    Lightface,
    Darkface,
    Complete,
}

impl StateMachine for CyclePhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CyclePhase::*;
        matches!(
            (self, target),
            (Init, Lightface)
                | (Lightface, Complete)
                | (Complete, Darkface)
                | (Darkface, Complete)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CyclePhase::*;
        match self {
            Init => vec![Lightface],
            Lightface => vec![Complete],
            Complete => vec![Darkface],
            Darkface => vec![Complete],
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CyclePhase::Init => "init",
            CyclePhase::Lightface => "lightface",
            CyclePhase::Darkface => "darkface",
            CyclePhase::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

/// The two kinds of work a cycle alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    Lightface,
    Darkface,
}

impl PhaseType {
    /// Marker the cycle moves to while a phase of this type runs.
    pub fn marker(&self) -> CyclePhase {
        match self {
            PhaseType::Lightface => CyclePhase::Lightface,
            PhaseType::Darkface => CyclePhase::Darkface,
        }
    }
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// Type-specific fields of a phase record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseDetails {
    Lightface {
        exploration_id: ExplorationId,
        topic: String,
        planned_end_time: Timestamp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        results: Option<ExplorationResults>,
    },
    Darkface {
        synthesis_id: SynthesisId,
        exploration_id: ExplorationId,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        results: Option<SynthesisResults>,
    },
}

/// Results recorded when a phase completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseOutcome {
    Exploration(ExplorationResults),
    Synthesis(SynthesisResults),
}

/// One executed phase of a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(flatten)]
    pub details: PhaseDetails,
    pub status: SessionStatus,
    pub start_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
}

impl Phase {
    pub fn lightface(
        exploration_id: ExplorationId,
        topic: impl Into<String>,
        planned_end_time: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            details: PhaseDetails::Lightface {
                exploration_id,
                topic: topic.into(),
                planned_end_time,
                results: None,
            },
            status: SessionStatus::Active,
            start_time: now,
            end_time: None,
        }
    }

    pub fn darkface(
        synthesis_id: SynthesisId,
        exploration_id: ExplorationId,
        title: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            details: PhaseDetails::Darkface {
                synthesis_id,
                exploration_id,
                title: title.into(),
                results: None,
            },
            status: SessionStatus::Active,
            start_time: now,
            end_time: None,
        }
    }

    pub fn phase_type(&self) -> PhaseType {
        match self.details {
            PhaseDetails::Lightface { .. } => PhaseType::Lightface,
            PhaseDetails::Darkface { .. } => PhaseType::Darkface,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The session this phase drives: the exploration for lightface, the
    /// synthesis for darkface.
    pub fn reference_id(&self) -> String {
        match &self.details {
            PhaseDetails::Lightface { exploration_id, .. } => exploration_id.to_string(),
            PhaseDetails::Darkface { synthesis_id, .. } => synthesis_id.to_string(),
        }
    }

    /// The exploration explored (lightface) or synthesized (darkface).
    pub fn exploration_id(&self) -> ExplorationId {
        match &self.details {
            PhaseDetails::Lightface { exploration_id, .. }
            | PhaseDetails::Darkface { exploration_id, .. } => *exploration_id,
        }
    }

    pub fn topic(&self) -> Option<&str> {
        match &self.details {
            PhaseDetails::Lightface { topic, .. } => Some(topic),
            PhaseDetails::Darkface { .. } => None,
        }
    }

    pub fn exploration_results(&self) -> Option<&ExplorationResults> {
        match &self.details {
            PhaseDetails::Lightface { results, .. } => results.as_ref(),
            PhaseDetails::Darkface { .. } => None,
        }
    }

    pub fn synthesis_results(&self) -> Option<&SynthesisResults> {
        match &self.details {
            PhaseDetails::Darkface { results, .. } => results.as_ref(),
            PhaseDetails::Lightface { .. } => None,
        }
    }
}
