//! Cycle policy: what each phase explores and synthesizes.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::domain::cycle::PhaseType;
use crate::domain::exploration::MAX_DURATION_DAYS;
use crate::domain::synthesis::Criterion;

/// Settings for the LightFace (exploration) phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightfacePolicy {
    /// Topic each exploration starts from
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Exploration window in days
    #[serde(default = "default_duration")]
    pub duration: u32,

    #[serde(default)]
    pub constraints: Vec<String>,

    /// Nodes generated when the phase starts. Zero leaves the exploration empty.
    #[serde(default = "default_node_count")]
    pub node_count: usize,
}

fn default_topic() -> String {
    "cognitive architecture".to_string()
}

fn default_duration() -> u32 {
    2
}

fn default_node_count() -> usize {
    10
}

impl Default for LightfacePolicy {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            duration: default_duration(),
            constraints: Vec::new(),
            node_count: default_node_count(),
        }
    }
}

impl LightfacePolicy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::MissingRequired("lightface.topic"));
        }
        if self.duration == 0 || self.duration > MAX_DURATION_DAYS {
            return Err(ValidationError::InvalidDuration(self.duration));
        }
        Ok(())
    }
}

/// Settings for the DarkFace (synthesis) phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DarkfacePolicy {
    /// Synthesis title; `Synthesis of <cycle name>` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl DarkfacePolicy {
    pub fn title_for(&self, cycle_name: &str) -> String {
        match &self.title {
            Some(title) if !title.trim().is_empty() => title.clone(),
            _ => format!("Synthesis of {}", cycle_name),
        }
    }
}

/// Settings for whole-cycle runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePolicy {
    /// Start the darkface phase as soon as the lightface phase completes
    #[serde(default)]
    pub auto_advance: bool,

    /// Phases `run_cycle` walks through: lightface, optionally followed by
    /// darkface
    #[serde(default = "default_phases")]
    pub phases: Vec<PhaseType>,
}

fn default_phases() -> Vec<PhaseType> {
    vec![PhaseType::Lightface, PhaseType::Darkface]
}

impl Default for CyclePolicy {
    fn default() -> Self {
        Self {
            auto_advance: false,
            phases: default_phases(),
        }
    }
}

const PHASE_ORDER: [PhaseType; 2] = [PhaseType::Lightface, PhaseType::Darkface];

impl CyclePolicy {
    /// A cycle runs each phase at most once, lightface first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.phases.is_empty() && PHASE_ORDER.starts_with(&self.phases) {
            Ok(())
        } else {
            Err(ValidationError::InvalidPhaseOrder)
        }
    }
}
