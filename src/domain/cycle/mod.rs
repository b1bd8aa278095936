//! Cycle module - the two-phase research cycle and its summary.

mod aggregate;
mod phase;
mod summary;

pub use aggregate::Cycle;
pub use phase::{CyclePhase, Phase, PhaseDetails, PhaseOutcome, PhaseType};
pub use summary::{generate_summary, CycleReport, QualityBand};
