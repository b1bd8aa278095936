//! Cycle aggregate - sequences exploration and synthesis phases.
//!
//! A Cycle owns its phase records by value. Phases are appended, never
//! removed, and at most one is active at a time. Once the cycle completes it
//! is immutable.

use serde::{Deserialize, Serialize};

use crate::domain::exploration::ExplorationSession;
use crate::domain::foundation::{
    CycleId, ExplorationId, GovernanceError, SessionStatus, StateMachine, Timestamp,
    ValidationError,
};
use crate::domain::synthesis::SynthesisSession;

use super::{CyclePhase, Phase, PhaseDetails, PhaseOutcome, PhaseType};

/// The Cycle aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    id: CycleId,
    name: String,
    config_name: String,
    status: SessionStatus,
    phases: Vec<Phase>,
    current_phase: CyclePhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    start_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completion_time: Option<Timestamp>,
    updated_at: Timestamp,
}

impl Cycle {
    /// Creates an active cycle with no phases.
    pub fn start(
        name: impl Into<String>,
        config_name: impl Into<String>,
    ) -> Result<Self, GovernanceError> {
        Self::start_at(name, config_name, Timestamp::now())
    }

    pub fn start_at(
        name: impl Into<String>,
        config_name: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, GovernanceError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }

        Ok(Self {
            id: CycleId::new(),
            name,
            config_name: config_name.into(),
            status: SessionStatus::Active,
            phases: Vec::new(),
            current_phase: CyclePhase::Init,
            summary: None,
            start_time: now,
            completion_time: None,
            updated_at: now,
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the policy the cycle was run under.
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn current_phase(&self) -> CyclePhase {
        self.current_phase
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn completion_time(&self) -> Option<Timestamp> {
        self.completion_time
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// The running phase, if any.
    pub fn active_phase(&self) -> Option<&Phase> {
        self.phases.last().filter(|p| p.is_active())
    }

    /// The most recent lightface phase.
    pub fn latest_lightface(&self) -> Option<&Phase> {
        self.phases
            .iter()
            .rev()
            .find(|p| p.phase_type() == PhaseType::Lightface)
    }

    /// The phase `complete_phase` would act on.
    ///
    /// # Errors
    ///
    /// - `NoActivePhase` if no phase has been started
    /// - `PhaseNotActive` if the latest phase is already completed
    pub fn pending_phase(&self) -> Result<&Phase, GovernanceError> {
        let last = self
            .phases
            .last()
            .ok_or(GovernanceError::NoActivePhase(self.id))?;
        if last.is_active() {
            Ok(last)
        } else {
            Err(GovernanceError::PhaseNotActive(self.id))
        }
    }

    /// The phase type the cycle runs next, or `None` once both have run.
    ///
    /// A cycle runs exactly one lightface phase followed by exactly one
    /// darkface phase.
    pub fn next_phase_type(&self) -> Option<PhaseType> {
        match self.phases.as_slice() {
            [] => Some(PhaseType::Lightface),
            [only] if only.phase_type() == PhaseType::Lightface => Some(PhaseType::Darkface),
            _ => None,
        }
    }

    /// Decides which exploration a new darkface phase synthesizes.
    ///
    /// A prior lightface phase is always required; `explicit` only overrides
    /// which exploration is used.
    pub fn resolve_synthesis_target(
        &self,
        explicit: Option<ExplorationId>,
    ) -> Result<ExplorationId, GovernanceError> {
        let latest = self
            .latest_lightface()
            .ok_or(GovernanceError::NoLightfaceFound(self.id))?;
        Ok(explicit.unwrap_or_else(|| latest.exploration_id()))
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    pub fn ensure_active(&self) -> Result<(), GovernanceError> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(GovernanceError::CycleNotActive(self.id))
        }
    }

    /// Fails while another phase is still running.
    pub fn ensure_no_active_phase(&self) -> Result<(), GovernanceError> {
        if self.active_phase().is_some() {
            Err(GovernanceError::PhaseAlreadyActive(self.id))
        } else {
            Ok(())
        }
    }

    /// Checks that a phase of `phase_type` may start now.
    ///
    /// # Errors
    ///
    /// - `CycleNotActive` if the cycle is completed
    /// - `NoLightfaceFound` for a darkface phase with no lightface before it
    /// - `PhaseAlreadyActive` while the previous phase is running
    /// - `PhaseOutOfOrder` if `phase_type` is not the next phase of the cycle
    pub fn ensure_can_begin(&self, phase_type: PhaseType) -> Result<(), GovernanceError> {
        self.ensure_active()?;
        if phase_type == PhaseType::Darkface && self.latest_lightface().is_none() {
            return Err(GovernanceError::NoLightfaceFound(self.id));
        }
        self.ensure_no_active_phase()?;
        if self.next_phase_type() != Some(phase_type) {
            return Err(GovernanceError::PhaseOutOfOrder {
                cycle_id: self.id,
                phase: phase_type.to_string(),
            });
        }
        Ok(())
    }

    /// Appends a lightface phase for a freshly started exploration.
    pub fn begin_lightface(
        &mut self,
        exploration: &ExplorationSession,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.ensure_can_begin(PhaseType::Lightface)?;
        let next = self.current_phase.transition_to(CyclePhase::Lightface)?;

        self.phases.push(Phase::lightface(
            exploration.id(),
            exploration.topic(),
            exploration.end_time(),
            now,
        ));
        self.current_phase = next;
        self.updated_at = now;
        Ok(())
    }

    /// Appends a darkface phase for a freshly started synthesis.
    pub fn begin_darkface(
        &mut self,
        synthesis: &SynthesisSession,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.ensure_can_begin(PhaseType::Darkface)?;
        let next = self.current_phase.transition_to(CyclePhase::Darkface)?;

        self.phases.push(Phase::darkface(
            synthesis.id(),
            synthesis.exploration_id(),
            synthesis.title(),
            now,
        ));
        self.current_phase = next;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the running phase completed and records its results.
    pub fn complete_pending_phase(
        &mut self,
        outcome: PhaseOutcome,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.ensure_active()?;
        self.pending_phase()?;
        let next = self.current_phase.transition_to(CyclePhase::Complete)?;

        let id = self.id;
        let phase = self
            .phases
            .last_mut()
            .ok_or(GovernanceError::NoActivePhase(id))?;
        let phase_type = phase.phase_type();
        match (&mut phase.details, outcome) {
            (PhaseDetails::Lightface { results, .. }, PhaseOutcome::Exploration(r)) => {
                *results = Some(r)
            }
            (PhaseDetails::Darkface { results, .. }, PhaseOutcome::Synthesis(r)) => {
                *results = Some(r)
            }
            _ => {
                return Err(ValidationError::invalid_format(
                    "phase_results",
                    format!("results do not match a {} phase", phase_type),
                )
                .into())
            }
        }
        phase.status = phase.status.transition_to(SessionStatus::Completed)?;
        phase.end_time = Some(now);

        self.current_phase = next;
        self.updated_at = now;
        Ok(())
    }

    /// Completes the cycle. Any running phase must have been completed first.
    pub fn complete(&mut self, summary: String, now: Timestamp) -> Result<(), GovernanceError> {
        self.ensure_active()?;
        if self.active_phase().is_some() {
            return Err(GovernanceError::PhaseAlreadyActive(self.id));
        }
        self.status = self.status.transition_to(SessionStatus::Completed)?;
        self.summary = Some(summary);
        self.completion_time = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exploration::ExplorationResults;
    use crate::domain::synthesis::SynthesisResults;

    fn exploration() -> ExplorationSession {
        ExplorationSession::start("X", 2, vec![]).unwrap()
    }

    fn light_results() -> PhaseOutcome {
        PhaseOutcome::Exploration(ExplorationResults {
            nodes_created: 10,
            branches_created: 7,
            unique_tags: 5,
        })
    }

    fn dark_results() -> PhaseOutcome {
        PhaseOutcome::Synthesis(SynthesisResults {
            clusters_created: 3,
            nodes_created: 4,
            quality_score: 0.8,
        })
    }

    #[test]
    fn new_cycle_starts_in_init() {
        let cycle = Cycle::start("T1", "Default").unwrap();
        assert_eq!(cycle.current_phase(), CyclePhase::Init);
        assert_eq!(cycle.status(), SessionStatus::Active);
        assert!(cycle.phases().is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(Cycle::start(" ", "Default").is_err());
    }

    #[test]
    fn lightface_then_darkface_sequence() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        let e = exploration();
        let now = Timestamp::now();

        cycle.begin_lightface(&e, now).unwrap();
        assert_eq!(cycle.current_phase(), CyclePhase::Lightface);
        cycle.complete_pending_phase(light_results(), now).unwrap();
        assert_eq!(cycle.current_phase(), CyclePhase::Complete);

        let target = cycle.resolve_synthesis_target(None).unwrap();
        assert_eq!(target, e.id());
        let s = SynthesisSession::start(&e, "S", vec![]).unwrap();
        cycle.begin_darkface(&s, now).unwrap();
        assert_eq!(cycle.current_phase(), CyclePhase::Darkface);
        cycle.complete_pending_phase(dark_results(), now).unwrap();

        assert_eq!(cycle.phases().len(), 2);
        assert!(cycle.phases().iter().all(|p| !p.is_active()));
    }

    #[test]
    fn second_lightface_is_out_of_order() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        cycle.begin_lightface(&exploration(), Timestamp::now()).unwrap();
        cycle.complete_pending_phase(light_results(), Timestamp::now()).unwrap();
        assert_eq!(cycle.next_phase_type(), Some(PhaseType::Darkface));

        let result = cycle.begin_lightface(&exploration(), Timestamp::now());

        assert!(matches!(result, Err(GovernanceError::PhaseOutOfOrder { .. })));
        assert_eq!(cycle.phases().len(), 1);
        assert_eq!(cycle.current_phase(), CyclePhase::Complete);
    }

    #[test]
    fn no_phase_follows_darkface() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        let e = exploration();
        let now = Timestamp::now();
        cycle.begin_lightface(&e, now).unwrap();
        cycle.complete_pending_phase(light_results(), now).unwrap();
        let s = SynthesisSession::start(&e, "S", vec![]).unwrap();
        cycle.begin_darkface(&s, now).unwrap();
        cycle.complete_pending_phase(dark_results(), now).unwrap();
        assert_eq!(cycle.next_phase_type(), None);

        assert!(matches!(
            cycle.ensure_can_begin(PhaseType::Darkface),
            Err(GovernanceError::PhaseOutOfOrder { .. })
        ));
        assert!(matches!(
            cycle.begin_lightface(&exploration(), now),
            Err(GovernanceError::PhaseOutOfOrder { .. })
        ));
    }

    #[test]
    fn only_one_phase_may_be_active() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        cycle.begin_lightface(&exploration(), Timestamp::now()).unwrap();
        let result = cycle.begin_lightface(&exploration(), Timestamp::now());
        assert!(matches!(result, Err(GovernanceError::PhaseAlreadyActive(_))));
    }

    #[test]
    fn darkface_requires_lightface_even_with_explicit_exploration() {
        let cycle = Cycle::start("T1", "Default").unwrap();
        let result = cycle.resolve_synthesis_target(Some(ExplorationId::new()));
        assert!(matches!(result, Err(GovernanceError::NoLightfaceFound(_))));
    }

    #[test]
    fn explicit_exploration_overrides_latest_lightface() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        cycle.begin_lightface(&exploration(), Timestamp::now()).unwrap();
        let other = ExplorationId::new();
        assert_eq!(cycle.resolve_synthesis_target(Some(other)).unwrap(), other);
    }

    #[test]
    fn pending_phase_errors() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        assert!(matches!(
            cycle.pending_phase(),
            Err(GovernanceError::NoActivePhase(_))
        ));
        cycle.begin_lightface(&exploration(), Timestamp::now()).unwrap();
        cycle.complete_pending_phase(light_results(), Timestamp::now()).unwrap();
        assert!(matches!(
            cycle.pending_phase(),
            Err(GovernanceError::PhaseNotActive(_))
        ));
    }

    #[test]
    fn mismatched_results_are_rejected() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        cycle.begin_lightface(&exploration(), Timestamp::now()).unwrap();
        let result = cycle.complete_pending_phase(dark_results(), Timestamp::now());
        assert!(matches!(result, Err(GovernanceError::Validation(_))));
        assert!(cycle.active_phase().is_some());
    }

    #[test]
    fn completed_cycle_is_immutable() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        cycle.complete("done".into(), Timestamp::now()).unwrap();
        assert!(matches!(
            cycle.begin_lightface(&exploration(), Timestamp::now()),
            Err(GovernanceError::CycleNotActive(_))
        ));
        assert!(matches!(
            cycle.complete("again".into(), Timestamp::now()),
            Err(GovernanceError::CycleNotActive(_))
        ));
    }

    #[test]
    fn cycle_roundtrips_through_json() {
        let mut cycle = Cycle::start("T1", "Default").unwrap();
        cycle.begin_lightface(&exploration(), Timestamp::now()).unwrap();
        let json = serde_json::to_value(&cycle).unwrap();
        assert_eq!(json["current_phase"], "lightface");
        assert_eq!(json["phases"][0]["type"], "lightface");
        let back: Cycle = serde_json::from_value(json).unwrap();
        assert_eq!(back, cycle);
    }
}
