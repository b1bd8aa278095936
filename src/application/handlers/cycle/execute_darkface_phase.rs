//! ExecuteDarkfacePhaseHandler - Command handler for the synthesis phase.
//!
//! Starts a synthesis over the cycle's lightface exploration and records it
//! as the darkface phase. The darkface phase runs once, after the lightface
//! phase has completed.

use std::sync::Arc;

use crate::application::{SessionLocks, SynthesisEngine};
use crate::config::GovernanceConfig;
use crate::domain::cycle::{Cycle, PhaseType};
use crate::domain::foundation::{CycleId, ExplorationId, GovernanceError, Timestamp};
use crate::domain::synthesis::SynthesisSession;
use crate::ports::{save_document, DocumentKind, SessionStore};

use super::load_cycle;

/// Command to execute the darkface phase of a cycle.
#[derive(Debug, Clone)]
pub struct ExecuteDarkfacePhaseCommand {
    pub cycle_id: CycleId,
    /// Exploration to synthesize; the latest lightface phase's when `None`.
    pub exploration_id: Option<ExplorationId>,
}

/// Result of starting the darkface phase.
#[derive(Debug, Clone)]
pub struct ExecuteDarkfacePhaseResult {
    pub cycle: Cycle,
    pub synthesis: SynthesisSession,
}

/// Handler for darkface phases.
pub struct ExecuteDarkfacePhaseHandler {
    store: Arc<dyn SessionStore>,
    syntheses: Arc<SynthesisEngine>,
    config: Arc<GovernanceConfig>,
    locks: SessionLocks,
}

impl ExecuteDarkfacePhaseHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        syntheses: Arc<SynthesisEngine>,
        config: Arc<GovernanceConfig>,
        locks: SessionLocks,
    ) -> Self {
        Self {
            store,
            syntheses,
            config,
            locks,
        }
    }

    /// # Errors
    ///
    /// - `CycleNotFound`, `CycleNotActive`
    /// - `NoLightfaceFound` if the cycle has never run a lightface phase
    /// - `PhaseAlreadyActive` if the previous phase has not been completed
    /// - `PhaseOutOfOrder` if the cycle already ran its darkface phase
    /// - `ExplorationNotFound` if the target exploration does not exist
    pub async fn handle(
        &self,
        cmd: ExecuteDarkfacePhaseCommand,
    ) -> Result<ExecuteDarkfacePhaseResult, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Cycle, cmd.cycle_id).await;

        let mut cycle = load_cycle(&*self.store, cmd.cycle_id).await?;
        let synthesis = self.begin(&mut cycle, cmd.exploration_id).await?;
        save_document(&*self.store, &cycle).await?;

        Ok(ExecuteDarkfacePhaseResult { cycle, synthesis })
    }

    /// Starts the synthesis and appends the phase without saving the cycle.
    /// Callers hold the cycle lock.
    pub(super) async fn begin(
        &self,
        cycle: &mut Cycle,
        exploration_id: Option<ExplorationId>,
    ) -> Result<SynthesisSession, GovernanceError> {
        cycle.ensure_active()?;
        let target = cycle.resolve_synthesis_target(exploration_id)?;
        cycle.ensure_can_begin(PhaseType::Darkface)?;

        let policy = &self.config.darkface;
        let synthesis = self
            .syntheses
            .start_synthesis(target, &policy.title_for(cycle.name()), policy.criteria.clone())
            .await?;
        cycle.begin_darkface(&synthesis, Timestamp::now())?;

        tracing::info!(
            cycle_id = %cycle.id(),
            synthesis_id = %synthesis.id(),
            exploration_id = %target,
            "Darkface phase started"
        );
        Ok(synthesis)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{config, Deps};
    use super::*;
    use crate::domain::cycle::CyclePhase;
    use crate::domain::foundation::ErrorCategory;

    fn command(cycle_id: CycleId) -> ExecuteDarkfacePhaseCommand {
        ExecuteDarkfacePhaseCommand {
            cycle_id,
            exploration_id: None,
        }
    }

    #[tokio::test]
    async fn before_lightface_fails_with_no_lightface() {
        let deps = Deps::new(config("X", 0));
        let cycle = deps.started_cycle().await;

        let err = deps.darkface().handle(command(cycle.id())).await.unwrap_err();

        assert!(matches!(err, GovernanceError::NoLightfaceFound(_)));
        assert_eq!(err.category(), ErrorCategory::InvalidState);
    }

    #[tokio::test]
    async fn explicit_exploration_still_needs_lightface() {
        let deps = Deps::new(config("X", 0));
        let cycle = deps.started_cycle().await;
        let exploration = deps
            .explorations
            .start_exploration("Y", 1, vec![])
            .await
            .unwrap();

        let err = deps
            .darkface()
            .handle(ExecuteDarkfacePhaseCommand {
                cycle_id: cycle.id(),
                exploration_id: Some(exploration.id()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GovernanceError::NoLightfaceFound(_)));
    }

    #[tokio::test]
    async fn resolves_latest_lightface_exploration() {
        let deps = Deps::new(config("X", 4));
        let cycle = deps.cycle_with_completed_lightface().await;

        let result = deps.darkface().handle(command(cycle.id())).await.unwrap();

        assert_eq!(result.cycle.current_phase(), CyclePhase::Darkface);
        assert_eq!(
            result.synthesis.exploration_id(),
            result.cycle.phases()[0].exploration_id()
        );
        assert_eq!(result.synthesis.title(), "Synthesis of T");
    }

    #[tokio::test]
    async fn second_darkface_is_rejected() {
        let deps = Deps::new(config("X", 4));
        let cycle = deps.cycle_with_completed_lightface().await;
        deps.darkface().handle(command(cycle.id())).await.unwrap();
        deps.complete(cycle.id()).await;

        let err = deps.darkface().handle(command(cycle.id())).await.unwrap_err();

        assert!(matches!(err, GovernanceError::PhaseOutOfOrder { .. }));
        assert_eq!(deps.syntheses.list_syntheses(None).await.unwrap().len(), 1);
    }
}
