//! ExecuteLightfacePhaseHandler - Command handler for the exploration phase.
//!
//! Starts an exploration from the lightface policy, grows it with generated
//! nodes, and records it as the cycle's lightface phase. A cycle runs exactly
//! one lightface phase, before anything else.

use std::sync::Arc;

use crate::application::{ExplorationEngine, SessionLocks};
use crate::config::GovernanceConfig;
use crate::domain::cycle::{Cycle, PhaseType};
use crate::domain::exploration::ExplorationSession;
use crate::domain::foundation::{CycleId, GovernanceError, Timestamp};
use crate::ports::{save_document, DocumentKind, SessionStore};

use super::load_cycle;

/// Command to execute the lightface phase of a cycle.
#[derive(Debug, Clone)]
pub struct ExecuteLightfacePhaseCommand {
    pub cycle_id: CycleId,
}

/// Result of starting the lightface phase.
#[derive(Debug, Clone)]
pub struct ExecuteLightfacePhaseResult {
    pub cycle: Cycle,
    /// The exploration the phase drives, already grown.
    pub exploration: ExplorationSession,
}

/// Handler for lightface phases.
pub struct ExecuteLightfacePhaseHandler {
    store: Arc<dyn SessionStore>,
    explorations: Arc<ExplorationEngine>,
    config: Arc<GovernanceConfig>,
    locks: SessionLocks,
}

impl ExecuteLightfacePhaseHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        explorations: Arc<ExplorationEngine>,
        config: Arc<GovernanceConfig>,
        locks: SessionLocks,
    ) -> Self {
        Self {
            store,
            explorations,
            config,
            locks,
        }
    }

    /// # Errors
    ///
    /// - `CycleNotFound`, `CycleNotActive`
    /// - `PhaseAlreadyActive` if the previous phase has not been completed
    /// - `PhaseOutOfOrder` if the cycle already ran its lightface phase
    pub async fn handle(
        &self,
        cmd: ExecuteLightfacePhaseCommand,
    ) -> Result<ExecuteLightfacePhaseResult, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Cycle, cmd.cycle_id).await;

        // 1. Load and check the cycle can take a lightface phase
        let mut cycle = load_cycle(&*self.store, cmd.cycle_id).await?;
        cycle.ensure_can_begin(PhaseType::Lightface)?;

        // 2. Start the exploration from policy
        let policy = &self.config.lightface;
        let mut exploration = self
            .explorations
            .start_exploration(&policy.topic, policy.duration, policy.constraints.clone())
            .await?;
        if policy.node_count > 0 {
            exploration = self
                .explorations
                .grow_exploration(exploration.id(), policy.node_count)
                .await?;
        }

        // 3. Record the phase
        cycle.begin_lightface(&exploration, Timestamp::now())?;
        save_document(&*self.store, &cycle).await?;

        tracing::info!(
            cycle_id = %cmd.cycle_id,
            exploration_id = %exploration.id(),
            topic = %exploration.topic(),
            "Lightface phase started"
        );
        Ok(ExecuteLightfacePhaseResult { cycle, exploration })
    }
}
