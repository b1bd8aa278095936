//! CompleteCycleHandler - Command handler for completing a cycle.
//!
//! Completing a cycle first completes any running phase, then renders the
//! summary from the recorded phase results unless one is supplied.

use std::sync::Arc;

use crate::application::SessionLocks;
use crate::domain::cycle::{generate_summary, Cycle};
use crate::domain::foundation::{CycleId, GovernanceError, Timestamp};
use crate::ports::{save_document, DocumentKind, SessionStore};

use super::{load_cycle, CompletePhaseHandler};

/// Command to complete a cycle.
#[derive(Debug, Clone)]
pub struct CompleteCycleCommand {
    pub cycle_id: CycleId,
    /// Summary to store instead of the generated one.
    pub summary: Option<String>,
}

/// Result of completing a cycle.
#[derive(Debug, Clone)]
pub struct CompleteCycleResult {
    pub cycle: Cycle,
}

/// Handler for completing cycles.
pub struct CompleteCycleHandler {
    store: Arc<dyn SessionStore>,
    phases: Arc<CompletePhaseHandler>,
    locks: SessionLocks,
}

impl CompleteCycleHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        phases: Arc<CompletePhaseHandler>,
        locks: SessionLocks,
    ) -> Self {
        Self {
            store,
            phases,
            locks,
        }
    }

    /// # Errors
    ///
    /// - `CycleNotFound`, `CycleNotActive`
    /// - any error from completing the running phase
    pub async fn handle(
        &self,
        cmd: CompleteCycleCommand,
    ) -> Result<CompleteCycleResult, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Cycle, cmd.cycle_id).await;

        // 1. Load and close any running phase
        let mut cycle = load_cycle(&*self.store, cmd.cycle_id).await?;
        cycle.ensure_active()?;
        if cycle.active_phase().is_some() {
            self.phases.complete_pending(&mut cycle).await?;
        }

        // 2. Complete with the supplied or generated summary
        let now = Timestamp::now();
        let summary = cmd.summary.unwrap_or_else(|| generate_summary(&cycle, now));
        cycle.complete(summary, now)?;
        save_document(&*self.store, &cycle).await?;

        tracing::info!(
            cycle_id = %cmd.cycle_id,
            phases = cycle.phases().len(),
            "Cycle completed"
        );
        Ok(CompleteCycleResult { cycle })
    }
}
