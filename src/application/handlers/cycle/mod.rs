//! Cycle command and query handlers.
//!
//! Every command handler serializes on the cycle id through the shared
//! `SessionLocks`, then loads, mutates and saves the cycle document.

// Command handlers
mod complete_cycle;
mod complete_phase;
mod execute_darkface_phase;
mod execute_lightface_phase;
mod start_cycle;

// Query handlers
mod get_cycle;
mod list_cycles;

#[cfg(test)]
mod testing;

pub use complete_cycle::{CompleteCycleCommand, CompleteCycleHandler, CompleteCycleResult};
pub use complete_phase::{CompletePhaseCommand, CompletePhaseHandler, CompletePhaseResult};
pub use execute_darkface_phase::{
    ExecuteDarkfacePhaseCommand, ExecuteDarkfacePhaseHandler, ExecuteDarkfacePhaseResult,
};
pub use execute_lightface_phase::{
    ExecuteLightfacePhaseCommand, ExecuteLightfacePhaseHandler, ExecuteLightfacePhaseResult,
};
pub use start_cycle::{StartCycleCommand, StartCycleHandler, StartCycleResult};

pub use get_cycle::{GetCycleHandler, GetCycleQuery, GetCycleResult};
pub use list_cycles::{ListCyclesHandler, ListCyclesQuery, ListCyclesResult};

use crate::domain::cycle::Cycle;
use crate::domain::foundation::{CycleId, GovernanceError};
use crate::ports::{load_document, SessionStore, StoreError};

async fn load_cycle(store: &dyn SessionStore, cycle_id: CycleId) -> Result<Cycle, GovernanceError> {
    load_document(store, &cycle_id.to_string())
        .await
        .map_err(|err| match err {
            StoreError::NotFound { .. } => GovernanceError::CycleNotFound(cycle_id),
            other => other.into(),
        })
}
