//! GetCycleHandler - Query handler for one cycle.

use std::sync::Arc;

use crate::domain::cycle::Cycle;
use crate::domain::foundation::{CycleId, GovernanceError};
use crate::ports::SessionStore;

use super::load_cycle;

#[derive(Debug, Clone)]
pub struct GetCycleQuery {
    pub cycle_id: CycleId,
}

#[derive(Debug, Clone)]
pub struct GetCycleResult {
    pub cycle: Cycle,
}

pub struct GetCycleHandler {
    store: Arc<dyn SessionStore>,
}

impl GetCycleHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetCycleQuery) -> Result<GetCycleResult, GovernanceError> {
        let cycle = load_cycle(&*self.store, query.cycle_id).await?;
        Ok(GetCycleResult { cycle })
    }
}
