//! StartCycleHandler - Command handler for starting a cycle.

use std::sync::Arc;

use crate::config::GovernanceConfig;
use crate::domain::cycle::Cycle;
use crate::domain::foundation::GovernanceError;
use crate::ports::{create_document, SessionStore};

/// Command to start a cycle.
#[derive(Debug, Clone, Default)]
pub struct StartCycleCommand {
    /// Cycle name; the configured default when `None`.
    pub name: Option<String>,
}

/// Result of starting a cycle.
#[derive(Debug, Clone)]
pub struct StartCycleResult {
    pub cycle: Cycle,
}

/// Handler for starting cycles.
pub struct StartCycleHandler {
    store: Arc<dyn SessionStore>,
    config: Arc<GovernanceConfig>,
}

impl StartCycleHandler {
    pub fn new(store: Arc<dyn SessionStore>, config: Arc<GovernanceConfig>) -> Self {
        Self { store, config }
    }

    pub async fn handle(&self, cmd: StartCycleCommand) -> Result<StartCycleResult, GovernanceError> {
        let name = cmd
            .name
            .unwrap_or_else(|| self.config.default_cycle_name.clone());
        let cycle = Cycle::start(name, self.config.name.as_str())?;
        create_document(&*self.store, &cycle).await?;

        tracing::info!(cycle_id = %cycle.id(), name = %cycle.name(), "Cycle started");
        Ok(StartCycleResult { cycle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySessionStore;
    use crate::domain::cycle::CyclePhase;
    use crate::ports::load_document;

    #[tokio::test]
    async fn starts_with_configured_default_name() {
        let store = Arc::new(InMemorySessionStore::new());
        let handler = StartCycleHandler::new(store.clone(), Arc::new(GovernanceConfig::default()));

        let result = handler.handle(StartCycleCommand::default()).await.unwrap();

        assert_eq!(result.cycle.name(), "Toroidal Cycle");
        assert_eq!(result.cycle.current_phase(), CyclePhase::Init);
        let stored: Cycle = load_document(&*store, &result.cycle.id().to_string())
            .await
            .unwrap();
        assert_eq!(stored, result.cycle);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let handler = StartCycleHandler::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(GovernanceConfig::default()),
        );

        let result = handler
            .handle(StartCycleCommand {
                name: Some("  ".into()),
            })
            .await;

        assert!(matches!(result, Err(GovernanceError::Validation(_))));
    }
}
