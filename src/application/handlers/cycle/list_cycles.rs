//! ListCyclesHandler - Query handler for listing cycles.

use std::sync::Arc;

use crate::domain::cycle::Cycle;
use crate::domain::foundation::{GovernanceError, SessionStatus};
use crate::ports::{list_documents, SessionStore};

#[derive(Debug, Clone, Default)]
pub struct ListCyclesQuery {
    /// Only cycles with this status, when set.
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Clone)]
pub struct ListCyclesResult {
    /// Newest first.
    pub cycles: Vec<Cycle>,
}

pub struct ListCyclesHandler {
    store: Arc<dyn SessionStore>,
}

impl ListCyclesHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListCyclesQuery) -> Result<ListCyclesResult, GovernanceError> {
        let cycles = list_documents(&*self.store, query.status).await?;
        Ok(ListCyclesResult { cycles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySessionStore;
    use crate::domain::foundation::Timestamp;
    use crate::ports::create_document;

    #[tokio::test]
    async fn filters_by_status_newest_first() {
        let store = Arc::new(InMemorySessionStore::new());
        let now = Timestamp::now();
        let older = Cycle::start_at("older", "P", now.minus_days(1)).unwrap();
        let newer = Cycle::start_at("newer", "P", now).unwrap();
        let mut done = Cycle::start_at("done", "P", now).unwrap();
        done.complete("finished".into(), now).unwrap();
        for cycle in [&older, &newer, &done] {
            create_document(&*store, cycle).await.unwrap();
        }
        let handler = ListCyclesHandler::new(store);

        let active = handler
            .handle(ListCyclesQuery {
                status: Some(SessionStatus::Active),
            })
            .await
            .unwrap();
        let names: Vec<_> = active.cycles.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["newer", "older"]);

        let all = handler.handle(ListCyclesQuery::default()).await.unwrap();
        assert_eq!(all.cycles.len(), 3);
    }
}
