//! ExplorationEngine - LightFace session lifecycle.
//!
//! Every operation is a load, mutate, save cycle on one session document,
//! serialized per session id. Lazy expiry is applied on every load path and
//! a status flip is persisted even when the requested operation then fails.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::clustering::TieBreaker;
use crate::domain::exploration::{ExplorationNode, ExplorationSession};
use crate::domain::foundation::{
    ExplorationId, GovernanceError, NodeId, SessionStatus, Timestamp,
};
use crate::ports::{
    create_document, list_documents, load_document, save_document, ContentGenerator,
    DocumentKind, SessionStore, StoreError,
};

use super::SessionLocks;

/// Root nodes a grown exploration starts from.
const GROWTH_ROOTS: usize = 3;

/// Engine for exploration (LightFace) sessions.
pub struct ExplorationEngine {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn ContentGenerator>,
    tie_breaker: Arc<dyn TieBreaker>,
    locks: SessionLocks,
}

impl ExplorationEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ContentGenerator>,
        tie_breaker: Arc<dyn TieBreaker>,
    ) -> Self {
        Self {
            store,
            generator,
            tie_breaker,
            locks: SessionLocks::new(),
        }
    }

    /// Starts and persists a new active exploration.
    pub async fn start_exploration(
        &self,
        topic: &str,
        duration_days: u32,
        constraints: Vec<String>,
    ) -> Result<ExplorationSession, GovernanceError> {
        let session = ExplorationSession::start(topic, duration_days, constraints)?;
        create_document(&*self.store, &session).await?;

        tracing::info!(
            exploration_id = %session.id(),
            topic = %session.topic(),
            duration_days,
            "Exploration started"
        );
        Ok(session)
    }

    /// Appends a node to an active exploration.
    ///
    /// # Errors
    ///
    /// - `ExplorationNotFound` if no session has this id
    /// - `SessionNotActive` if the session is completed or has expired
    /// - `ParentNotFound` if `parent_id` is not a node of this session
    pub async fn add_exploration_node(
        &self,
        session_id: ExplorationId,
        title: &str,
        content: &str,
        tags: BTreeSet<String>,
        parent_id: Option<NodeId>,
    ) -> Result<ExplorationNode, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Exploration, session_id).await;
        let now = Timestamp::now();

        // 1. Load and apply expiry
        let mut session = self.load(session_id).await?;
        let flipped = session.refresh_status(now);

        // 2. Append (domain logic handles validation)
        match session.add_node(title, content, tags, parent_id, now) {
            Ok(node) => {
                // 3. Persist the grown session
                save_document(&*self.store, &session).await?;
                tracing::debug!(
                    exploration_id = %session_id,
                    node_id = %node.id,
                    parent_id = ?node.parent_id.map(|p| p.to_string()),
                    "Exploration node added"
                );
                Ok(node)
            }
            Err(err) => {
                if flipped {
                    save_document(&*self.store, &session).await?;
                }
                Err(err)
            }
        }
    }

    /// Completes an exploration. Ending a completed session is a no-op.
    pub async fn end_exploration(
        &self,
        session_id: ExplorationId,
    ) -> Result<ExplorationSession, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Exploration, session_id).await;
        let now = Timestamp::now();

        let mut session = self.load(session_id).await?;
        let flipped = session.refresh_status(now);
        let ended = session.end(now);
        if flipped || ended {
            save_document(&*self.store, &session).await?;
            tracing::info!(
                exploration_id = %session_id,
                nodes = session.nodes().len(),
                "Exploration ended"
            );
        }
        Ok(session)
    }

    /// Loads one exploration with expiry applied.
    pub async fn get_exploration(
        &self,
        session_id: ExplorationId,
    ) -> Result<ExplorationSession, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Exploration, session_id).await;
        let mut session = self.load(session_id).await?;
        if session.refresh_status(Timestamp::now()) {
            save_document(&*self.store, &session).await?;
        }
        Ok(session)
    }

    /// Lists explorations, newest first.
    ///
    /// Expiry is applied to every active session before filtering, so an
    /// expired session never shows up under `Active`.
    pub async fn list_explorations(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<ExplorationSession>, GovernanceError> {
        let sessions: Vec<ExplorationSession> = list_documents(&*self.store, None).await?;
        let now = Timestamp::now();

        let mut refreshed = Vec::with_capacity(sessions.len());
        for mut session in sessions {
            if session.refresh_status(now) {
                session = self.persist_expiry(session.id(), now).await?;
            }
            refreshed.push(session);
        }

        Ok(refreshed
            .into_iter()
            .filter(|s| status.map_or(true, |wanted| s.status() == wanted))
            .collect())
    }

    /// Grows an active exploration by `node_count` generated nodes.
    ///
    /// The first nodes (up to three) are roots on topics related to the
    /// session topic; the rest branch from a parent picked by the tie-break
    /// policy among all nodes present at that point.
    pub async fn grow_exploration(
        &self,
        session_id: ExplorationId,
        node_count: usize,
    ) -> Result<ExplorationSession, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Exploration, session_id).await;
        let now = Timestamp::now();

        let mut session = self.load(session_id).await?;
        if session.refresh_status(now) {
            save_document(&*self.store, &session).await?;
        }
        if !session.status().is_active() {
            return Err(GovernanceError::SessionNotActive(session_id));
        }

        let roots = node_count.min(GROWTH_ROOTS);
        let root_topics = self
            .generator
            .related_topics(session.topic(), roots)
            .await?;
        for topic in root_topics {
            let content = self.generator.generate_content(&topic, None).await?;
            let tags = self.generator.generate_tags(&topic).await?;
            session.add_node(topic.as_str(), content, tags, None, now)?;
        }

        for _ in session.nodes().len()..node_count {
            let nodes = session.nodes();
            if nodes.is_empty() {
                break;
            }
            let parent = nodes[self.tie_breaker.choose(nodes.len())].clone();
            let topic = self
                .generator
                .related_topics(&parent.title, 1)
                .await?
                .into_iter()
                .next()
                .unwrap_or_else(|| parent.title.clone());
            let content = self.generator.generate_content(&topic, Some(&parent)).await?;
            let tags = self.generator.generate_tags(&topic).await?;
            session.add_node(topic.as_str(), content, tags, Some(parent.id), now)?;
        }

        save_document(&*self.store, &session).await?;
        tracing::info!(
            exploration_id = %session_id,
            nodes = session.nodes().len(),
            branches = session.branches().len(),
            "Exploration grown"
        );
        Ok(session)
    }

    async fn persist_expiry(
        &self,
        session_id: ExplorationId,
        now: Timestamp,
    ) -> Result<ExplorationSession, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Exploration, session_id).await;
        // Reload under the lock; the listed copy may be stale.
        let mut session = self.load(session_id).await?;
        if session.refresh_status(now) {
            save_document(&*self.store, &session).await?;
            tracing::debug!(exploration_id = %session_id, "Exploration expired");
        }
        Ok(session)
    }

    async fn load(&self, session_id: ExplorationId) -> Result<ExplorationSession, GovernanceError> {
        load_document(&*self.store, &session_id.to_string())
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => GovernanceError::ExplorationNotFound(session_id),
                other => other.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySessionStore, MockContentGenerator};
    use crate::domain::clustering::RoundRobinTieBreaker;
    use crate::domain::foundation::ErrorCategory;

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn engine_with(store: Arc<InMemorySessionStore>) -> ExplorationEngine {
        ExplorationEngine::new(
            store,
            Arc::new(MockContentGenerator::new()),
            Arc::new(RoundRobinTieBreaker::new()),
        )
    }

    fn engine() -> ExplorationEngine {
        engine_with(Arc::new(InMemorySessionStore::new()))
    }

    /// Persists a session whose window closed yesterday.
    async fn expired_session(store: &InMemorySessionStore) -> ExplorationSession {
        let started = Timestamp::now().minus_days(3);
        let session = ExplorationSession::start_at("old", 2, vec![], started).unwrap();
        create_document(store, &session).await.unwrap();
        session
    }

    #[tokio::test]
    async fn start_persists_active_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let engine = engine_with(store.clone());

        let session = engine.start_exploration("X", 2, vec!["no code".into()]).await.unwrap();

        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(store.count(DocumentKind::Exploration).await, 1);
        let loaded = engine.get_exploration(session.id()).await.unwrap();
        assert_eq!(loaded.constraints(), &["no code".to_string()]);
    }

    #[tokio::test]
    async fn start_rejects_empty_topic() {
        let result = engine().start_exploration("", 2, vec![]).await;
        assert_eq!(result.unwrap_err().category(), ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn nodes_form_a_forest() {
        let engine = engine();
        let session = engine.start_exploration("X", 2, vec![]).await.unwrap();

        let root = engine
            .add_exploration_node(session.id(), "root", "c", tags(&["a"]), None)
            .await
            .unwrap();
        let child = engine
            .add_exploration_node(session.id(), "child", "c", tags(&["b"]), Some(root.id))
            .await
            .unwrap();

        let loaded = engine.get_exploration(session.id()).await.unwrap();
        assert_eq!(loaded.nodes().len(), 2);
        assert_eq!(loaded.branches().len(), 1);
        assert_eq!(loaded.branches()[0].from, root.id);
        assert_eq!(loaded.branches()[0].to, child.id);
    }

    #[tokio::test]
    async fn unknown_parent_is_rejected() {
        let engine = engine();
        let session = engine.start_exploration("X", 2, vec![]).await.unwrap();

        let err = engine
            .add_exploration_node(session.id(), "orphan", "c", tags(&[]), Some(NodeId::new(9)))
            .await
            .unwrap_err();

        assert!(matches!(err, GovernanceError::ParentNotFound { .. }));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(engine.get_exploration(session.id()).await.unwrap().nodes().is_empty());
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let err = engine()
            .add_exploration_node(ExplorationId::new(), "t", "c", tags(&[]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ExplorationNotFound(_)));
    }

    #[tokio::test]
    async fn end_is_idempotent() {
        let engine = engine();
        let session = engine.start_exploration("X", 2, vec![]).await.unwrap();
        engine
            .add_exploration_node(session.id(), "n", "c", tags(&[]), None)
            .await
            .unwrap();

        let first = engine.end_exploration(session.id()).await.unwrap();
        let second = engine.end_exploration(session.id()).await.unwrap();

        assert_eq!(first.status(), SessionStatus::Completed);
        assert_eq!(second.status(), SessionStatus::Completed);
        assert_eq!(second.nodes().len(), 1);
    }

    #[tokio::test]
    async fn ended_session_rejects_nodes() {
        let engine = engine();
        let session = engine.start_exploration("X", 2, vec![]).await.unwrap();
        engine.end_exploration(session.id()).await.unwrap();

        let err = engine
            .add_exploration_node(session.id(), "late", "c", tags(&[]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GovernanceError::SessionNotActive(_)));
    }

    #[tokio::test]
    async fn expiry_on_add_is_persisted() {
        let store = Arc::new(InMemorySessionStore::new());
        let engine = engine_with(store.clone());
        let session = expired_session(&store).await;

        let err = engine
            .add_exploration_node(session.id(), "late", "c", tags(&[]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, GovernanceError::SessionNotActive(_)));
        let stored = store
            .load(DocumentKind::Exploration, &session.id().to_string())
            .await
            .unwrap();
        assert_eq!(stored["status"], "completed");
    }

    #[tokio::test]
    async fn list_applies_expiry_before_filtering() {
        let store = Arc::new(InMemorySessionStore::new());
        let engine = engine_with(store.clone());
        let expired = expired_session(&store).await;
        let fresh = engine.start_exploration("new", 2, vec![]).await.unwrap();

        let active = engine.list_explorations(Some(SessionStatus::Active)).await.unwrap();
        let completed = engine
            .list_explorations(Some(SessionStatus::Completed))
            .await
            .unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), fresh.id());
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id(), expired.id());
        let stored = store
            .load(DocumentKind::Exploration, &expired.id().to_string())
            .await
            .unwrap();
        assert_eq!(stored["status"], "completed");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = Arc::new(InMemorySessionStore::new());
        let engine = engine_with(store.clone());
        let older = expired_session(&store).await;
        let newer = engine.start_exploration("new", 2, vec![]).await.unwrap();

        let all = engine.list_explorations(None).await.unwrap();
        let ids: Vec<_> = all.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![newer.id(), older.id()]);
    }

    #[tokio::test]
    async fn grow_builds_three_roots_then_branches() {
        let engine = engine();
        let session = engine.start_exploration("X", 2, vec![]).await.unwrap();

        let grown = engine.grow_exploration(session.id(), 10).await.unwrap();

        assert_eq!(grown.nodes().len(), 10);
        assert_eq!(grown.nodes().iter().filter(|n| n.is_root()).count(), 3);
        assert_eq!(grown.branches().len(), 7);
        for node in grown.nodes().iter().filter(|n| !n.is_root()) {
            let parent = node.parent_id.unwrap();
            assert!(grown.node(parent).is_some());
            assert!(parent < node.id);
        }
        assert_eq!(grown.unique_tags(), tags(&["alpha", "beta"]));
    }

    #[tokio::test]
    async fn grow_with_fewer_nodes_than_roots() {
        let engine = engine();
        let session = engine.start_exploration("X", 2, vec![]).await.unwrap();

        let grown = engine.grow_exploration(session.id(), 2).await.unwrap();
        assert_eq!(grown.nodes().len(), 2);
        assert!(grown.branches().is_empty());

        let unchanged = engine.grow_exploration(session.id(), 0).await.unwrap();
        assert_eq!(unchanged.nodes().len(), 2);
    }

    #[tokio::test]
    async fn grow_propagates_generator_failure() {
        let engine = ExplorationEngine::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(MockContentGenerator::new().failing("offline")),
            Arc::new(RoundRobinTieBreaker::new()),
        );
        let session = engine.start_exploration("X", 2, vec![]).await.unwrap();

        let err = engine.grow_exploration(session.id(), 5).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::External);
        assert!(engine.get_exploration(session.id()).await.unwrap().nodes().is_empty());
    }
}
