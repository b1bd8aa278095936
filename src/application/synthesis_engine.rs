//! SynthesisEngine - DarkFace session lifecycle.
//!
//! A synthesis reads its exploration (never writes it), clusters the
//! exploration's nodes, collects integrative nodes, and is finalized once.
//! Finalizing at or above the memory atom threshold emits one atom to the
//! sink before the completed session is persisted.

use std::sync::Arc;

use crate::domain::clustering::{ClusteringMethod, TieBreaker};
use crate::domain::foundation::{
    ClusterId, ExplorationId, GovernanceError, NodeId, SessionStatus, SynthesisId, Timestamp,
};
use crate::domain::synthesis::{Criterion, MemoryAtom, SynthesisNode, SynthesisSession};
use crate::ports::{
    create_document, list_documents, load_document, save_document, DocumentKind,
    MemoryAtomSink, SessionStore, StoreError,
};

use super::{ExplorationEngine, SessionLocks};

/// Engine for synthesis (DarkFace) sessions.
pub struct SynthesisEngine {
    store: Arc<dyn SessionStore>,
    explorations: Arc<ExplorationEngine>,
    sink: Arc<dyn MemoryAtomSink>,
    tie_breaker: Arc<dyn TieBreaker>,
    locks: SessionLocks,
}

impl SynthesisEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        explorations: Arc<ExplorationEngine>,
        sink: Arc<dyn MemoryAtomSink>,
        tie_breaker: Arc<dyn TieBreaker>,
    ) -> Self {
        Self {
            store,
            explorations,
            sink,
            tie_breaker,
            locks: SessionLocks::new(),
        }
    }

    /// Starts and persists a synthesis over an existing exploration.
    ///
    /// # Errors
    ///
    /// - `ExplorationNotFound` if the exploration does not exist
    pub async fn start_synthesis(
        &self,
        exploration_id: ExplorationId,
        title: &str,
        criteria: Vec<Criterion>,
    ) -> Result<SynthesisSession, GovernanceError> {
        let exploration = self.explorations.get_exploration(exploration_id).await?;
        let session = SynthesisSession::start(&exploration, title, criteria)?;
        create_document(&*self.store, &session).await?;

        tracing::info!(
            synthesis_id = %session.id(),
            exploration_id = %exploration_id,
            title = %session.title(),
            "Synthesis started"
        );
        Ok(session)
    }

    /// Clusters the exploration's current nodes, replacing any earlier pass.
    ///
    /// # Errors
    ///
    /// In order of checking:
    /// - `SynthesisNotFound`
    /// - `SynthesisNotActive` if the synthesis is finalized
    /// - `ExplorationNotFound` if the exploration has since been deleted
    /// - `NoNodesToCluster` if the exploration has no nodes
    /// - `UnknownMethod` for an unrecognized method name
    pub async fn cluster_nodes(
        &self,
        session_id: SynthesisId,
        method: &str,
        k: usize,
    ) -> Result<SynthesisSession, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Synthesis, session_id).await;

        // 1. Load the synthesis and re-validate its exploration
        let mut session = self.load(session_id).await?;
        if !session.status().is_active() {
            return Err(GovernanceError::SynthesisNotActive(session_id));
        }
        let exploration = self
            .explorations
            .get_exploration(session.exploration_id())
            .await?;
        if exploration.nodes().is_empty() {
            return Err(GovernanceError::NoNodesToCluster {
                exploration_id: exploration.id(),
            });
        }

        // 2. Cluster
        let method: ClusteringMethod = method.parse()?;
        let clusters = method.cluster(exploration.nodes(), k, self.tie_breaker.as_ref())?;

        // 3. Replace and persist
        session.replace_clusters(method, clusters, Timestamp::now())?;
        save_document(&*self.store, &session).await?;

        tracing::info!(
            synthesis_id = %session_id,
            method = %method,
            requested = k,
            clusters = session.clusters().len(),
            "Exploration nodes clustered"
        );
        Ok(session)
    }

    /// Appends a synthesis node. `cluster_id` is not checked against the
    /// current clusters.
    pub async fn add_synthesis_node(
        &self,
        session_id: SynthesisId,
        title: &str,
        content: &str,
        cluster_id: Option<ClusterId>,
        source_node_ids: Vec<NodeId>,
    ) -> Result<SynthesisNode, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Synthesis, session_id).await;

        let mut session = self.load(session_id).await?;
        let node = session.add_node(title, content, cluster_id, source_node_ids, Timestamp::now())?;
        save_document(&*self.store, &session).await?;

        tracing::debug!(
            synthesis_id = %session_id,
            node_id = %node.id,
            cluster_id = ?node.cluster_id.map(|c| c.to_string()),
            "Synthesis node added"
        );
        Ok(node)
    }

    /// Completes a synthesis with a summary and a quality score in [0, 1].
    ///
    /// # Errors
    ///
    /// - `SynthesisAlreadyFinalized` if the synthesis is already completed;
    ///   no second memory atom is emitted
    /// - `MemorySink` if the atom could not be emitted; the synthesis then
    ///   stays active
    pub async fn finalize_synthesis(
        &self,
        session_id: SynthesisId,
        summary: &str,
        quality_score: f64,
    ) -> Result<SynthesisSession, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Synthesis, session_id).await;
        let now = Timestamp::now();

        // 1. Complete the session in memory
        let mut session = self.load(session_id).await?;
        let score = session.finalize(summary, quality_score, now)?;

        // 2. Emit the memory atom, if earned
        if session.qualifies_for_memory_atom() {
            let atom = MemoryAtom::from_synthesis(&session, now);
            self.sink.emit(&atom).await?;
            session.record_memory_atom(atom.id.clone());
            tracing::info!(synthesis_id = %session_id, atom_id = %atom.id, "Memory atom emitted");
        }

        // 3. Persist the completed session
        save_document(&*self.store, &session).await?;

        tracing::info!(
            synthesis_id = %session_id,
            quality_score = %score,
            clusters = session.clusters().len(),
            nodes = session.nodes().len(),
            "Synthesis finalized"
        );
        Ok(session)
    }

    pub async fn get_synthesis(
        &self,
        session_id: SynthesisId,
    ) -> Result<SynthesisSession, GovernanceError> {
        self.load(session_id).await
    }

    /// Lists syntheses, newest first.
    pub async fn list_syntheses(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<SynthesisSession>, GovernanceError> {
        Ok(list_documents(&*self.store, status).await?)
    }

    async fn load(&self, session_id: SynthesisId) -> Result<SynthesisSession, GovernanceError> {
        load_document(&*self.store, &session_id.to_string())
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => GovernanceError::SynthesisNotFound(session_id),
                other => other.into(),
            })
    }
}
