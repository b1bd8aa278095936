//! Synthesis session aggregate - the DarkFace phase's clusters and
//! integrative nodes.

use serde::{Deserialize, Serialize};

use crate::domain::clustering::{Cluster, ClusteringMethod};
use crate::domain::exploration::ExplorationSession;
use crate::domain::foundation::{
    ClusterId, ExplorationId, GovernanceError, NodeId, QualityScore, SessionStatus, StateMachine,
    SynthesisId, SynthesisNodeId, Timestamp, ValidationError,
};

use super::{Criterion, SynthesisNode, MEMORY_ATOM_QUALITY_THRESHOLD};

/// Counters derived from a synthesis, recorded on the cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResults {
    pub clusters_created: usize,
    pub nodes_created: usize,
    pub quality_score: f64,
}

/// A convergent synthesis over one exploration session.
///
/// The exploration is referenced by id only and never modified here.
///
/// # Invariants
///
/// - `clusters` are replaced wholesale by each clustering pass
/// - `nodes` are append-only with sequential ids
/// - once completed, nothing changes (finalization happens exactly once)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSession {
    id: SynthesisId,
    title: String,
    exploration_id: ExplorationId,
    exploration_topic: String,
    status: SessionStatus,
    #[serde(default)]
    criteria: Vec<Criterion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    clustering_method: Option<ClusteringMethod>,
    clusters: Vec<Cluster>,
    nodes: Vec<SynthesisNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality_score: Option<QualityScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    memory_atom_id: Option<String>,
    start_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completion_time: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl SynthesisSession {
    /// Starts an active synthesis over `exploration`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank
    pub fn start(
        exploration: &ExplorationSession,
        title: impl Into<String>,
        criteria: Vec<Criterion>,
    ) -> Result<Self, GovernanceError> {
        Self::start_at(exploration, title, criteria, Timestamp::now())
    }

    pub fn start_at(
        exploration: &ExplorationSession,
        title: impl Into<String>,
        criteria: Vec<Criterion>,
        now: Timestamp,
    ) -> Result<Self, GovernanceError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title").into());
        }

        Ok(Self {
            id: SynthesisId::new(),
            title,
            exploration_id: exploration.id(),
            exploration_topic: exploration.topic().to_string(),
            status: SessionStatus::Active,
            criteria,
            clustering_method: None,
            clusters: Vec::new(),
            nodes: Vec::new(),
            summary: None,
            quality_score: None,
            memory_atom_id: None,
            start_time: now,
            completion_time: None,
            created_at: now,
            updated_at: now,
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> SynthesisId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn exploration_id(&self) -> ExplorationId {
        self.exploration_id
    }

    pub fn exploration_topic(&self) -> &str {
        &self.exploration_topic
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn clustering_method(&self) -> Option<ClusteringMethod> {
        self.clustering_method
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn nodes(&self) -> &[SynthesisNode] {
        &self.nodes
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn quality_score(&self) -> Option<QualityScore> {
        self.quality_score
    }

    pub fn memory_atom_id(&self) -> Option<&str> {
        self.memory_atom_id.as_deref()
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn completion_time(&self) -> Option<Timestamp> {
        self.completion_time
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// True once finalized with a score at or above the memory atom threshold.
    pub fn qualifies_for_memory_atom(&self) -> bool {
        self.quality_score
            .map(|score| score.meets(MEMORY_ATOM_QUALITY_THRESHOLD))
            .unwrap_or(false)
    }

    pub fn results(&self) -> SynthesisResults {
        SynthesisResults {
            clusters_created: self.clusters.len(),
            nodes_created: self.nodes.len(),
            quality_score: self.quality_score.unwrap_or_default().value(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Replaces the clusters with the result of a new clustering pass.
    pub fn replace_clusters(
        &mut self,
        method: ClusteringMethod,
        clusters: Vec<Cluster>,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.ensure_active()?;
        self.clustering_method = Some(method);
        self.clusters = clusters;
        self.updated_at = now;
        Ok(())
    }

    /// Appends a synthesis node.
    ///
    /// `cluster_id` is accepted as given, even if no current cluster has it.
    pub fn add_node(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        cluster_id: Option<ClusterId>,
        source_node_ids: Vec<NodeId>,
        now: Timestamp,
    ) -> Result<SynthesisNode, GovernanceError> {
        self.ensure_active()?;
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title").into());
        }

        let node = SynthesisNode {
            id: SynthesisNodeId::new(self.nodes.len() as u32 + 1),
            title,
            content: content.into(),
            cluster_id,
            source_node_ids,
            created_at: now,
        };
        self.nodes.push(node.clone());
        self.updated_at = now;
        Ok(node)
    }

    /// Completes the synthesis with a summary and a clamped quality score.
    ///
    /// # Errors
    ///
    /// - `SynthesisAlreadyFinalized` on any second call
    pub fn finalize(
        &mut self,
        summary: impl Into<String>,
        quality_score: f64,
        now: Timestamp,
    ) -> Result<QualityScore, GovernanceError> {
        if !self.status.is_active() {
            return Err(GovernanceError::SynthesisAlreadyFinalized(self.id));
        }
        self.status = self.status.transition_to(SessionStatus::Completed)?;

        let score = QualityScore::new(quality_score);
        self.summary = Some(summary.into());
        self.quality_score = Some(score);
        self.completion_time = Some(now);
        self.updated_at = now;
        Ok(score)
    }

    pub fn record_memory_atom(&mut self, atom_id: impl Into<String>) {
        self.memory_atom_id = Some(atom_id.into());
    }

    fn ensure_active(&self) -> Result<(), GovernanceError> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(GovernanceError::SynthesisNotActive(self.id))
        }
    }
}
