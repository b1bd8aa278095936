//! CompletePhaseHandler - Command handler for completing the running phase.
//!
//! Completing a lightface phase ends its exploration. Completing a darkface
//! phase runs the fixed synthesis routine: tag-similarity clustering into
//! three clusters, one themed node per cluster plus an overall node, then
//! finalization with a generated summary and score.
//!
//! The synthesis routine resumes rather than repeats. Nodes written by an
//! earlier failed attempt are kept and only the missing ones are authored,
//! and a synthesis that was already finalized is recorded as is.

use std::sync::Arc;

use crate::application::{ExplorationEngine, SessionLocks, SynthesisEngine};
use crate::config::GovernanceConfig;
use crate::domain::clustering::ClusteringMethod;
use crate::domain::cycle::{Cycle, PhaseDetails, PhaseOutcome, PhaseType};
use crate::domain::foundation::{ClusterId, CycleId, GovernanceError, NodeId, SynthesisId, Timestamp};
use crate::domain::synthesis::{SynthesisNode, SynthesisSession};
use crate::ports::{save_document, ContentGenerator, DocumentKind, SessionStore, SynthesisDraft};

use super::{load_cycle, ExecuteDarkfacePhaseHandler};

const DARKFACE_CLUSTERING: ClusteringMethod = ClusteringMethod::TagSimilarity;
const DARKFACE_CLUSTER_COUNT: usize = 3;

/// Command to complete the running phase of a cycle.
#[derive(Debug, Clone)]
pub struct CompletePhaseCommand {
    pub cycle_id: CycleId,
}

/// Result of completing a phase.
#[derive(Debug, Clone)]
pub struct CompletePhaseResult {
    pub cycle: Cycle,
    /// Type of the phase that was completed.
    pub completed: PhaseType,
    /// Set when `cycle.auto_advance` started the darkface phase.
    pub advanced_to: Option<PhaseType>,
}

/// Handler for completing phases.
pub struct CompletePhaseHandler {
    store: Arc<dyn SessionStore>,
    explorations: Arc<ExplorationEngine>,
    syntheses: Arc<SynthesisEngine>,
    generator: Arc<dyn ContentGenerator>,
    darkface: Arc<ExecuteDarkfacePhaseHandler>,
    config: Arc<GovernanceConfig>,
    locks: SessionLocks,
}

struct PendingNode {
    draft: SynthesisDraft,
    cluster_id: Option<ClusterId>,
    sources: Vec<NodeId>,
}

impl CompletePhaseHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        explorations: Arc<ExplorationEngine>,
        syntheses: Arc<SynthesisEngine>,
        generator: Arc<dyn ContentGenerator>,
        darkface: Arc<ExecuteDarkfacePhaseHandler>,
        config: Arc<GovernanceConfig>,
        locks: SessionLocks,
    ) -> Self {
        Self {
            store,
            explorations,
            syntheses,
            generator,
            darkface,
            config,
            locks,
        }
    }

    /// Completes the running phase and records its results.
    ///
    /// With `cycle.auto_advance`, completing the lightface phase also starts
    /// the darkface phase. If that start fails, the completed lightface phase
    /// stays recorded and the error is returned.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound`, `CycleNotActive`
    /// - `NoActivePhase` if no phase was ever started
    /// - `PhaseNotActive` if the latest phase is already completed
    pub async fn handle(
        &self,
        cmd: CompletePhaseCommand,
    ) -> Result<CompletePhaseResult, GovernanceError> {
        let _guard = self.locks.acquire(DocumentKind::Cycle, cmd.cycle_id).await;

        // 1. Complete the running phase
        let mut cycle = load_cycle(&*self.store, cmd.cycle_id).await?;
        let completed = self.complete_pending(&mut cycle).await?;
        save_document(&*self.store, &cycle).await?;

        // 2. Advance into darkface when configured
        let mut advanced_to = None;
        if completed == PhaseType::Lightface && self.config.cycle.auto_advance {
            self.darkface.begin(&mut cycle, None).await?;
            save_document(&*self.store, &cycle).await?;
            advanced_to = Some(PhaseType::Darkface);
        }

        Ok(CompletePhaseResult {
            cycle,
            completed,
            advanced_to,
        })
    }

    /// Completes the pending phase in memory. Callers hold the cycle lock and
    /// save the cycle.
    pub(super) async fn complete_pending(&self, cycle: &mut Cycle) -> Result<PhaseType, GovernanceError> {
        cycle.ensure_active()?;
        let phase = cycle.pending_phase()?.clone();

        let outcome = match &phase.details {
            PhaseDetails::Lightface { exploration_id, .. } => {
                let exploration = self.explorations.end_exploration(*exploration_id).await?;
                PhaseOutcome::Exploration(exploration.results())
            }
            PhaseDetails::Darkface { synthesis_id, .. } => {
                let synthesis = self.synthesize(*synthesis_id).await?;
                PhaseOutcome::Synthesis(synthesis.results())
            }
        };
        cycle.complete_pending_phase(outcome, Timestamp::now())?;

        tracing::info!(
            cycle_id = %cycle.id(),
            phase = %phase.phase_type(),
            reference_id = %phase.reference_id(),
            "Phase completed"
        );
        Ok(phase.phase_type())
    }

    /// Clusters, authors and finalizes a darkface synthesis.
    async fn synthesize(&self, synthesis_id: SynthesisId) -> Result<SynthesisSession, GovernanceError> {
        let mut session = self.syntheses.get_synthesis(synthesis_id).await?;
        if !session.status().is_active() {
            tracing::info!(
                synthesis_id = %synthesis_id,
                "Synthesis already finalized, recording its results"
            );
            return Ok(session);
        }

        // 1. Cluster, unless an earlier attempt already authored nodes
        if session.nodes().is_empty() {
            session = self
                .syntheses
                .cluster_nodes(synthesis_id, DARKFACE_CLUSTERING.as_str(), DARKFACE_CLUSTER_COUNT)
                .await?;
        }

        // 2. Draft every missing node before writing any
        let pending = self.draft_missing_nodes(&session).await?;
        if !session.nodes().is_empty() && !pending.is_empty() {
            tracing::info!(
                synthesis_id = %synthesis_id,
                existing = session.nodes().len(),
                missing = pending.len(),
                "Resuming partially authored synthesis"
            );
        }
        for node in pending {
            self.syntheses
                .add_synthesis_node(
                    synthesis_id,
                    &node.draft.title,
                    &node.draft.content,
                    node.cluster_id,
                    node.sources,
                )
                .await?;
        }

        // 3. Finalize
        let session = self.syntheses.get_synthesis(synthesis_id).await?;
        let summary = self.generator.summarize(&session).await?;
        let quality = self.generator.assess_quality(&session).await?;
        self.syntheses
            .finalize_synthesis(synthesis_id, &summary, quality)
            .await
    }

    async fn draft_missing_nodes(
        &self,
        session: &SynthesisSession,
    ) -> Result<Vec<PendingNode>, GovernanceError> {
        let authored = |cluster_id: ClusterId| {
            session
                .nodes()
                .iter()
                .any(|n| n.cluster_id == Some(cluster_id))
        };

        let mut pending = Vec::new();
        for (position, cluster) in session.clusters().iter().enumerate() {
            if authored(cluster.id) {
                continue;
            }
            pending.push(PendingNode {
                draft: self.generator.synthesize_cluster(position, cluster).await?,
                cluster_id: Some(cluster.id),
                sources: cluster.node_ids(),
            });
        }

        if !session.nodes().iter().any(SynthesisNode::is_overall) {
            pending.push(PendingNode {
                draft: self.generator.synthesize_overall(session).await?,
                cluster_id: None,
                sources: session.clusters().iter().flat_map(|c| c.node_ids()).collect(),
            });
        }
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{config, Deps, FlakyGenerator, FlakyStore};
    use super::super::{ExecuteDarkfacePhaseCommand, ExecuteLightfacePhaseCommand};
    use super::*;
    use crate::adapters::{InMemorySessionStore, MockContentGenerator};
    use crate::domain::cycle::CyclePhase;
    use crate::domain::foundation::SessionStatus;

    fn command(cycle_id: CycleId) -> CompletePhaseCommand {
        CompletePhaseCommand { cycle_id }
    }

    async fn cycle_in_darkface(deps: &Deps) -> Cycle {
        let cycle = deps.cycle_with_completed_lightface().await;
        deps.darkface()
            .handle(ExecuteDarkfacePhaseCommand {
                cycle_id: cycle.id(),
                exploration_id: None,
            })
            .await
            .unwrap()
            .cycle
    }

    fn synthesis_id(cycle: &Cycle) -> SynthesisId {
        cycle.phases()[1].reference_id().parse().unwrap()
    }

    #[tokio::test]
    async fn guards_missing_and_completed_phases() {
        let deps = Deps::new(config("X", 2));
        let cycle = deps.started_cycle().await;
        let handler = deps.complete_phase();

        let err = handler.handle(command(cycle.id())).await.unwrap_err();
        assert!(matches!(err, GovernanceError::NoActivePhase(_)));

        deps.lightface()
            .handle(ExecuteLightfacePhaseCommand { cycle_id: cycle.id() })
            .await
            .unwrap();
        handler.handle(command(cycle.id())).await.unwrap();

        let err = handler.handle(command(cycle.id())).await.unwrap_err();
        assert!(matches!(err, GovernanceError::PhaseNotActive(_)));
    }

    #[tokio::test]
    async fn lightface_completion_records_real_counts() {
        let deps = Deps::new(config("X", 10));
        let cycle = deps.cycle_with_completed_lightface().await;

        assert_eq!(cycle.current_phase(), CyclePhase::Complete);
        let results = cycle.phases()[0].exploration_results().unwrap();
        assert_eq!(results.nodes_created, 10);
        assert_eq!(results.branches_created, 7);
        assert_eq!(results.unique_tags, 2);
        let exploration = deps
            .explorations
            .get_exploration(cycle.phases()[0].exploration_id())
            .await
            .unwrap();
        assert_eq!(exploration.status(), SessionStatus::Completed);
    }

    #[tokio::test]
    async fn darkface_completion_authors_three_themes_and_overall() {
        let deps = Deps::new(config("X", 10));
        let cycle = cycle_in_darkface(&deps).await;

        let result = deps.complete_phase().handle(command(cycle.id())).await.unwrap();

        assert_eq!(result.completed, PhaseType::Darkface);
        let results = result.cycle.phases()[1].synthesis_results().unwrap();
        assert_eq!(results.clusters_created, 3);
        assert_eq!(results.nodes_created, 4);
        assert!((results.quality_score - 0.85).abs() < 1e-9);
        assert_eq!(deps.sink.count().await, 1);
    }

    #[tokio::test]
    async fn darkface_on_empty_exploration_keeps_phase_running() {
        let deps = Deps::new(config("X", 0));
        let cycle = cycle_in_darkface(&deps).await;

        let err = deps
            .complete_phase()
            .handle(command(cycle.id()))
            .await
            .unwrap_err();

        assert!(matches!(err, GovernanceError::NoNodesToCluster { .. }));
        assert!(deps.get(cycle.id()).await.active_phase().is_some());
    }

    #[tokio::test]
    async fn retry_after_summary_failure_does_not_duplicate_nodes() {
        let generator = Arc::new(FlakyGenerator::failing_summaries(1));
        let deps = Deps::with(
            Arc::new(InMemorySessionStore::new()),
            generator.clone(),
            config("X", 10),
        );
        let cycle = cycle_in_darkface(&deps).await;
        let handler = deps.complete_phase();

        let err = handler.handle(command(cycle.id())).await.unwrap_err();
        assert!(matches!(err, GovernanceError::ContentGeneration(_)));
        let partial = deps.syntheses.get_synthesis(synthesis_id(&cycle)).await.unwrap();
        assert_eq!(partial.nodes().len(), 4);
        assert_eq!(partial.status(), SessionStatus::Active);

        let result = handler.handle(command(cycle.id())).await.unwrap();

        let results = result.cycle.phases()[1].synthesis_results().unwrap();
        assert_eq!(results.clusters_created, 3);
        assert_eq!(results.nodes_created, 4);
        assert_eq!(generator.cluster_drafts(), 3);
    }

    #[tokio::test]
    async fn failed_overall_draft_writes_no_nodes() {
        let generator = Arc::new(FlakyGenerator::failing_overall(1));
        let deps = Deps::with(
            Arc::new(InMemorySessionStore::new()),
            generator,
            config("X", 10),
        );
        let cycle = cycle_in_darkface(&deps).await;
        let handler = deps.complete_phase();

        let err = handler.handle(command(cycle.id())).await.unwrap_err();
        assert!(matches!(err, GovernanceError::ContentGeneration(_)));
        let untouched = deps.syntheses.get_synthesis(synthesis_id(&cycle)).await.unwrap();
        assert!(untouched.nodes().is_empty());

        let result = handler.handle(command(cycle.id())).await.unwrap();
        let results = result.cycle.phases()[1].synthesis_results().unwrap();
        assert_eq!(results.nodes_created, 4);
    }

    #[tokio::test]
    async fn retry_after_cycle_save_failure_records_finalized_synthesis() {
        let store = Arc::new(FlakyStore::new());
        let deps = Deps::with(
            store.clone(),
            Arc::new(MockContentGenerator::new()),
            config("X", 10),
        );
        let cycle = cycle_in_darkface(&deps).await;
        let handler = deps.complete_phase();
        store.fail_next_cycle_saves(1);

        let err = handler.handle(command(cycle.id())).await.unwrap_err();
        assert!(matches!(err, GovernanceError::Persistence(_)));
        let finalized = deps.syntheses.get_synthesis(synthesis_id(&cycle)).await.unwrap();
        assert_eq!(finalized.status(), SessionStatus::Completed);

        let result = handler.handle(command(cycle.id())).await.unwrap();

        assert_eq!(result.cycle.current_phase(), CyclePhase::Complete);
        let results = result.cycle.phases()[1].synthesis_results().unwrap();
        assert_eq!(results.nodes_created, 4);
        assert_eq!(results.clusters_created, 3);
        assert_eq!(deps.sink.count().await, 1);
    }

    #[tokio::test]
    async fn auto_advance_starts_darkface() {
        let mut config = config("X", 4);
        config.cycle.auto_advance = true;
        let deps = Deps::new(config);
        let cycle = deps.started_cycle().await;
        deps.lightface()
            .handle(ExecuteLightfacePhaseCommand { cycle_id: cycle.id() })
            .await
            .unwrap();

        let result = deps.complete_phase().handle(command(cycle.id())).await.unwrap();

        assert_eq!(result.completed, PhaseType::Lightface);
        assert_eq!(result.advanced_to, Some(PhaseType::Darkface));
        assert_eq!(result.cycle.current_phase(), CyclePhase::Darkface);
        let stored = deps.get(cycle.id()).await;
        assert_eq!(stored.phases().len(), 2);
        assert_eq!(stored.active_phase().unwrap().phase_type(), PhaseType::Darkface);
    }

    #[tokio::test]
    async fn without_auto_advance_cycle_waits_after_lightface() {
        let deps = Deps::new(config("X", 4));
        let cycle = deps.cycle_with_completed_lightface().await;

        assert!(cycle.active_phase().is_none());
        assert_eq!(cycle.phases().len(), 1);
    }
}
