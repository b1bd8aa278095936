//! Shared wiring for cycle handler tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::adapters::{InMemoryMemoryAtomSink, InMemorySessionStore, MockContentGenerator};
use crate::application::{ExplorationEngine, SessionLocks, SynthesisEngine};
use crate::config::GovernanceConfig;
use crate::domain::clustering::{Cluster, RoundRobinTieBreaker};
use crate::domain::cycle::Cycle;
use crate::domain::exploration::ExplorationNode;
use crate::domain::foundation::{CycleId, SessionStatus};
use crate::domain::synthesis::SynthesisSession;
use crate::ports::{
    load_document, ContentGenerator, DocumentKind, GenerationError, SessionStore, StoreError,
    SynthesisDraft,
};

use super::*;

pub(super) fn config(topic: &str, node_count: usize) -> GovernanceConfig {
    let mut config = GovernanceConfig::default();
    config.lightface.topic = topic.to_string();
    config.lightface.node_count = node_count;
    config
}

// ─────────────────────────────────────────────────────────────────────
// Handler wiring
// ─────────────────────────────────────────────────────────────────────

pub(super) struct Deps {
    pub store: Arc<dyn SessionStore>,
    pub explorations: Arc<ExplorationEngine>,
    pub syntheses: Arc<SynthesisEngine>,
    pub generator: Arc<dyn ContentGenerator>,
    pub sink: Arc<InMemoryMemoryAtomSink>,
    pub config: Arc<GovernanceConfig>,
    pub locks: SessionLocks,
}

impl Deps {
    pub fn new(config: GovernanceConfig) -> Self {
        Self::with(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(MockContentGenerator::new()),
            config,
        )
    }

    pub fn with(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ContentGenerator>,
        config: GovernanceConfig,
    ) -> Self {
        let tie_breaker = Arc::new(RoundRobinTieBreaker::new());
        let sink = Arc::new(InMemoryMemoryAtomSink::new());
        let explorations = Arc::new(ExplorationEngine::new(
            store.clone(),
            generator.clone(),
            tie_breaker.clone(),
        ));
        let syntheses = Arc::new(SynthesisEngine::new(
            store.clone(),
            explorations.clone(),
            sink.clone(),
            tie_breaker,
        ));
        Self {
            store,
            explorations,
            syntheses,
            generator,
            sink,
            config: Arc::new(config),
            locks: SessionLocks::new(),
        }
    }

    pub fn lightface(&self) -> ExecuteLightfacePhaseHandler {
        ExecuteLightfacePhaseHandler::new(
            self.store.clone(),
            self.explorations.clone(),
            self.config.clone(),
            self.locks.clone(),
        )
    }

    pub fn darkface(&self) -> Arc<ExecuteDarkfacePhaseHandler> {
        Arc::new(ExecuteDarkfacePhaseHandler::new(
            self.store.clone(),
            self.syntheses.clone(),
            self.config.clone(),
            self.locks.clone(),
        ))
    }

    pub fn complete_phase(&self) -> Arc<CompletePhaseHandler> {
        Arc::new(CompletePhaseHandler::new(
            self.store.clone(),
            self.explorations.clone(),
            self.syntheses.clone(),
            self.generator.clone(),
            self.darkface(),
            self.config.clone(),
            self.locks.clone(),
        ))
    }

    pub fn complete_cycle(&self) -> CompleteCycleHandler {
        CompleteCycleHandler::new(self.store.clone(), self.complete_phase(), self.locks.clone())
    }

    pub async fn started_cycle(&self) -> Cycle {
        StartCycleHandler::new(self.store.clone(), self.config.clone())
            .handle(StartCycleCommand {
                name: Some("T".into()),
            })
            .await
            .unwrap()
            .cycle
    }

    /// A cycle whose lightface phase has run and completed.
    pub async fn cycle_with_completed_lightface(&self) -> Cycle {
        let cycle = self.started_cycle().await;
        self.lightface()
            .handle(ExecuteLightfacePhaseCommand { cycle_id: cycle.id() })
            .await
            .unwrap();
        self.complete(cycle.id()).await
    }

    pub async fn complete(&self, cycle_id: CycleId) -> Cycle {
        self.complete_phase()
            .handle(CompletePhaseCommand { cycle_id })
            .await
            .unwrap()
            .cycle
    }

    pub async fn get(&self, cycle_id: CycleId) -> Cycle {
        load_document(&*self.store, &cycle_id.to_string())
            .await
            .unwrap()
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

// ─────────────────────────────────────────────────────────────────────
// Generator that fails a set number of times
// ─────────────────────────────────────────────────────────────────────

pub(super) struct FlakyGenerator {
    inner: MockContentGenerator,
    summary_failures: AtomicUsize,
    overall_failures: AtomicUsize,
    cluster_drafts: AtomicUsize,
}

impl FlakyGenerator {
    fn new(summary_failures: usize, overall_failures: usize) -> Self {
        Self {
            inner: MockContentGenerator::new(),
            summary_failures: AtomicUsize::new(summary_failures),
            overall_failures: AtomicUsize::new(overall_failures),
            cluster_drafts: AtomicUsize::new(0),
        }
    }

    pub fn failing_summaries(times: usize) -> Self {
        Self::new(times, 0)
    }

    pub fn failing_overall(times: usize) -> Self {
        Self::new(0, times)
    }

    /// Number of cluster syntheses drafted so far.
    pub fn cluster_drafts(&self) -> usize {
        self.cluster_drafts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FlakyGenerator {
    async fn related_topics(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<String>, GenerationError> {
        self.inner.related_topics(topic, count).await
    }

    async fn generate_content(
        &self,
        topic: &str,
        parent: Option<&ExplorationNode>,
    ) -> Result<String, GenerationError> {
        self.inner.generate_content(topic, parent).await
    }

    async fn generate_tags(&self, topic: &str) -> Result<BTreeSet<String>, GenerationError> {
        self.inner.generate_tags(topic).await
    }

    async fn synthesize_cluster(
        &self,
        position: usize,
        cluster: &Cluster,
    ) -> Result<SynthesisDraft, GenerationError> {
        self.cluster_drafts.fetch_add(1, Ordering::SeqCst);
        self.inner.synthesize_cluster(position, cluster).await
    }

    async fn synthesize_overall(
        &self,
        session: &SynthesisSession,
    ) -> Result<SynthesisDraft, GenerationError> {
        if take_one(&self.overall_failures) {
            return Err(GenerationError::Unavailable("overall draft timed out".into()));
        }
        self.inner.synthesize_overall(session).await
    }

    async fn summarize(&self, session: &SynthesisSession) -> Result<String, GenerationError> {
        if take_one(&self.summary_failures) {
            return Err(GenerationError::Unavailable("summary timed out".into()));
        }
        self.inner.summarize(session).await
    }

    async fn assess_quality(&self, session: &SynthesisSession) -> Result<f64, GenerationError> {
        self.inner.assess_quality(session).await
    }
}

// ─────────────────────────────────────────────────────────────────────
// Store that fails cycle saves on demand
// ─────────────────────────────────────────────────────────────────────

pub(super) struct FlakyStore {
    inner: InMemorySessionStore,
    cycle_save_failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
            cycle_save_failures: AtomicUsize::new(0),
        }
    }

    pub fn fail_next_cycle_saves(&self, times: usize) {
        self.cycle_save_failures.store(times, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn create(&self, kind: DocumentKind, id: &str, document: &Value) -> Result<(), StoreError> {
        self.inner.create(kind, id, document).await
    }

    async fn load(&self, kind: DocumentKind, id: &str) -> Result<Value, StoreError> {
        self.inner.load(kind, id).await
    }

    async fn save(&self, kind: DocumentKind, id: &str, document: &Value) -> Result<(), StoreError> {
        if kind == DocumentKind::Cycle && take_one(&self.cycle_save_failures) {
            return Err(StoreError::IoError("transient".into()));
        }
        self.inner.save(kind, id, document).await
    }

    async fn list(
        &self,
        kind: DocumentKind,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Value>, StoreError> {
        self.inner.list(kind, status).await
    }

    async fn exists(&self, kind: DocumentKind, id: &str) -> Result<bool, StoreError> {
        self.inner.exists(kind, id).await
    }

    async fn delete(&self, kind: DocumentKind, id: &str) -> Result<(), StoreError> {
        self.inner.delete(kind, id).await
    }
}
