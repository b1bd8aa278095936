//! CycleOrchestrator - drives cycles through lightface and darkface phases.
//!
//! A facade over the cycle handlers. It wires both engines and every handler
//! over one store and one lock registry, so callers get the whole cycle
//! surface from a single value.

use std::sync::Arc;

use crate::config::GovernanceConfig;
use crate::domain::clustering::TieBreaker;
use crate::domain::cycle::{Cycle, PhaseType};
use crate::domain::foundation::{CycleId, ExplorationId, GovernanceError, SessionStatus};
use crate::ports::{ContentGenerator, MemoryAtomSink, SessionStore};

use super::handlers::cycle::{
    CompleteCycleCommand, CompleteCycleHandler, CompletePhaseCommand, CompletePhaseHandler,
    ExecuteDarkfacePhaseCommand, ExecuteDarkfacePhaseHandler, ExecuteLightfacePhaseCommand,
    ExecuteLightfacePhaseHandler, GetCycleHandler, GetCycleQuery, ListCyclesHandler,
    ListCyclesQuery, StartCycleCommand, StartCycleHandler,
};
use super::{ExplorationEngine, SessionLocks, SynthesisEngine};

/// Orchestrates governance cycles.
pub struct CycleOrchestrator {
    explorations: Arc<ExplorationEngine>,
    syntheses: Arc<SynthesisEngine>,
    config: Arc<GovernanceConfig>,
    start: StartCycleHandler,
    lightface: ExecuteLightfacePhaseHandler,
    darkface: Arc<ExecuteDarkfacePhaseHandler>,
    complete_phase: Arc<CompletePhaseHandler>,
    complete_cycle: CompleteCycleHandler,
    get: GetCycleHandler,
    list: ListCyclesHandler,
}

impl CycleOrchestrator {
    /// Wires both engines and the cycle handlers over one store.
    pub fn new(
        config: GovernanceConfig,
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ContentGenerator>,
        sink: Arc<dyn MemoryAtomSink>,
        tie_breaker: Arc<dyn TieBreaker>,
    ) -> Self {
        let config = Arc::new(config);
        let locks = SessionLocks::new();

        let explorations = Arc::new(ExplorationEngine::new(
            store.clone(),
            generator.clone(),
            tie_breaker.clone(),
        ));
        let syntheses = Arc::new(SynthesisEngine::new(
            store.clone(),
            explorations.clone(),
            sink,
            tie_breaker,
        ));

        let darkface = Arc::new(ExecuteDarkfacePhaseHandler::new(
            store.clone(),
            syntheses.clone(),
            config.clone(),
            locks.clone(),
        ));
        let complete_phase = Arc::new(CompletePhaseHandler::new(
            store.clone(),
            explorations.clone(),
            syntheses.clone(),
            generator,
            darkface.clone(),
            config.clone(),
            locks.clone(),
        ));

        Self {
            start: StartCycleHandler::new(store.clone(), config.clone()),
            lightface: ExecuteLightfacePhaseHandler::new(
                store.clone(),
                explorations.clone(),
                config.clone(),
                locks.clone(),
            ),
            complete_cycle: CompleteCycleHandler::new(store.clone(), complete_phase.clone(), locks),
            get: GetCycleHandler::new(store.clone()),
            list: ListCyclesHandler::new(store),
            darkface,
            complete_phase,
            explorations,
            syntheses,
            config,
        }
    }

    pub fn explorations(&self) -> &Arc<ExplorationEngine> {
        &self.explorations
    }

    pub fn syntheses(&self) -> &Arc<SynthesisEngine> {
        &self.syntheses
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Starts a cycle, named from config when `name` is `None`.
    pub async fn start_cycle(&self, name: Option<&str>) -> Result<Cycle, GovernanceError> {
        let cmd = StartCycleCommand {
            name: name.map(str::to_string),
        };
        Ok(self.start.handle(cmd).await?.cycle)
    }

    /// Starts (and grows) an exploration and records it as the lightface phase.
    pub async fn execute_lightface_phase(&self, cycle_id: CycleId) -> Result<Cycle, GovernanceError> {
        let cmd = ExecuteLightfacePhaseCommand { cycle_id };
        Ok(self.lightface.handle(cmd).await?.cycle)
    }

    /// Starts a synthesis and records it as the darkface phase.
    pub async fn execute_darkface_phase(
        &self,
        cycle_id: CycleId,
        exploration_id: Option<ExplorationId>,
    ) -> Result<Cycle, GovernanceError> {
        let cmd = ExecuteDarkfacePhaseCommand {
            cycle_id,
            exploration_id,
        };
        Ok(self.darkface.handle(cmd).await?.cycle)
    }

    /// Completes the running phase and records its results.
    pub async fn complete_phase(&self, cycle_id: CycleId) -> Result<Cycle, GovernanceError> {
        let cmd = CompletePhaseCommand { cycle_id };
        Ok(self.complete_phase.handle(cmd).await?.cycle)
    }

    /// Completes the cycle, first completing any running phase.
    pub async fn complete_cycle(
        &self,
        cycle_id: CycleId,
        summary: Option<String>,
    ) -> Result<Cycle, GovernanceError> {
        let cmd = CompleteCycleCommand { cycle_id, summary };
        Ok(self.complete_cycle.handle(cmd).await?.cycle)
    }

    pub async fn get_cycle(&self, cycle_id: CycleId) -> Result<Cycle, GovernanceError> {
        Ok(self.get.handle(GetCycleQuery { cycle_id }).await?.cycle)
    }

    /// Lists cycles, newest first.
    pub async fn list_cycles(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<Cycle>, GovernanceError> {
        Ok(self.list.handle(ListCyclesQuery { status }).await?.cycles)
    }

    /// Runs a whole cycle: each configured phase is executed then completed,
    /// in order, and the cycle is completed with a generated summary.
    ///
    /// A phase already started by `cycle.auto_advance` is not started again.
    /// A phase auto-started past the configured list is closed with the cycle.
    pub async fn run_cycle(&self, name: Option<&str>) -> Result<Cycle, GovernanceError> {
        let mut cycle = self.start_cycle(name).await?;
        let cycle_id = cycle.id();

        for &phase in &self.config.cycle.phases {
            let running = cycle.active_phase().map(|p| p.phase_type());
            if running != Some(phase) {
                cycle = match phase {
                    PhaseType::Lightface => self.execute_lightface_phase(cycle_id).await?,
                    PhaseType::Darkface => self.execute_darkface_phase(cycle_id, None).await?,
                };
            }
            cycle = self.complete_phase(cycle_id).await?;
        }

        self.complete_cycle(cycle_id, None).await
    }
}
