//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod cycle;

pub use cycle::{
    CompleteCycleCommand, CompleteCycleHandler, CompleteCycleResult, CompletePhaseCommand,
    CompletePhaseHandler, CompletePhaseResult, ExecuteDarkfacePhaseCommand,
    ExecuteDarkfacePhaseHandler, ExecuteDarkfacePhaseResult, ExecuteLightfacePhaseCommand,
    ExecuteLightfacePhaseHandler, ExecuteLightfacePhaseResult, GetCycleHandler, GetCycleQuery,
    GetCycleResult, ListCyclesHandler, ListCyclesQuery, ListCyclesResult, StartCycleCommand,
    StartCycleHandler, StartCycleResult,
};
