//! Batch timing engine, target preparation, and the steady-state loop.

pub mod analyzer;
pub mod batch;
pub mod manager;
pub mod prep;

pub use analyzer::{
    ceil_instances, floor_instances, FormulaAnalyzer, OperationAnalyzer,
    GROW_SECURITY_PER_INSTANCE, HACK_SECURITY_PER_INSTANCE, WEAKEN_SECURITY_PER_INSTANCE,
};
pub use batch::{BatchThreads, BatchTiming, BatchTimingEngine, OperationDurations};
pub use manager::{BatchManager, CycleOutcome};
pub use prep::{PrepPlan, PrepState, Preparer};
