//! Configuration models for the fleet, its nodes, and batch timing.

pub mod fleet;

pub use fleet::{BatchConfig, BatchScripts, FleetConfig, NodeOverride, ScriptSpec};
