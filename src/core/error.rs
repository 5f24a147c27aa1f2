//! Error types for scheduling, timing, and dispatch operations.

use thiserror::Error;

/// Errors produced by fleet components.
#[derive(Debug, Error)]
pub enum FleetError {
    /// A task could not be fully placed; the whole job is rejected.
    #[error("capacity shortfall: job `{job}` task `{task}` has {remaining} unplaced instances")]
    CapacityShortfall {
        /// Job name.
        job: String,
        /// Task (script) name.
        task: String,
        /// Instances left over after all candidate nodes were exhausted.
        remaining: u32,
    },
    /// A computed stage delay is negative.
    #[error("invalid timing: stage `{stage}` would start at {delay_ms}ms")]
    InvalidTiming {
        /// Stage label (hack, weaken1, grow, weaken2).
        stage: &'static str,
        /// The offending start offset in milliseconds.
        delay_ms: f64,
    },
    /// Transfer or launch failed after a successful allocation.
    #[error("dispatch failed: job `{job}` task `{task}` on `{node}`: {reason}")]
    Dispatch {
        /// Job name.
        job: String,
        /// Task (script) name.
        task: String,
        /// Hostname of the node that rejected the launch.
        node: String,
        /// Collaborator-supplied reason.
        reason: String,
    },
    /// Task definition cannot be scheduled at all.
    #[error("invalid task: {0}")]
    InvalidTask(String),
    /// Hostname is not part of the registry.
    #[error("unknown node: {0}")]
    UnknownNode(String),
    /// Host probe collaborator failure.
    #[error("probe error: {0}")]
    Probe(String),
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
    /// Node-list snapshot could not be read or written.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
