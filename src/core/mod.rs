//! Core scheduling abstractions and capacity accounting.

pub mod allocation;
pub mod audit;
pub mod error;
pub mod lock;
pub mod node;
pub mod scheduler;
pub mod task;

pub use allocation::{Allocation, JobMetrics, NodeAssignment, TaskPlacement};
pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use error::{AppResult, FleetError};
pub use lock::{LockRelease, SchedulerLock};
pub use node::{ComputeNode, HostFacts, NodeFacts, NodeId, NodeOptions};
pub use scheduler::{ScheduledJob, Scheduler};
pub use task::{Job, ResourceCost, Task};
