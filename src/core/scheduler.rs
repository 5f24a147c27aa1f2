//! Capacity-aware job placement under the fleet lock.
//!
//! Placement is greedy first-fit over candidates in a fixed priority order:
//! each task takes as many whole instances as fit on the first node, then the
//! next, until its requested count is met. A job is placed all-or-nothing; a
//! single short task rejects the whole job and nothing is recorded.
//!
//! Placement never writes to the nodes it reads. Within one job pass a local
//! ledger tracks capacity already promised to earlier tasks so that two tasks
//! of the same job cannot both claim the same free RAM.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::{
    build_audit_event, Allocation, AuditSink, ComputeNode, FleetError, Job, JobMetrics,
    LockRelease, NodeAssignment, NodeFacts, NodeId, SchedulerLock, Task, TaskPlacement,
};

/// Float slack absorbed when dividing fractional RAM by per-instance cost.
const INSTANCE_EPSILON: f64 = 1e-9;

/// A successful allocation still holding the fleet lock.
///
/// The caller dispatches the allocation and then releases the lock.
#[derive(Debug)]
pub struct ScheduledJob {
    /// Per-task placements.
    pub allocation: Allocation,
    /// Lock handle; release after dispatch.
    pub release: LockRelease,
}

/// Fleet scheduler: lock arbitration plus placement.
#[derive(Clone)]
pub struct Scheduler {
    lock: SchedulerLock,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl Scheduler {
    /// Create a scheduler whose lock waiters poll at `poll_interval`.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            lock: SchedulerLock::new(poll_interval),
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// The fleet lock.
    pub const fn lock(&self) -> &SchedulerLock {
        &self.lock
    }

    /// Block until the fleet lock is free, then take it.
    pub async fn acquire_lock(&self, caller: &str) -> LockRelease {
        self.lock.acquire(caller).await
    }

    /// Acquire the lock and place every task of `job` on `nodes`.
    ///
    /// `nodes` must already be filtered to eligible nodes and sorted by
    /// priority. On shortfall the lock is released before returning.
    pub async fn schedule_job(
        &self,
        job: &Job,
        nodes: &[ComputeNode],
    ) -> Result<ScheduledJob, FleetError> {
        let release = self.acquire_lock(&job.name).await;

        match Self::place_job(job, nodes) {
            Ok(allocation) => {
                tracing::debug!(job = %job.name, tasks = allocation.placements.len(), "job placed");
                self.record(&job.name, None, "schedule", None);
                Ok(ScheduledJob { allocation, release })
            }
            Err(err) => {
                tracing::error!(job = %job.name, error = %err, "job is not schedulable");
                self.record(&job.name, None, "shortfall", Some(err.to_string()));
                release.release();
                Err(err)
            }
        }
    }

    /// Place every task of `job` without touching the lock.
    pub fn place_job(job: &Job, nodes: &[ComputeNode]) -> Result<Allocation, FleetError> {
        for task in job.tasks() {
            validate_task(task)?;
        }

        let mut ledger: HashMap<NodeId, f64> = HashMap::new();
        let mut placements = Vec::with_capacity(job.tasks().len());
        for task in job.tasks() {
            match Self::place_task(task, nodes, &mut ledger) {
                Ok(placement) => placements.push(placement),
                Err(remaining) => {
                    tracing::error!(
                        job = %job.name,
                        script = task.name(),
                        remaining,
                        "not enough capacity for scheduling"
                    );
                    return Err(FleetError::CapacityShortfall {
                        job: job.name.clone(),
                        task: task.name().to_string(),
                        remaining,
                    });
                }
            }
        }
        Ok(Allocation { placements })
    }

    /// Place one task. Returns the unplaced remainder on shortfall.
    ///
    /// `ledger` holds capacity already promised to earlier tasks of the same
    /// pass and is only updated when the whole task fits.
    pub fn place_task(
        task: &Task,
        nodes: &[ComputeNode],
        ledger: &mut HashMap<NodeId, f64>,
    ) -> Result<TaskPlacement, u32> {
        let mut remaining = task.instances;
        let mut placement = TaskPlacement::default();

        for node in nodes {
            if remaining == 0 {
                break;
            }
            let cost = task.cost_on(node);
            let promised = ledger.get(&node.id()).copied().unwrap_or(0.0);
            let free = (node.schedulable_capacity() - promised).max(0.0);
            let available = whole_instances(free, cost);
            if available == 0 {
                continue;
            }

            let assigned = available.min(remaining);
            remaining -= assigned;
            placement.assignments.push(NodeAssignment {
                node: node.id(),
                hostname: node.hostname().to_string(),
                instances: assigned,
                cost_per_instance: cost,
            });
        }

        if remaining > 0 {
            return Err(remaining);
        }

        for assignment in &placement.assignments {
            *ledger.entry(assignment.node).or_insert(0.0) += assignment.total_cost();
        }
        Ok(placement)
    }

    /// Totals of a placed job, for logging.
    pub fn job_metrics(job: &Job, allocation: &Allocation) -> JobMetrics {
        let metrics = allocation.metrics();
        tracing::debug!(
            job = %job.name,
            requested = job.requested_instances(),
            placed = metrics.total_instances,
            cost = metrics.total_cost,
            "job metrics"
        );
        metrics
    }

    /// Upper bound of instances of `task` the nodes can hold right now.
    pub fn max_instances(task: &Task, nodes: &[ComputeNode]) -> u32 {
        nodes
            .iter()
            .map(|n| whole_instances(n.schedulable_capacity(), task.cost_on(n)))
            .fold(0_u32, u32::saturating_add)
    }

    pub(crate) fn record(&self, job: &str, node: Option<String>, action: &str, payload: Option<String>) {
        if let Some(audit_sink) = &self.audit {
            let mut sink = audit_sink.lock();
            sink.record(build_audit_event(job, node, action, payload));
        }
    }
}

fn validate_task(task: &Task) -> Result<(), FleetError> {
    let costs_ok = task.cost.base > 0.0 && task.cost.overrides.values().all(|c| *c > 0.0);
    if costs_ok {
        Ok(())
    } else {
        Err(FleetError::InvalidTask(format!(
            "{} has a non-positive per-instance cost",
            task.name()
        )))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_instances(free: f64, cost: f64) -> u32 {
    if cost <= 0.0 || free <= 0.0 {
        return 0;
    }
    let count = (free / cost + INSTANCE_EPSILON).floor();
    if count >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        count as u32
    }
}
