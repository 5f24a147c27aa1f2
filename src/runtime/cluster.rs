//! The fleet as one schedulable unit.
//!
//! [`Cluster::execute`] is the entry point callers use: refresh the registry,
//! pick schedulable nodes, place the job under the fleet lock, dispatch it, and
//! release the lock. A job either dispatches in full or not at all; a launch
//! failure after placement is reported but not rolled back.

use parking_lot::Mutex;

use crate::core::{
    Allocation, ComputeNode, FleetError, HostFacts, Job, JobMetrics, Scheduler, Task,
};
use crate::dispatch::{dispatch_allocation, Dispatcher, ProcessHandle};
use crate::registry::{FleetSnapshot, HostProbe, NodeRegistry};

/// What a successful execution dispatched.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Placement used.
    pub allocation: Allocation,
    /// Totals of the placement.
    pub metrics: JobMetrics,
    /// Started processes, in dispatch order.
    pub handles: Vec<ProcessHandle>,
}

/// Registry, scheduler, and dispatcher of one fleet.
pub struct Cluster<P, D> {
    registry: Mutex<NodeRegistry<P>>,
    scheduler: Scheduler,
    dispatcher: D,
}

impl<P, D> Cluster<P, D>
where
    P: HostProbe,
    D: Dispatcher,
{
    /// Compose a cluster from its parts.
    pub fn new(registry: NodeRegistry<P>, scheduler: Scheduler, dispatcher: D) -> Self {
        Self {
            registry: Mutex::new(registry),
            scheduler,
            dispatcher,
        }
    }

    /// Discover the network if nothing is known yet, then refresh every node.
    pub fn initialize(&self) -> Result<(), FleetError> {
        let mut registry = self.registry.lock();
        if registry.is_empty() {
            tracing::info!(root = registry.root(), "initializing cluster from network");
            registry.discover()?;
        }
        registry.refresh_all()
    }

    /// Refresh every node.
    pub fn refresh(&self) -> Result<(), FleetError> {
        self.registry.lock().refresh_all()
    }

    /// Refresh one host and return its facts.
    pub fn refresh_host(&self, hostname: &str) -> Result<HostFacts, FleetError> {
        let mut registry = self.registry.lock();
        registry.refresh_host(hostname).map(|n| n.facts().clone())
    }

    /// Eligible nodes with free capacity, sorted by priority.
    pub fn schedulable_nodes(&self) -> Vec<ComputeNode> {
        self.registry.lock().schedulable_nodes()
    }

    /// Refresh every node, then count the instances of `task` the fleet
    /// could hold right now.
    pub fn max_instances(&self, task: &Task) -> Result<u32, FleetError> {
        let mut registry = self.registry.lock();
        registry.refresh_all()?;
        Ok(Scheduler::max_instances(task, &registry.schedulable_nodes()))
    }

    /// Persistable view of the registry.
    pub fn snapshot(&self) -> FleetSnapshot {
        self.registry.lock().snapshot()
    }

    /// Run `f` with shared access to the registry.
    pub fn with_registry<R>(&self, f: impl FnOnce(&NodeRegistry<P>) -> R) -> R {
        f(&self.registry.lock())
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The dispatcher.
    pub const fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Refresh, place `job` under the fleet lock, dispatch it, release.
    pub async fn execute(&self, job: &Job) -> Result<ExecutionReport, FleetError> {
        let nodes = {
            let mut registry = self.registry.lock();
            registry.refresh_all()?;
            registry.schedulable_nodes()
        };

        let scheduled = match self.scheduler.schedule_job(job, &nodes).await {
            Ok(scheduled) => scheduled,
            Err(err) => {
                tracing::error!(job = %job.name, error = %err, "error while executing job");
                return Err(err);
            }
        };

        let metrics = Scheduler::job_metrics(job, &scheduled.allocation);
        tracing::info!(
            job = %job.name,
            ram = metrics.total_cost,
            threads = metrics.total_instances,
            "dispatching job"
        );

        let result = dispatch_allocation(&self.dispatcher, job, &scheduled.allocation).await;
        scheduled.release.release();

        match result {
            Ok(handles) => {
                self.scheduler.record(
                    &job.name,
                    None,
                    "dispatch",
                    Some(format!("{} processes", handles.len())),
                );
                Ok(ExecutionReport {
                    allocation: scheduled.allocation,
                    metrics,
                    handles,
                })
            }
            Err(err) => {
                let node = match &err {
                    FleetError::Dispatch { node, .. } => Some(node.clone()),
                    _ => None,
                };
                self.scheduler
                    .record(&job.name, node, "launch_failed", Some(err.to_string()));
                Err(err)
            }
        }
    }
}
