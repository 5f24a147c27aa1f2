//! Dispatch of placed jobs onto nodes.
//!
//! The [`Dispatcher`] trait is the boundary to whatever copies executables and
//! starts processes. Launches are fire-and-forget: a launch returns as soon as
//! the process is started and completion is never awaited here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Allocation, FleetError, Job, NodeAssignment, Task};

/// Handle of a started remote process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessHandle {
    /// Process id reported by the node.
    pub pid: u64,
    /// Hostname the process runs on.
    pub hostname: String,
    /// Script the process runs.
    pub script: String,
    /// Instances (threads) the process was started with.
    pub instances: u32,
}

/// Boundary for transfer and launch mechanics.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Make sure the task's executable exists on `hostname`, copying it from
    /// the task's source host if absent.
    async fn ensure_present(&self, task: &Task, hostname: &str) -> Result<(), String>;

    /// Start `instances` of `task` on `hostname`.
    async fn launch(
        &self,
        task: &Task,
        hostname: &str,
        instances: u32,
    ) -> Result<ProcessHandle, String>;
}

/// Launch every assignment of `allocation`, task by task in job order.
///
/// Stops at the first transfer or launch failure. Processes already started
/// keep running; nothing is rolled back.
pub async fn dispatch_allocation<D>(
    dispatcher: &D,
    job: &Job,
    allocation: &Allocation,
) -> Result<Vec<ProcessHandle>, FleetError>
where
    D: Dispatcher + ?Sized,
{
    let mut handles = Vec::new();
    for (task, placement) in job.tasks().iter().zip(&allocation.placements) {
        tracing::info!(
            job = %job.name,
            script = %task.script,
            source = %task.source,
            instances = task.instances,
            delay_ms = task.delay_ms,
            "dispatching script"
        );
        for assignment in &placement.assignments {
            let handle = launch_one(dispatcher, job, task, assignment).await?;
            handles.push(handle);
        }
    }
    Ok(handles)
}

async fn launch_one<D>(
    dispatcher: &D,
    job: &Job,
    task: &Task,
    assignment: &NodeAssignment,
) -> Result<ProcessHandle, FleetError>
where
    D: Dispatcher + ?Sized,
{
    let fail = |reason: String| {
        tracing::error!(
            job = %job.name,
            script = task.name(),
            node = %assignment.hostname,
            reason = %reason,
            "dispatch failed"
        );
        FleetError::Dispatch {
            job: job.name.clone(),
            task: task.name().to_string(),
            node: assignment.hostname.clone(),
            reason,
        }
    };

    dispatcher
        .ensure_present(task, &assignment.hostname)
        .await
        .map_err(fail)?;
    tracing::debug!(
        script = %task.script,
        executor = %assignment.hostname,
        threads = assignment.instances,
        args = ?task.args,
        "executing script"
    );
    dispatcher
        .launch(task, &assignment.hostname, assignment.instances)
        .await
        .map_err(fail)
}
