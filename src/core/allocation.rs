//! Placement results.

use serde::{Deserialize, Serialize};

use crate::core::NodeId;

/// Instances of one task assigned to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAssignment {
    /// Node arena id.
    pub node: NodeId,
    /// Node hostname.
    pub hostname: String,
    /// Assigned instance count; never zero.
    pub instances: u32,
    /// Per-instance cost on this node.
    pub cost_per_instance: f64,
}

impl NodeAssignment {
    /// Capacity committed by this assignment.
    pub fn total_cost(&self) -> f64 {
        f64::from(self.instances) * self.cost_per_instance
    }
}

/// Placement of a single task, in candidate-node order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPlacement {
    /// Assignments, one per node that received instances.
    pub assignments: Vec<NodeAssignment>,
}

impl TaskPlacement {
    /// Total placed instances.
    pub fn placed(&self) -> u32 {
        self.assignments.iter().map(|a| a.instances).sum()
    }

    /// Instances assigned to `hostname`, if any.
    pub fn on(&self, hostname: &str) -> Option<u32> {
        self.assignments
            .iter()
            .find(|a| a.hostname == hostname)
            .map(|a| a.instances)
    }
}

/// Placement for every task of a job, indexed like `Job::tasks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// One placement per task, same order as the job.
    pub placements: Vec<TaskPlacement>,
}

impl Allocation {
    /// Telemetry totals for this allocation.
    pub fn metrics(&self) -> JobMetrics {
        self.placements
            .iter()
            .flat_map(|p| p.assignments.iter())
            .fold(JobMetrics::default(), |mut m, a| {
                m.total_instances += u64::from(a.instances);
                m.total_cost += a.total_cost();
                m
            })
    }
}

/// Totals committed by an allocation. Used for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMetrics {
    /// Sum of instances across all tasks and nodes.
    pub total_instances: u64,
    /// Sum of capacity across all tasks and nodes.
    pub total_cost: f64,
}
