//! Tasks and jobs: the units the scheduler places.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::ComputeNode;
use crate::core::NodeFacts;

/// Per-instance capacity cost of a task.
///
/// The same executable may in principle cost differently on different hosts,
/// so hosts can carry an override of the base cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Cost on any host without an override.
    pub base: f64,
    /// Hostname to cost overrides.
    #[serde(default)]
    pub overrides: HashMap<String, f64>,
}

impl ResourceCost {
    /// Uniform cost across every host.
    pub fn uniform(base: f64) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    /// Add a host-specific cost.
    #[must_use]
    pub fn with_override(mut self, hostname: impl Into<String>, cost: f64) -> Self {
        self.overrides.insert(hostname.into(), cost);
        self
    }

    /// Cost of one instance on `hostname`.
    pub fn on_host(&self, hostname: &str) -> f64 {
        self.overrides.get(hostname).copied().unwrap_or(self.base)
    }
}

/// One executable unit requesting a number of instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Executable reference (script path).
    pub script: String,
    /// Requested instance count.
    pub instances: u32,
    /// Per-instance cost.
    pub cost: ResourceCost,
    /// Hostname the executable is copied from.
    pub source: String,
    /// Start offset relative to dispatch, in milliseconds.
    pub delay_ms: f64,
    /// Extra arguments handed to the executable.
    pub args: Vec<String>,
}

impl Task {
    /// Create a task with no delay and no arguments.
    pub fn new(
        script: impl Into<String>,
        source: impl Into<String>,
        instances: u32,
        cost: ResourceCost,
    ) -> Self {
        Self {
            script: script.into(),
            instances,
            cost,
            source: source.into(),
            delay_ms: 0.0,
            args: Vec::new(),
        }
    }

    /// Set the start offset.
    #[must_use]
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Append an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// File name of the script without its directory.
    pub fn name(&self) -> &str {
        self.script
            .rsplit_once('/')
            .map_or(self.script.as_str(), |(_, name)| name)
    }

    /// Cost of one instance on `node`.
    pub fn cost_on(&self, node: &ComputeNode) -> f64 {
        self.cost.on_host(node.hostname())
    }
}

/// An ordered group of tasks scheduled all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Job name, used in logs and errors.
    pub name: String,
    tasks: Vec<Task>,
    /// How long the caller should wait after dispatch before re-evaluating (ms).
    pub execution_time_ms: Option<f64>,
}

impl Job {
    /// Create an empty job.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
            execution_time_ms: None,
        }
    }

    /// Append tasks in order.
    pub fn add_tasks(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    /// Builder form of [`Job::add_tasks`] for a single task.
    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Set the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: f64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Tasks in scheduling order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Sum of requested instances across tasks.
    pub fn requested_instances(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.instances)).sum()
    }
}
