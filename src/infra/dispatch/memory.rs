//! Dispatcher that records transfers and launches instead of running anything.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::Task;
use crate::dispatch::{Dispatcher, ProcessHandle};

#[derive(Default)]
struct DispatchState {
    present: HashSet<(String, String)>,
    transfers: Vec<(String, String)>,
    launches: Vec<ProcessHandle>,
    failing: HashSet<String>,
    next_pid: u64,
}

/// Recording dispatcher for development and testing.
///
/// Clones share state. Hosts marked with [`RecordingDispatcher::fail_on`]
/// reject every launch.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    state: Arc<Mutex<DispatchState>>,
}

impl RecordingDispatcher {
    /// Create a dispatcher with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every launch on `hostname` fail.
    pub fn fail_on(&self, hostname: impl Into<String>) {
        self.state.lock().failing.insert(hostname.into());
    }

    /// Stop failing launches.
    pub fn clear_failures(&self) {
        self.state.lock().failing.clear();
    }

    /// Started processes, in launch order.
    pub fn launches(&self) -> Vec<ProcessHandle> {
        self.state.lock().launches.clone()
    }

    /// `(script, hostname)` pairs copied so far.
    pub fn transfers(&self) -> Vec<(String, String)> {
        self.state.lock().transfers.clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn ensure_present(&self, task: &Task, hostname: &str) -> Result<(), String> {
        let mut state = self.state.lock();
        if hostname == task.source {
            return Ok(());
        }
        let key = (task.script.clone(), hostname.to_string());
        if state.present.insert(key.clone()) {
            state.transfers.push(key);
        }
        Ok(())
    }

    async fn launch(
        &self,
        task: &Task,
        hostname: &str,
        instances: u32,
    ) -> Result<ProcessHandle, String> {
        let mut state = self.state.lock();
        if state.failing.contains(hostname) {
            return Err(format!("{hostname} refused to start {}", task.script));
        }
        state.next_pid += 1;
        let handle = ProcessHandle {
            pid: state.next_pid,
            hostname: hostname.to_string(),
            script: task.script.clone(),
            instances,
        };
        state.launches.push(handle.clone());
        Ok(handle)
    }
}
