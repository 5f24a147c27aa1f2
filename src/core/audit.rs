//! Audit trail of scheduling decisions.
//!
//! Records scheduling decisions (lock waits, placements, shortfalls, dispatches)
//! so callers can inspect what the scheduler did without scraping logs.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::clock::now_ms;

/// One recorded scheduling decision.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Unique id (uuid v4).
    pub event_id: String,
    /// Related job name.
    pub job: String,
    /// Related node hostname, if the event concerns one node.
    pub node: Option<String>,
    /// Action taken (schedule, shortfall, dispatch, launch_failed, prepare, batch).
    pub action: String,
    /// Wall-clock time of the decision, ms since the epoch.
    pub created_at_ms: u128,
    /// Free-form detail such as an error message.
    pub payload: Option<String>,
}

/// Destination for audit events.
pub trait AuditSink: Send {
    /// Store or forward one event.
    fn record(&mut self, event: AuditEvent);
}

/// Bounded in-memory trail; the oldest event is dropped when full.
///
/// Clones share one buffer, so a handle kept by the caller sees events
/// recorded through the copy handed to the scheduler.
#[derive(Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a trail holding at most `max_events` events.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events))),
            max_events,
        }
    }

    /// Copy of the stored events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that forwards every event to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::debug!(
            event_id = %event.event_id,
            job = %event.job,
            node = ?event.node,
            action = %event.action,
            payload = ?event.payload,
            "audit"
        );
    }
}

/// Helper to build an audit event with a fresh id.
pub fn build_audit_event(
    job: impl Into<String>,
    node: Option<String>,
    action: impl Into<String>,
    payload: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        job: job.into(),
        node,
        action: action.into(),
        created_at_ms: now_ms(),
        payload,
    }
}
