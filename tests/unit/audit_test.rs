//! Tests for audit sink

use fleet_batcher::core::{build_audit_event, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        "batch-n00dles",
        Some("home".to_string()),
        "schedule",
        Some("payload".to_string()),
    );

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].job, "batch-n00dles");
    assert_eq!(events[0].node.as_deref(), Some("home"));
    assert_eq!(events[0].action, "schedule");
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("job1", None, "schedule", None));
    sink.record(build_audit_event("job2", None, "schedule", None));
    sink.record(build_audit_event("job3", None, "schedule", None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job, "job2"); // First one popped
    assert_eq!(events[1].job, "job3");
}

#[test]
fn test_clones_share_events() {
    let handle = InMemoryAuditSink::new(4);
    let mut recorder = handle.clone();
    recorder.record(build_audit_event("job", None, "dispatch", None));
    assert_eq!(handle.events().len(), 1);
}

#[test]
fn test_build_audit_event_ids_are_unique() {
    let a = build_audit_event("job", None, "schedule", None);
    let b = build_audit_event("job", None, "schedule", None);
    assert_ne!(a.event_id, b.event_id);
    assert!(a.created_at_ms > 0);
}

#[test]
fn test_zero_capacity_sink_stores_nothing() {
    let mut sink = InMemoryAuditSink::new(0);

    sink.record(build_audit_event("job1", None, "schedule", None));
    sink.record(build_audit_event("job2", None, "shortfall", None));

    assert!(sink.events().is_empty());
}
