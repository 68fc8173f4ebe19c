//! Tests for audit sink

use offer_scheduler::core::{build_audit_event, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        "job-0",
        "offer-scheduler",
        Some("n1".to_string()),
        "launch",
        Some("o1".to_string()),
    );

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].task_id, "job-0");
    assert_eq!(events[0].action, "launch");
    assert_eq!(events[0].payload.as_deref(), Some("o1"));
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    for task in ["a", "b", "c"] {
        sink.record(build_audit_event(task, "fw", None, "submit", None));
    }

    let tasks: Vec<_> = sink.events().into_iter().map(|e| e.task_id).collect();
    assert_eq!(tasks, vec!["b", "c"]);
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("a", "fw", None, "submit", None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_clones_share_events() {
    let sink = InMemoryAuditSink::new(4);
    let mut writer = sink.clone();
    writer.record(build_audit_event("a", "fw", None, "finish", Some("Lost".into())));
    assert_eq!(sink.events()[0].action, "finish");
}
