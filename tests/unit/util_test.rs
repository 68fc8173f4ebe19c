//! Tests for utility functions

use offer_scheduler::util::{
    now_ms, FrameworkId, NodeId, Resources, TaskId, ValueRange, CPUS, MEM, PORTS,
};

#[test]
fn test_ids_compare_and_display() {
    assert_eq!(TaskId::from("job-0"), TaskId::new("job-0".to_string()));
    assert_eq!(NodeId::from("n1").to_string(), "n1");
    assert_eq!(FrameworkId::from("fw").as_str(), "fw");
}

#[test]
fn test_scalar_arithmetic_is_exact() {
    let offer = Resources::new().with_scalar(CPUS, 1.0);
    let task = Resources::new().with_scalar(CPUS, 0.1);

    let mut left = offer;
    for _ in 0..10 {
        left = left.checked_sub(&task).unwrap();
    }
    assert!(left.is_empty());
    assert!(left.checked_sub(&task).is_none());
}

#[test]
fn test_range_subtraction_splits() {
    let offer = Resources::new().with_ranges(PORTS, [(100, 110)]);
    let task = Resources::new().with_ranges(PORTS, [(105, 106)]);
    let left = offer.checked_sub(&task).unwrap();
    assert_eq!(
        left.ranges(PORTS),
        vec![ValueRange::new(100, 104), ValueRange::new(107, 110)]
    );
}

#[test]
fn test_ranges_normalize() {
    let r = Resources::new().with_ranges(PORTS, [(5, 7), (1, 3), (4, 4), (9, 8)]);
    assert_eq!(r.ranges(PORTS), vec![ValueRange::new(1, 7)]);
}

#[test]
fn test_sum_and_display() {
    let a = Resources::new().with_scalar(CPUS, 1.5).with_scalar(MEM, 64.0);
    let b = Resources::new().with_scalar(CPUS, 0.5);
    let total = Resources::sum([&a, &b]);
    assert!((total.cpus() - 2.0).abs() < f64::EPSILON);
    assert_eq!(total.to_string(), "cpus:2; mem:64");
}

#[test]
fn test_now_ms_is_monotone_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
    assert!(a > 0);
}

#[test]
fn test_init_tracing_is_idempotent() {
    offer_scheduler::util::init_tracing();
    offer_scheduler::util::init_tracing();
}
