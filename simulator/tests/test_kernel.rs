//! Kernel tests: event ordering and resource pool discipline
//!
//! The two orderings are independent: global event order is (time,
//! creation sequence); grant order is (priority, arrival). These tests pin
//! both down through the public kernel API.

use careflow_simulator_core_rs::kernel::{EventQueue, KernelError, ResourcePool};
use careflow_simulator_core_rs::models::PriorityClass;

#[test]
fn test_events_pop_in_time_order() {
    let mut queue = EventQueue::new();
    queue.schedule_after(5.0, 0).unwrap();
    queue.schedule_after(1.0, 1).unwrap();
    queue.schedule_after(3.0, 2).unwrap();

    assert_eq!(queue.pop_next(), Some((1.0, 1)));
    assert_eq!(queue.pop_next(), Some((3.0, 2)));
    assert_eq!(queue.pop_next(), Some((5.0, 0)));
    assert_eq!(queue.pop_next(), None);
}

#[test]
fn test_ties_break_by_creation_sequence_not_process_id() {
    let mut queue = EventQueue::new();
    // Higher process ids scheduled first must still pop first on a tie.
    queue.schedule_after(2.0, 9).unwrap();
    queue.schedule_after(2.0, 3).unwrap();
    queue.schedule_after(2.0, 7).unwrap();

    assert_eq!(queue.pop_next(), Some((2.0, 9)));
    assert_eq!(queue.pop_next(), Some((2.0, 3)));
    assert_eq!(queue.pop_next(), Some((2.0, 7)));
}

#[test]
fn test_negative_delay_is_fatal_not_retried() {
    let mut queue = EventQueue::new();
    assert_eq!(
        queue.schedule_after(-1.0, 0),
        Err(KernelError::InvalidDelay(-1.0))
    );
    // The queue stays usable; the bad event was never enqueued.
    assert_eq!(queue.pending(), 0);
    queue.schedule_after(1.0, 0).unwrap();
    assert_eq!(queue.pop_next(), Some((1.0, 0)));
}

#[test]
fn test_clock_advances_monotonically_across_interleaved_schedules() {
    let mut queue = EventQueue::new();
    queue.schedule_after(10.0, 0).unwrap();
    queue.schedule_after(4.0, 1).unwrap();

    assert_eq!(queue.pop_next(), Some((4.0, 1)));
    // New events are relative to the advanced clock.
    queue.schedule_after(2.0, 2).unwrap();
    assert_eq!(queue.pop_next(), Some((6.0, 2)));
    assert_eq!(queue.pop_next(), Some((10.0, 0)));
    assert_eq!(queue.now(), 10.0);
}

#[test]
fn test_pool_grants_by_priority_then_arrival() {
    let mut pool = ResourcePool::new("specialist".to_string(), 2);
    assert!(pool.try_acquire(0, PriorityClass::Routine));
    assert!(pool.try_acquire(1, PriorityClass::Routine));

    assert!(!pool.try_acquire(2, PriorityClass::Routine));
    assert!(!pool.try_acquire(3, PriorityClass::High));
    assert!(!pool.try_acquire(4, PriorityClass::High));
    assert!(!pool.try_acquire(5, PriorityClass::Urgent));

    assert_eq!(pool.release(), Some(5)); // urgent first
    assert_eq!(pool.release(), Some(3)); // then earlier of the two High
    assert_eq!(pool.release(), Some(4));
    assert_eq!(pool.release(), Some(2)); // routine last despite arriving first
}

#[test]
fn test_grant_is_never_revoked() {
    let mut pool = ResourcePool::new("radiology".to_string(), 1);

    // A routine case holds the only slot.
    assert!(pool.try_acquire(0, PriorityClass::Routine));

    // An urgent case arriving later queues; the running holder keeps the
    // slot (non-preemptive).
    assert!(!pool.try_acquire(1, PriorityClass::Urgent));
    assert_eq!(pool.in_use(), 1);
    assert_eq!(pool.queue_len(), 1);

    // Only on release does the urgent case get in.
    assert_eq!(pool.release(), Some(1));
}

#[test]
fn test_pool_count_bounded_by_capacity() {
    let mut pool = ResourcePool::new("radiology".to_string(), 3);
    for pid in 0..10 {
        pool.try_acquire(pid, PriorityClass::Routine);
        assert!(pool.in_use() <= 3);
    }
    assert_eq!(pool.in_use(), 3);
    assert_eq!(pool.queue_len(), 7);

    for _ in 0..7 {
        assert!(pool.release().is_some());
        assert_eq!(pool.in_use(), 3);
    }
    assert!(pool.release().is_none());
    assert_eq!(pool.in_use(), 2);
}
