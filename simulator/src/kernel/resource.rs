//! Priority-aware bounded resource pool
//!
//! Enforces a hard capacity limit with a wait queue ordered by (priority
//! class descending, arrival order ascending). Grants are non-preemptive:
//! once a case holds a slot it runs to completion, regardless of who
//! arrives later.
//!
//! The pool is mutated only by `try_acquire`/`release` inside a single
//! scheduler step, so holder count and queue state are always consistent
//! when any other process observes them.

use crate::kernel::scheduler::ProcessId;
use crate::models::PriorityClass;

/// One queued acquisition request.
#[derive(Debug, Clone, Copy)]
struct Waiter {
    priority: PriorityClass,
    /// Arrival order at this pool, assigned on enqueue
    arrival: u64,
    process: ProcessId,
}

/// A finite shared capacity (e.g. weekly imaging or specialist slots).
///
/// # Example
/// ```
/// use careflow_simulator_core_rs::kernel::ResourcePool;
/// use careflow_simulator_core_rs::models::PriorityClass;
///
/// let mut pool = ResourcePool::new("radiology".to_string(), 1);
/// assert!(pool.try_acquire(0, PriorityClass::Routine));
/// assert!(!pool.try_acquire(1, PriorityClass::Urgent)); // queued
///
/// // Releasing hands the slot to the best waiter.
/// assert_eq!(pool.release(), Some(1));
/// ```
#[derive(Debug)]
pub struct ResourcePool {
    name: String,
    capacity: usize,
    in_use: usize,
    waiting: Vec<Waiter>,
    next_arrival: u64,
}

impl ResourcePool {
    /// Create a pool with the given capacity.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; scenario validation rejects zero
    /// capacities before any pool is built.
    pub fn new(name: String, capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            name,
            capacity,
            in_use: 0,
            waiting: Vec::new(),
            next_arrival: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held. Never exceeds `capacity`.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Requests currently waiting for a slot.
    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Try to take a slot for `process`.
    ///
    /// Returns `true` on an immediate grant. Otherwise the request is
    /// queued by (priority descending, arrival ascending) and the caller
    /// must suspend until [`release`](Self::release) hands it the slot.
    pub fn try_acquire(&mut self, process: ProcessId, priority: PriorityClass) -> bool {
        if self.in_use < self.capacity {
            self.in_use += 1;
            return true;
        }

        let arrival = self.next_arrival;
        self.next_arrival += 1;
        self.waiting.push(Waiter {
            priority,
            arrival,
            process,
        });
        false
    }

    /// Free one slot.
    ///
    /// If waiters exist, the slot transfers to the best one at this
    /// instant (highest priority, earliest arrival among ties) and its
    /// process id is returned so the scheduler can resume it at the
    /// current virtual time. The holder count never dips in between, so
    /// the capacity invariant holds at every observable point.
    pub fn release(&mut self) -> Option<ProcessId> {
        debug_assert!(self.in_use > 0, "release on an empty pool");

        let best = self
            .waiting
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| b.arrival.cmp(&a.arrival))
            })
            .map(|(index, _)| index);

        match best {
            Some(index) => {
                let waiter = self.waiting.remove(index);
                Some(waiter.process)
            }
            None => {
                self.in_use -= 1;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_panics() {
        ResourcePool::new("broken".to_string(), 0);
    }

    #[test]
    fn test_immediate_grant_within_capacity() {
        let mut pool = ResourcePool::new("specialist".to_string(), 2);
        assert!(pool.try_acquire(0, PriorityClass::Routine));
        assert!(pool.try_acquire(1, PriorityClass::Routine));
        assert_eq!(pool.in_use(), 2);
        assert!(!pool.try_acquire(2, PriorityClass::Urgent));
        assert_eq!(pool.queue_len(), 1);
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn test_priority_then_fifo_grant_order() {
        let mut pool = ResourcePool::new("radiology".to_string(), 1);
        assert!(pool.try_acquire(0, PriorityClass::Routine));

        assert!(!pool.try_acquire(1, PriorityClass::Routine));
        assert!(!pool.try_acquire(2, PriorityClass::Urgent));
        assert!(!pool.try_acquire(3, PriorityClass::Urgent));

        // Urgent beats the earlier Routine arrival; among the two Urgent
        // waiters, the earlier one wins.
        assert_eq!(pool.release(), Some(2));
        assert_eq!(pool.release(), Some(3));
        assert_eq!(pool.release(), Some(1));
        assert_eq!(pool.in_use(), 1);
        assert_eq!(pool.release(), None);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_capacity_never_exceeded_on_transfer() {
        let mut pool = ResourcePool::new("radiology".to_string(), 1);
        assert!(pool.try_acquire(0, PriorityClass::Routine));
        assert!(!pool.try_acquire(1, PriorityClass::Routine));

        // Slot transfers to the waiter without the count dropping to zero.
        assert_eq!(pool.release(), Some(1));
        assert_eq!(pool.in_use(), 1);
    }
}
