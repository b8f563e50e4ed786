//! Discrete-event simulation kernel
//!
//! The kernel owns the two orderings that everything else relies on:
//!
//! - **Global event order** ([`EventQueue`]): virtual time ascending, ties
//!   broken by creation sequence. Case priority never participates.
//! - **Resource grant order** ([`ResourcePool`]): priority class descending,
//!   ties broken by arrival order at the pool. Virtual time never
//!   participates beyond "a slot must be free".
//!
//! These are independent orderings; conflating them breaks determinism.

pub mod resource;
pub mod scheduler;

pub use resource::ResourcePool;
pub use scheduler::{EventQueue, KernelError, ProcessId};
