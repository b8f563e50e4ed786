//! Orchestrator - scenario run loop
//!
//! Wires a scenario's cohort, triage, pools and stage definitions into the
//! DES kernel and drives every case process to completion.
//!
//! See `engine.rs` for the implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{run_scenario, Orchestrator, SimulationError};
