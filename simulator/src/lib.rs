//! Careflow Simulator Core - Rust Engine
//!
//! Deterministic discrete-event simulation of a multi-stage care
//! coordination pipeline under shared, capacity-limited resources and
//! priority-based dispatch. Different automation policies (manual
//! baseline, FIFO queueing, rule-driven, partially automated, fully
//! orchestrated) are compared on identical inputs by expressing each as a
//! [`scenario::ScenarioConfig`] driven through the single engine.
//!
//! # Architecture
//!
//! - **rng**: Deterministic random number generation
//! - **sampling**: Stage delay distributions
//! - **models**: Domain types (cases, events, ledger)
//! - **triage**: Priority classification
//! - **kernel**: Event scheduler and resource pools
//! - **process**: Per-case coordination state machine
//! - **cohort**: Case population generation
//! - **scenario**: Policy configuration and built-in presets
//! - **orchestrator**: The run loop
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG, stable draw order)
//! 2. Global event order is (virtual time, creation sequence), never
//!    priority; priority orders resource queues only
//! 3. A run either returns a complete ledger or a descriptive error,
//!    never a partial result
//!
//! # Example
//!
//! ```
//! use careflow_simulator_core_rs::{run_scenario, scenario::presets};
//!
//! let ledger = run_scenario(presets::fifo(), 50, 42).unwrap();
//! assert_eq!(ledger.len(), 50);
//!
//! // Same inputs, same ledger - bit for bit.
//! let again = run_scenario(presets::fifo(), 50, 42).unwrap();
//! assert_eq!(ledger.fingerprint(), again.fingerprint());
//! ```

// Module declarations
pub mod cohort;
pub mod kernel;
pub mod models;
pub mod orchestrator;
pub mod process;
pub mod rng;
pub mod sampling;
pub mod scenario;
pub mod triage;

// Re-exports for convenience
pub use cohort::{CohortConfig, CohortGenerator};
pub use kernel::{EventQueue, KernelError, ResourcePool};
pub use models::{
    CaseRecord, CompletedCase, CompletedLedger, EventLog, PriorityClass, SimEvent,
};
pub use orchestrator::{run_scenario, Orchestrator, SimulationError};
pub use rng::RngManager;
pub use sampling::{DelayDistribution, DistributionError, MIN_DURATION};
pub use scenario::{ScenarioConfig, StageConfig, StageDelay};
pub use triage::{TriageConfig, TriageRules};
