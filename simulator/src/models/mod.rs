//! Domain models for the care-pathway simulator

pub mod case;
pub mod event;
pub mod ledger;

// Re-exports
pub use case::{CaseRecord, CompletedCase, PriorityClass, ResourceWait, StageDuration};
pub use event::{EventLog, SimEvent};
pub use ledger::CompletedLedger;
