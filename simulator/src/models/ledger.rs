//! Completed-case ledger
//!
//! The ledger is the sole interface between a finished run and downstream
//! analysis. It holds the finalized cases in arrival order, the full event
//! log, and a SHA-256 fingerprint of the case records for cheap determinism
//! checks across runs.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::case::CompletedCase;
use crate::models::event::EventLog;

/// Ordered collection of finalized case records produced by one run.
///
/// Cases appear in arrival order (ascending id). The ledger is immutable
/// once returned by the runner.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedLedger {
    /// Scenario label the run was configured with
    pub scenario: String,

    /// Seed the run's RNG context was built from
    pub seed: u64,

    /// Finalized cases in arrival order
    pub cases: Vec<CompletedCase>,

    /// Full event log of the run
    pub events: EventLog,
}

impl CompletedLedger {
    /// Number of completed cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Total latencies in arrival order.
    pub fn latencies(&self) -> Vec<f64> {
        self.cases.iter().map(|c| c.total_latency).collect()
    }

    /// Mean total latency across the cohort. Zero for an empty ledger.
    pub fn mean_latency(&self) -> f64 {
        if self.cases.is_empty() {
            return 0.0;
        }
        self.cases.iter().map(|c| c.total_latency).sum::<f64>() / self.cases.len() as f64
    }

    /// Serialize the full ledger (cases and events) to a JSON string for
    /// out-of-process consumers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// SHA-256 fingerprint of the case records.
    ///
    /// Floats are hashed by their exact bit patterns, so two runs with
    /// identical `(config, case_count, seed)` produce the same fingerprint
    /// and any divergence in any case field changes it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for case in &self.cases {
            hasher.update(case.id.to_le_bytes());
            hasher.update(case.age.to_le_bytes());
            hasher.update(case.diagnosis.as_bytes());
            hasher.update([case.urgent as u8, case.priority as u8]);
            for flag in &case.flags {
                hasher.update(flag.as_bytes());
            }
            hasher.update(case.arrival_time.to_bits().to_le_bytes());
            hasher.update(case.completion_time.to_bits().to_le_bytes());
            hasher.update(case.total_latency.to_bits().to_le_bytes());
            for s in &case.stage_durations {
                hasher.update(s.stage.as_bytes());
                hasher.update(s.duration.to_bits().to_le_bytes());
            }
            for w in &case.resource_waits {
                hasher.update(w.resource.as_bytes());
                hasher.update(w.stage.as_bytes());
                hasher.update(w.wait.to_bits().to_le_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}
