//! Cohort generation
//!
//! Materializes the case population for a run before any virtual time
//! passes. All attributes are drawn through the run's [`RngManager`] in
//! case-id order, so a fixed seed reproduces the cohort exactly.
//!
//! # Example
//!
//! ```
//! use careflow_simulator_core_rs::cohort::{CohortConfig, CohortGenerator};
//! use careflow_simulator_core_rs::RngManager;
//!
//! let config = CohortConfig {
//!     age_range: (35, 85),
//!     diagnoses: vec!["diabetes".to_string(), "hypertension".to_string()],
//!     urgent_probability: 0.15,
//!     flag_probabilities: Default::default(),
//! };
//!
//! let mut rng = RngManager::new(42);
//! let cohort = CohortGenerator::new(config).generate(10, &mut rng);
//! assert_eq!(cohort.len(), 10);
//! assert_eq!(cohort[3].id(), 3);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::CaseRecord;
use crate::rng::RngManager;

/// Attribute sampling rules for cohort generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortConfig {
    /// Uniform integer age range [min, max)
    pub age_range: (u32, u32),

    /// Diagnosis labels, chosen uniformly
    pub diagnoses: Vec<String>,

    /// Probability of the urgency indicator being set
    pub urgent_probability: f64,

    /// Policy-specific flags and their probabilities
    /// (e.g. "ehr_integration" → 0.85). BTreeMap keeps draw order stable.
    pub flag_probabilities: BTreeMap<String, f64>,
}

/// Generates a cohort from the configured attribute rules.
#[derive(Debug, Clone)]
pub struct CohortGenerator {
    config: CohortConfig,
}

impl CohortGenerator {
    pub fn new(config: CohortConfig) -> Self {
        Self { config }
    }

    /// Generate `case_count` cases with sequential ids.
    ///
    /// Draw order per case: age, diagnosis, urgency, then flags in key
    /// order. Changing this order changes every downstream sample, so it
    /// is part of the determinism contract.
    pub fn generate(&self, case_count: usize, rng: &mut RngManager) -> Vec<CaseRecord> {
        (0..case_count)
            .map(|id| {
                let (min_age, max_age) = self.config.age_range;
                let age = rng.range(min_age as i64, max_age as i64) as u32;

                let diagnosis = self.config.diagnoses[rng.index(self.config.diagnoses.len())].clone();
                let urgent = rng.chance(self.config.urgent_probability);

                let mut flags = BTreeSet::new();
                for (flag, probability) in &self.config.flag_probabilities {
                    if rng.chance(*probability) {
                        flags.insert(flag.clone());
                    }
                }

                CaseRecord::new(id, age, diagnosis, urgent, flags)
            })
            .collect()
    }
}
