//! Scenario configuration
//!
//! A [`ScenarioConfig`] is the complete, immutable description of one
//! policy variant: its ordered stage list, resource capacities, triage
//! rule set and cohort attribute rules. Per-policy behavior lives entirely
//! in this data; there is exactly one engine.
//!
//! Validation is eager: `Orchestrator::new` rejects an inconsistent
//! scenario before any virtual time advances.
//!
//! The [`presets`] module ships the five policy variants the simulator was
//! built to compare.

pub mod presets;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cohort::CohortConfig;
use crate::sampling::DelayDistribution;
use crate::triage::TriageConfig;

/// Multiplier applied when the case carries a flag (e.g. records arrive
/// electronically for cases with an integrated record system).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagMultiplier {
    pub flag: String,
    pub multiplier: f64,
}

/// Confirmation-stage behavior: with `probability` the patient no-shows
/// and the delay is drawn from `reschedule` (times the stage multiplier);
/// otherwise the stage takes the fixed `confirm_delay`.
///
/// Rework is always modeled this way: an explicit sampled delay, never a
/// retry loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoShowRule {
    pub probability: f64,
    pub reschedule: DelayDistribution,
    pub confirm_delay: f64,
}

/// How a stage's delay is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageDelay {
    /// Duration drawn from a distribution family
    Sampled(DelayDistribution),

    /// Confirmation with a no-show chance
    Confirmation(NoShowRule),
}

/// One pipeline stage definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage name, unique within the scenario
    pub name: String,

    /// Delay model
    pub delay: StageDelay,

    /// Resource pool the stage must hold a slot of, if any
    pub resource: Option<String>,

    /// Automation speedup/slowdown applied to the sampled delay.
    /// Calibration data, not derived logic.
    pub multiplier: f64,

    /// Extra multiplier applied when the case carries a flag
    pub flag_multiplier: Option<FlagMultiplier>,

    /// Bounded look-ahead: this stage may begin up to this long before the
    /// previous stage fully elapses. Zero means strictly sequential.
    pub overlap_with_previous: f64,
}

impl StageConfig {
    /// A strictly sequential, unbound stage with multiplier 1.0.
    pub fn new(name: &str, distribution: DelayDistribution) -> Self {
        Self {
            name: name.to_string(),
            delay: StageDelay::Sampled(distribution),
            resource: None,
            multiplier: 1.0,
            flag_multiplier: None,
            overlap_with_previous: 0.0,
        }
    }

    /// A confirmation stage with a no-show rule.
    pub fn confirmation(name: &str, rule: NoShowRule) -> Self {
        Self {
            name: name.to_string(),
            delay: StageDelay::Confirmation(rule),
            resource: None,
            multiplier: 1.0,
            flag_multiplier: None,
            overlap_with_previous: 0.0,
        }
    }

    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resource = Some(resource.to_string());
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_flag_multiplier(mut self, flag: &str, multiplier: f64) -> Self {
        self.flag_multiplier = Some(FlagMultiplier {
            flag: flag.to_string(),
            multiplier,
        });
        self
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap_with_previous = overlap;
        self
    }
}

/// Complete configuration for one policy variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario label carried into the ledger
    pub name: String,

    /// Ordered stage definitions; execution order for every case
    pub stages: Vec<StageConfig>,

    /// Resource pool capacities (name → slots)
    pub resources: BTreeMap<String, usize>,

    /// Triage variant
    pub triage: TriageConfig,

    /// Cohort attribute sampling rules
    pub cohort: CohortConfig,

    /// Fixed inter-arrival offset between consecutive cases, avoiding
    /// simultaneous-time ties at the start of the run
    pub arrival_stagger: f64,

    /// Safety bound on processed scheduler events; exceeding it fails the
    /// run with `SchedulerStalled` instead of looping forever
    pub max_events: usize,
}

/// Default scheduler safety bound, generous for any sane configuration.
pub const DEFAULT_MAX_EVENTS: usize = 1_000_000;

/// Default inter-arrival stagger between consecutive cases.
pub const DEFAULT_ARRIVAL_STAGGER: f64 = 0.01;
