//! Case model
//!
//! Represents one entity (patient) traversing the pipeline. Each case has:
//! - A sequential id (arrival order)
//! - Static attributes: age, diagnosis, urgency indicator, policy flags
//! - A triage-assigned priority class (resource-queue ordering only)
//! - Ordered per-stage duration records and resource wait records
//!
//! A [`CaseRecord`] is mutated exclusively by the coordination process that
//! owns it. On completion it is frozen into a [`CompletedCase`], which is
//! never mutated again.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Triage priority class.
///
/// Orders waiters at a resource pool; it never affects global event order.
/// Ordering is `Routine < Elevated < High < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityClass {
    /// Default class when no rule matches
    Routine,

    /// Chronic conditions needing closer follow-up
    Elevated,

    /// Age-based or condition-based escalation
    High,

    /// Urgent keywords in the diagnosis
    Urgent,
}

impl PriorityClass {
    /// All classes, in ascending priority order.
    pub const ALL: [PriorityClass; 4] = [
        PriorityClass::Routine,
        PriorityClass::Elevated,
        PriorityClass::High,
        PriorityClass::Urgent,
    ];
}

/// One recorded stage duration. Insertion order is execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDuration {
    /// Stage name, unique within a case
    pub stage: String,

    /// Latency contribution of the stage, in simulation time units
    pub duration: f64,
}

/// One recorded wait for a resource slot before a stage could start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceWait {
    /// Resource the case queued for
    pub resource: String,

    /// Stage that needed the resource
    pub stage: String,

    /// Time spent in the wait queue
    pub wait: f64,
}

/// A case in flight.
///
/// # Example
/// ```
/// use careflow_simulator_core_rs::models::CaseRecord;
///
/// let case = CaseRecord::new(0, 72, "cancer staging".to_string(), true, Default::default());
/// assert_eq!(case.id(), 0);
/// assert!(case.stage_durations().is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Sequential id, assigned in arrival order
    id: usize,

    /// Patient age in years
    age: u32,

    /// Diagnosis / category label
    diagnosis: String,

    /// Urgency indicator set at cohort generation
    urgent: bool,

    /// Policy-specific flags (e.g. "ehr_integration")
    flags: BTreeSet<String>,

    /// Assigned priority class (triage output)
    priority: PriorityClass,

    /// Virtual time at which the case entered the pipeline
    arrival_time: f64,

    /// Stage durations in execution order
    stage_durations: Vec<StageDuration>,

    /// Resource waits in the order they were incurred
    resource_waits: Vec<ResourceWait>,
}

impl CaseRecord {
    /// Create a new case with the given static attributes.
    ///
    /// Priority starts at `Routine` until triage runs; arrival time is set
    /// by the coordination process when the case enters the pipeline.
    pub fn new(id: usize, age: u32, diagnosis: String, urgent: bool, flags: BTreeSet<String>) -> Self {
        Self {
            id,
            age,
            diagnosis,
            urgent,
            flags,
            priority: PriorityClass::Routine,
            arrival_time: 0.0,
            stage_durations: Vec::new(),
            resource_waits: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    pub fn urgent(&self) -> bool {
        self.urgent
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    pub fn priority(&self) -> PriorityClass {
        self.priority
    }

    pub fn set_priority(&mut self, priority: PriorityClass) {
        self.priority = priority;
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn set_arrival_time(&mut self, time: f64) {
        self.arrival_time = time;
    }

    pub fn stage_durations(&self) -> &[StageDuration] {
        &self.stage_durations
    }

    pub fn resource_waits(&self) -> &[ResourceWait] {
        &self.resource_waits
    }

    /// Record a completed stage. Stage names are unique within a case; the
    /// coordination process walks the scenario's stage list exactly once.
    pub fn record_stage(&mut self, stage: &str, duration: f64) {
        debug_assert!(
            self.stage_durations.iter().all(|s| s.stage != stage),
            "stage {} recorded twice",
            stage
        );
        self.stage_durations.push(StageDuration {
            stage: stage.to_string(),
            duration,
        });
    }

    /// Record time spent queued for a resource.
    pub fn record_wait(&mut self, resource: &str, stage: &str, wait: f64) {
        self.resource_waits.push(ResourceWait {
            resource: resource.to_string(),
            stage: stage.to_string(),
            wait,
        });
    }

    /// Sum of recorded stage durations.
    pub fn total_stage_time(&self) -> f64 {
        self.stage_durations.iter().map(|s| s.duration).sum()
    }

    /// Sum of recorded resource waits.
    pub fn total_wait_time(&self) -> f64 {
        self.resource_waits.iter().map(|w| w.wait).sum()
    }

    /// Freeze the case at completion time into an immutable record.
    pub fn finalize(self, completion_time: f64) -> CompletedCase {
        let total_latency = completion_time - self.arrival_time;
        CompletedCase {
            id: self.id,
            age: self.age,
            diagnosis: self.diagnosis,
            urgent: self.urgent,
            flags: self.flags,
            priority: self.priority,
            arrival_time: self.arrival_time,
            completion_time,
            stage_durations: self.stage_durations,
            resource_waits: self.resource_waits,
            total_latency,
        }
    }
}

/// A finalized case as it appears in the completed ledger.
///
/// All figures are exposed losslessly so downstream consumers (statistics,
/// visualization, export) can recompute any aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedCase {
    pub id: usize,
    pub age: u32,
    pub diagnosis: String,
    pub urgent: bool,
    pub flags: BTreeSet<String>,
    pub priority: PriorityClass,
    pub arrival_time: f64,
    pub completion_time: f64,
    /// Stage durations in execution order
    pub stage_durations: Vec<StageDuration>,
    /// Resource waits in the order they were incurred
    pub resource_waits: Vec<ResourceWait>,
    /// `completion_time - arrival_time`
    pub total_latency: f64,
}

impl CompletedCase {
    /// Duration recorded for a stage, if the stage ran.
    pub fn stage_duration(&self, stage: &str) -> Option<f64> {
        self.stage_durations
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.duration)
    }

    /// Sum of recorded stage durations.
    pub fn total_stage_time(&self) -> f64 {
        self.stage_durations.iter().map(|s| s.duration).sum()
    }

    /// Sum of recorded resource waits.
    pub fn total_wait_time(&self) -> f64 {
        self.resource_waits.iter().map(|w| w.wait).sum()
    }
}
