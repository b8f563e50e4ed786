//! Event logging for replay verification and auditing.
//!
//! Every significant state change during a run is appended to the
//! [`EventLog`] in execution order. The log enables:
//! - Replay verification (the capacity invariant can be checked by
//!   replaying grants and releases)
//! - Debugging (understand what happened and when)
//! - Analysis (per-stage figures beyond the per-case records)
//!
//! Events carry virtual times, not wall-clock times.

use serde::Serialize;

use crate::models::case::PriorityClass;

/// Simulation event capturing a state change.
///
/// All events include the virtual time at which they occurred. Within a
/// single virtual instant, log order is execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    /// Case entered the pipeline
    Arrival { time: f64, case_id: usize },

    /// Triage assigned a priority class
    TriageAssigned {
        time: f64,
        case_id: usize,
        priority: PriorityClass,
    },

    /// Case asked a pool for a slot
    ResourceRequested {
        time: f64,
        case_id: usize,
        resource: String,
        priority: PriorityClass,
    },

    /// Pool granted a slot; `wait` is zero for immediate grants
    ResourceGranted {
        time: f64,
        case_id: usize,
        resource: String,
        wait: f64,
    },

    /// Case released its slot
    ResourceReleased {
        time: f64,
        case_id: usize,
        resource: String,
    },

    /// Stage began timing out
    StageStarted {
        time: f64,
        case_id: usize,
        stage: String,
    },

    /// Stage finished; `sampled` is the raw draw, `recorded` the latency
    /// contribution after multipliers and any overlap credit
    StageCompleted {
        time: f64,
        case_id: usize,
        stage: String,
        sampled: f64,
        recorded: f64,
    },

    /// Case reached the end of the pipeline
    CaseCompleted {
        time: f64,
        case_id: usize,
        total_latency: f64,
    },
}

impl SimEvent {
    /// Virtual time of the event
    pub fn time(&self) -> f64 {
        match *self {
            SimEvent::Arrival { time, .. }
            | SimEvent::TriageAssigned { time, .. }
            | SimEvent::ResourceRequested { time, .. }
            | SimEvent::ResourceGranted { time, .. }
            | SimEvent::ResourceReleased { time, .. }
            | SimEvent::StageStarted { time, .. }
            | SimEvent::StageCompleted { time, .. }
            | SimEvent::CaseCompleted { time, .. } => time,
        }
    }

    /// Case the event belongs to
    pub fn case_id(&self) -> usize {
        match *self {
            SimEvent::Arrival { case_id, .. }
            | SimEvent::TriageAssigned { case_id, .. }
            | SimEvent::ResourceRequested { case_id, .. }
            | SimEvent::ResourceGranted { case_id, .. }
            | SimEvent::ResourceReleased { case_id, .. }
            | SimEvent::StageStarted { case_id, .. }
            | SimEvent::StageCompleted { case_id, .. }
            | SimEvent::CaseCompleted { case_id, .. } => case_id,
        }
    }
}

/// Append-only log of simulation events.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Replay grants and releases for one resource and return the peak
    /// number of simultaneously held slots.
    ///
    /// Used to verify the capacity invariant after a run.
    pub fn max_concurrent_held(&self, resource: &str) -> usize {
        let mut held: usize = 0;
        let mut peak: usize = 0;
        for event in &self.events {
            match event {
                SimEvent::ResourceGranted { resource: r, .. } if r == resource => {
                    held += 1;
                    peak = peak.max(held);
                }
                SimEvent::ResourceReleased { resource: r, .. } if r == resource => {
                    held = held.saturating_sub(1);
                }
                _ => {}
            }
        }
        peak
    }
}
