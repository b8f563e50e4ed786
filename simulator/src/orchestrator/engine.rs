//! Scenario runner engine
//!
//! One full run for one policy variant:
//!
//! ```text
//! 1. Validate the scenario configuration (fail fast, before any
//!    virtual time advances)
//! 2. Build a fresh RNG context from the seed
//! 3. Generate the cohort (one RNG pass, case-id order)
//! 4. Build the resource pools
//! 5. Seed one arrival event per case, staggered by a fixed offset
//! 6. Pop events in (time, sequence) order, resuming case processes,
//!    until the queue drains or the safety bound trips
//! 7. Freeze the ledger in arrival order
//! ```
//!
//! For identical `(config, case_count, seed)` the returned ledger is
//! bit-identical across runs.
//!
//! # Example
//!
//! ```
//! use careflow_simulator_core_rs::orchestrator::run_scenario;
//! use careflow_simulator_core_rs::scenario::presets;
//!
//! let ledger = run_scenario(presets::legacy(), 10, 42).unwrap();
//! assert_eq!(ledger.len(), 10);
//! assert!(ledger.cases.iter().all(|c| c.total_latency > 0.0));
//! ```

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cohort::CohortGenerator;
use crate::kernel::{EventQueue, KernelError, ResourcePool};
use crate::models::{CompletedCase, CompletedLedger, EventLog};
use crate::process::{Action, CaseProcess};
use crate::rng::RngManager;
use crate::sampling::DistributionError;
use crate::scenario::{ScenarioConfig, StageDelay};
use crate::triage::TriageConfig;

/// Errors surfaced by scenario validation or the run loop.
///
/// All of these are synchronous and fatal; the engine never retries and
/// never returns a partial ledger.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// The scenario references resources, stages or probabilities
    /// inconsistently
    #[error("invalid scenario config: {0}")]
    InvalidScenarioConfig(String),

    /// A stage distribution's parameters are outside the family's domain
    #[error(transparent)]
    InvalidDistributionParameters(#[from] DistributionError),

    /// A kernel scheduling error (negative delay is a programming error)
    #[error(transparent)]
    InvalidDelay(#[from] KernelError),

    /// The safety event bound was exceeded, or the queue drained with
    /// cases still in flight; indicates a misconfigured scenario
    #[error("scheduler stalled after {events} events with {unfinished} unfinished cases")]
    SchedulerStalled { events: usize, unfinished: usize },
}

/// Drives one scenario run to completion.
#[derive(Debug)]
pub struct Orchestrator {
    config: ScenarioConfig,
    seed: u64,
    processes: Vec<CaseProcess>,
    pools: BTreeMap<String, ResourcePool>,
    queue: EventQueue,
    rng: RngManager,
    log: EventLog,
    completed: Vec<Option<CompletedCase>>,
    events_processed: usize,
}

impl Orchestrator {
    /// Validate the configuration and set up a run.
    ///
    /// Fails with a configuration error before any simulation time
    /// advances; after `new` returns, the run itself cannot fail except on
    /// the safety bound.
    pub fn new(
        config: ScenarioConfig,
        case_count: usize,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        validate_config(&config)?;

        let mut rng = RngManager::new(seed);
        let cohort = CohortGenerator::new(config.cohort.clone()).generate(case_count, &mut rng);

        let pools: BTreeMap<String, ResourcePool> = config
            .resources
            .iter()
            .map(|(name, capacity)| (name.clone(), ResourcePool::new(name.clone(), *capacity)))
            .collect();

        let mut queue = EventQueue::new();
        let processes: Vec<CaseProcess> = cohort
            .into_iter()
            .enumerate()
            .map(|(pid, case)| CaseProcess::new(pid, case))
            .collect();

        // One arrival per case, staggered to avoid simultaneous-time ties.
        for pid in 0..processes.len() {
            queue.schedule_after(pid as f64 * config.arrival_stagger, pid)?;
        }

        let completed = (0..processes.len()).map(|_| None).collect();

        Ok(Self {
            config,
            seed,
            processes,
            pools,
            queue,
            rng,
            log: EventLog::new(),
            completed,
            events_processed: 0,
        })
    }

    /// Number of scheduler events processed so far.
    pub fn events_processed(&self) -> usize {
        self.events_processed
    }

    /// Run the scheduler until every case completes.
    pub fn run(mut self) -> Result<CompletedLedger, SimulationError> {
        info!(
            scenario = %self.config.name,
            cases = self.processes.len(),
            seed = self.seed,
            "starting scenario run"
        );

        while let Some((_, pid)) = self.queue.pop_next() {
            self.events_processed += 1;
            if self.events_processed > self.config.max_events {
                warn!(
                    events = self.events_processed,
                    "safety event bound exceeded"
                );
                return Err(SimulationError::SchedulerStalled {
                    events: self.events_processed,
                    unfinished: self.completed.iter().filter(|c| c.is_none()).count(),
                });
            }

            let now = self.queue.now();
            let resumption = self.processes[pid].resume(
                now,
                &self.config.stages,
                &self.config.triage,
                &mut self.pools,
                &mut self.rng,
                &mut self.log,
            );

            match resumption.action {
                Action::Wait { delay } => self.queue.schedule_after(delay, pid)?,
                Action::Blocked => {}
                Action::Finished(done) => {
                    debug!(case_id = done.id, latency = done.total_latency, "case completed");
                    let id = done.id;
                    self.completed[id] = Some(done);
                }
            }

            // A release during this step handed a slot to a waiter; resume
            // it at the current instant.
            if let Some(waiter) = resumption.granted {
                self.queue.schedule_after(0.0, waiter)?;
            }
        }

        let unfinished = self.completed.iter().filter(|c| c.is_none()).count();
        if unfinished > 0 {
            return Err(SimulationError::SchedulerStalled {
                events: self.events_processed,
                unfinished,
            });
        }

        let ledger = CompletedLedger {
            scenario: self.config.name.clone(),
            seed: self.seed,
            cases: self.completed.into_iter().flatten().collect(),
            events: self.log,
        };

        info!(
            scenario = %self.config.name,
            completed = ledger.len(),
            events = self.events_processed,
            "scenario run complete"
        );
        Ok(ledger)
    }
}

/// Run one scenario end to end.
///
/// The single entry point downstream consumers need: builds a fresh RNG
/// context from `seed`, simulates `case_count` cases under `config`, and
/// returns the completed ledger in arrival order.
pub fn run_scenario(
    config: ScenarioConfig,
    case_count: usize,
    seed: u64,
) -> Result<CompletedLedger, SimulationError> {
    Orchestrator::new(config, case_count, seed)?.run()
}

/// Eager scenario validation; everything here is fatal and never retried.
fn validate_config(config: &ScenarioConfig) -> Result<(), SimulationError> {
    let invalid = |message: String| Err(SimulationError::InvalidScenarioConfig(message));

    if config.stages.is_empty() {
        return invalid("scenario must define at least one stage".to_string());
    }

    for (name, capacity) in &config.resources {
        if *capacity == 0 {
            return invalid(format!("resource {} has zero capacity", name));
        }
    }

    for (index, stage) in config.stages.iter().enumerate() {
        if stage.name.is_empty() {
            return invalid(format!("stage {} has an empty name", index));
        }
        if config.stages[..index].iter().any(|s| s.name == stage.name) {
            return invalid(format!("duplicate stage name {}", stage.name));
        }

        if let Some(resource) = &stage.resource {
            if !config.resources.contains_key(resource) {
                return invalid(format!(
                    "stage {} binds unknown resource {}",
                    stage.name, resource
                ));
            }
        }

        if !stage.multiplier.is_finite() || stage.multiplier <= 0.0 {
            return invalid(format!(
                "stage {} multiplier must be positive, got {}",
                stage.name, stage.multiplier
            ));
        }
        if let Some(flag_multiplier) = &stage.flag_multiplier {
            if flag_multiplier.flag.is_empty() {
                return invalid(format!("stage {} flag multiplier names no flag", stage.name));
            }
            if !flag_multiplier.multiplier.is_finite() || flag_multiplier.multiplier <= 0.0 {
                return invalid(format!(
                    "stage {} flag multiplier must be positive, got {}",
                    stage.name, flag_multiplier.multiplier
                ));
            }
        }

        if !stage.overlap_with_previous.is_finite() || stage.overlap_with_previous < 0.0 {
            return invalid(format!(
                "stage {} overlap must be non-negative, got {}",
                stage.name, stage.overlap_with_previous
            ));
        }
        if index == 0 && stage.overlap_with_previous != 0.0 {
            return invalid("first stage cannot overlap a previous stage".to_string());
        }

        match &stage.delay {
            StageDelay::Sampled(distribution) => distribution.validate()?,
            StageDelay::Confirmation(rule) => {
                if !(0.0..=1.0).contains(&rule.probability) {
                    return invalid(format!(
                        "stage {} no-show probability {} outside [0, 1]",
                        stage.name, rule.probability
                    ));
                }
                rule.reschedule.validate()?;
                if !rule.confirm_delay.is_finite() || rule.confirm_delay < 0.0 {
                    return invalid(format!(
                        "stage {} confirm delay must be non-negative, got {}",
                        stage.name, rule.confirm_delay
                    ));
                }
            }
        }
    }

    if let TriageConfig::SimulatedClassifier { accuracy, .. } = &config.triage {
        if !(0.0..=1.0).contains(accuracy) {
            return invalid(format!("classifier accuracy {} outside [0, 1]", accuracy));
        }
    }

    let (min_age, max_age) = config.cohort.age_range;
    if min_age >= max_age {
        return invalid(format!("empty age range [{}, {})", min_age, max_age));
    }
    if config.cohort.diagnoses.is_empty() {
        return invalid("cohort needs at least one diagnosis label".to_string());
    }
    if !(0.0..=1.0).contains(&config.cohort.urgent_probability) {
        return invalid(format!(
            "urgent probability {} outside [0, 1]",
            config.cohort.urgent_probability
        ));
    }
    for (flag, probability) in &config.cohort.flag_probabilities {
        if !(0.0..=1.0).contains(probability) {
            return invalid(format!(
                "flag {} probability {} outside [0, 1]",
                flag, probability
            ));
        }
    }

    if !config.arrival_stagger.is_finite() || config.arrival_stagger < 0.0 {
        return invalid(format!(
            "arrival stagger must be non-negative, got {}",
            config.arrival_stagger
        ));
    }
    if config.max_events == 0 {
        return invalid("max_events must be positive".to_string());
    }

    Ok(())
}
