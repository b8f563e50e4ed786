//! Case coordination process
//!
//! Drives one case through its scenario's stage sequence as an explicit
//! resumable state machine:
//!
//! ```text
//! Created → Staged(0) → Staged(1) → ... → Completed
//!              ↑ may pass through AwaitingResource(i) when the stage's
//!                pool is at capacity
//! ```
//!
//! The process never runs on its own: the orchestrator resumes it whenever
//! one of its scheduled events comes due (a stage timeout elapsed, or a
//! resource slot was handed over). Each resumption performs the state
//! transition synchronously, including all pool mutations, and returns
//! what the scheduler should do next.
//!
//! Stages cannot fail and there are no retry loops; rework (a no-show
//! needing rescheduling) is an explicit sampled delay.

use crate::kernel::{ProcessId, ResourcePool};
use crate::models::{CaseRecord, CompletedCase, EventLog, SimEvent};
use crate::rng::RngManager;
use crate::sampling::MIN_DURATION;
use crate::scenario::{StageConfig, StageDelay};
use crate::triage::TriageConfig;
use std::collections::BTreeMap;

/// What the scheduler should do with the process after a resumption.
#[derive(Debug)]
pub enum Action {
    /// Suspend for `delay` virtual time units (stage timeout)
    Wait { delay: f64 },

    /// Suspended in a resource wait queue; no event is scheduled, since a
    /// release will hand over the slot and resume the process
    Blocked,

    /// The case reached the end of its pipeline
    Finished(CompletedCase),
}

/// Result of one resumption step.
#[derive(Debug)]
pub struct Resumption {
    pub action: Action,

    /// A waiter granted a slot by a release performed during this step;
    /// the scheduler must resume it at the current virtual time
    pub granted: Option<ProcessId>,
}

#[derive(Debug, Clone, Copy)]
enum ProcessState {
    /// Not yet arrived; first resumption is the arrival event
    Created,

    /// Queued at a pool; `requested_at` marks when the wait began
    AwaitingResource { stage: usize, requested_at: f64 },

    /// Timing out the stage's delay; `holding` is set when the stage owns
    /// a resource slot that must be released on completion
    InStage {
        stage: usize,
        holding: bool,
        sampled: f64,
        recorded: f64,
    },

    Completed,
}

/// The per-case state machine.
#[derive(Debug)]
pub struct CaseProcess {
    pid: ProcessId,
    case: Option<CaseRecord>,
    state: ProcessState,
    /// Recorded duration of the most recently completed stage, used to cap
    /// the next stage's overlap credit
    last_stage_duration: f64,
}

impl CaseProcess {
    pub fn new(pid: ProcessId, case: CaseRecord) -> Self {
        Self {
            pid,
            case: Some(case),
            state: ProcessState::Created,
            last_stage_duration: 0.0,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, ProcessState::Completed)
    }

    /// Resume the process at virtual time `now`.
    ///
    /// Pool mutations happen synchronously inside this call, before any
    /// other process can observe them.
    pub fn resume(
        &mut self,
        now: f64,
        stages: &[StageConfig],
        triage: &TriageConfig,
        pools: &mut BTreeMap<String, ResourcePool>,
        rng: &mut RngManager,
        log: &mut EventLog,
    ) -> Resumption {
        match self.state {
            ProcessState::Created => {
                let case = self.case_mut();
                case.set_arrival_time(now);
                let case_id = case.id();
                log.push(SimEvent::Arrival { time: now, case_id });

                let priority = triage.classify(self.case_ref(), rng);
                self.case_mut().set_priority(priority);
                log.push(SimEvent::TriageAssigned {
                    time: now,
                    case_id,
                    priority,
                });

                self.start_stage(0, now, stages, pools, rng, log)
            }

            ProcessState::AwaitingResource { stage, requested_at } => {
                // A release handed us the slot; the pool already counts us
                // as a holder.
                let stage_config = &stages[stage];
                let resource = stage_config
                    .resource
                    .clone()
                    .expect("only resource-bound stages wait");
                let wait = now - requested_at;
                let case_id = self.case_ref().id();

                self.case_mut()
                    .record_wait(&resource, &stage_config.name, wait);
                log.push(SimEvent::ResourceGranted {
                    time: now,
                    case_id,
                    resource,
                    wait,
                });

                let action = self.begin_timeout(stage, now, stages, rng, log);
                Resumption {
                    action,
                    granted: None,
                }
            }

            ProcessState::InStage {
                stage,
                holding,
                sampled,
                recorded,
            } => {
                let stage_config = &stages[stage];
                let case_id = self.case_ref().id();

                self.case_mut().record_stage(&stage_config.name, recorded);
                self.last_stage_duration = recorded;
                log.push(SimEvent::StageCompleted {
                    time: now,
                    case_id,
                    stage: stage_config.name.clone(),
                    sampled,
                    recorded,
                });

                let granted = if holding {
                    let resource = stage_config
                        .resource
                        .as_deref()
                        .expect("holding implies a bound resource");
                    log.push(SimEvent::ResourceReleased {
                        time: now,
                        case_id,
                        resource: resource.to_string(),
                    });
                    pools
                        .get_mut(resource)
                        .expect("validated scenario binds only known resources")
                        .release()
                } else {
                    None
                };

                let mut resumption = self.start_stage(stage + 1, now, stages, pools, rng, log);
                debug_assert!(resumption.granted.is_none());
                resumption.granted = granted;
                resumption
            }

            ProcessState::Completed => {
                unreachable!("completed process resumed");
            }
        }
    }

    /// Enter stage `index`, acquiring its resource if one is bound, or
    /// finalize the case when the stage list is exhausted.
    fn start_stage(
        &mut self,
        index: usize,
        now: f64,
        stages: &[StageConfig],
        pools: &mut BTreeMap<String, ResourcePool>,
        rng: &mut RngManager,
        log: &mut EventLog,
    ) -> Resumption {
        if index >= stages.len() {
            let case = self.case.take().expect("case already finalized");
            let completed = case.finalize(now);
            log.push(SimEvent::CaseCompleted {
                time: now,
                case_id: completed.id,
                total_latency: completed.total_latency,
            });
            self.state = ProcessState::Completed;
            return Resumption {
                action: Action::Finished(completed),
                granted: None,
            };
        }

        let stage_config = &stages[index];
        if let Some(resource) = &stage_config.resource {
            let case_id = self.case_ref().id();
            let priority = self.case_ref().priority();
            log.push(SimEvent::ResourceRequested {
                time: now,
                case_id,
                resource: resource.clone(),
                priority,
            });

            let pool = pools
                .get_mut(resource)
                .expect("validated scenario binds only known resources");
            if pool.try_acquire(self.pid, priority) {
                log.push(SimEvent::ResourceGranted {
                    time: now,
                    case_id,
                    resource: resource.clone(),
                    wait: 0.0,
                });
            } else {
                self.state = ProcessState::AwaitingResource {
                    stage: index,
                    requested_at: now,
                };
                return Resumption {
                    action: Action::Blocked,
                    granted: None,
                };
            }
        }

        let action = self.begin_timeout(index, now, stages, rng, log);
        Resumption {
            action,
            granted: None,
        }
    }

    /// Sample the stage delay and suspend for it.
    fn begin_timeout(
        &mut self,
        index: usize,
        now: f64,
        stages: &[StageConfig],
        rng: &mut RngManager,
        log: &mut EventLog,
    ) -> Action {
        let stage_config = &stages[index];
        let case = self.case.as_ref().expect("case still in flight");

        let mut multiplier = stage_config.multiplier;
        if let Some(flag_multiplier) = &stage_config.flag_multiplier {
            if case.has_flag(&flag_multiplier.flag) {
                multiplier *= flag_multiplier.multiplier;
            }
        }

        let sampled = match &stage_config.delay {
            StageDelay::Sampled(distribution) => distribution.sample(rng) * multiplier,
            StageDelay::Confirmation(rule) => {
                if rng.chance(rule.probability) {
                    rule.reschedule.sample(rng) * multiplier
                } else {
                    // Fixed confirmation delay, not subject to speedups
                    rule.confirm_delay
                }
            }
        };
        let sampled = sampled.max(MIN_DURATION);

        // Bounded look-ahead: the stage may begin up to the configured
        // offset before the previous stage fully elapsed, capped by how
        // long that stage actually took. The recorded duration is the
        // stage's remaining latency contribution, which keeps
        // total latency == stage durations + waits exact.
        let credit = stage_config
            .overlap_with_previous
            .min(self.last_stage_duration);
        let recorded = (sampled - credit).max(0.0);

        log.push(SimEvent::StageStarted {
            time: now,
            case_id: case.id(),
            stage: stage_config.name.clone(),
        });

        self.state = ProcessState::InStage {
            stage: index,
            holding: stage_config.resource.is_some(),
            sampled,
            recorded,
        };
        Action::Wait { delay: recorded }
    }

    fn case_ref(&self) -> &CaseRecord {
        self.case.as_ref().expect("case still in flight")
    }

    fn case_mut(&mut self) -> &mut CaseRecord {
        self.case.as_mut().expect("case still in flight")
    }
}
