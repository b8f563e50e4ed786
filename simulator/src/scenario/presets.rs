//! Built-in policy scenarios
//!
//! The five care-coordination variants the simulator compares, expressed
//! purely as data. Every calibration constant here (distribution
//! parameters, automation multipliers, no-show rates, slot capacities) is
//! a modeling choice carried as configuration; the engine never special
//! cases a policy.
//!
//! Time unit is days throughout; hour-denominated literature values are
//! written as `hours / 24.0`.

use std::collections::BTreeMap;

use crate::cohort::CohortConfig;
use crate::models::PriorityClass;
use crate::sampling::DelayDistribution;
use crate::scenario::{
    NoShowRule, ScenarioConfig, StageConfig, DEFAULT_ARRIVAL_STAGGER, DEFAULT_MAX_EVENTS,
};
use crate::triage::{RuleCondition, TriageConfig, TriageRule, TriageRules};

/// Weekly imaging and specialist slot capacities shared by the staged
/// pipelines, for like-for-like comparison.
fn staged_resources() -> BTreeMap<String, usize> {
    let mut resources = BTreeMap::new();
    resources.insert("radiology".to_string(), 120);
    resources.insert("specialist".to_string(), 40);
    resources
}

fn cohort(diagnoses: &[&str]) -> CohortConfig {
    CohortConfig {
        age_range: (35, 85),
        diagnoses: diagnoses.iter().map(|d| d.to_string()).collect(),
        urgent_probability: 0.15,
        flag_probabilities: BTreeMap::new(),
    }
}

const STAGED_DIAGNOSES: [&str; 5] = [
    "diabetes type 2",
    "hypertension",
    "acute coronary syndrome",
    "cancer staging",
    "chronic kidney disease",
];

/// The seven-stage resourced pipeline all queue-based variants share.
/// Multipliers and the confirmation rule differ per policy.
fn staged_pipeline() -> Vec<StageConfig> {
    vec![
        StageConfig::new(
            "radiology_report",
            DelayDistribution::Uniform {
                min: 3.2 / 24.0,
                max: 4.8 / 24.0,
            },
        )
        .with_resource("radiology"),
        StageConfig::new(
            "pcp_acknowledgment",
            DelayDistribution::Exponential { rate: 0.125 },
        ),
        StageConfig::new(
            "referral_processing",
            DelayDistribution::Normal {
                mean: 10.5,
                sigma: 2.1,
            },
        ),
        StageConfig::new(
            "prior_authorization",
            DelayDistribution::Gamma {
                shape: 2.5,
                scale: 1.2,
            },
        ),
        StageConfig::new(
            "payer_review",
            DelayDistribution::Triangular {
                min: 1.0,
                mode: 2.0,
                max: 5.0,
            },
        ),
        StageConfig::new(
            "specialist_scheduling",
            DelayDistribution::Weibull {
                shape: 1.8,
                scale: 28.0,
            },
        )
        .with_resource("specialist"),
        StageConfig::confirmation(
            "patient_confirmation",
            NoShowRule {
                probability: 0.15,
                reschedule: DelayDistribution::Uniform { min: 0.5, max: 1.5 },
                confirm_delay: 0.5,
            },
        ),
    ]
}

fn apply_multipliers(mut stages: Vec<StageConfig>, multipliers: &[(&str, f64)]) -> Vec<StageConfig> {
    for (name, multiplier) in multipliers {
        if let Some(stage) = stages.iter_mut().find(|s| s.name == *name) {
            stage.multiplier = *multiplier;
        }
    }
    stages
}

/// Manual baseline: paper- and phone-based coordination.
///
/// Six human-driven stages with long-tailed lognormal delays; no shared
/// resource modeling and no meaningful triage. Delay moments follow the
/// published literature on healthcare operational delays.
pub fn legacy() -> ScenarioConfig {
    ScenarioConfig {
        name: "legacy".to_string(),
        stages: vec![
            StageConfig::new(
                "radiologist_report",
                DelayDistribution::Lognormal {
                    mean: 4.0 / 24.0,
                    sigma: 0.5 / 24.0,
                },
            ),
            StageConfig::new(
                "pcp_ack",
                DelayDistribution::Lognormal {
                    mean: 48.0 / 24.0,
                    sigma: 1.0 / 24.0,
                },
            ),
            StageConfig::new(
                "referral_gen",
                DelayDistribution::Lognormal {
                    mean: 72.0 / 24.0,
                    sigma: 0.8 / 24.0,
                },
            ),
            StageConfig::new(
                "prior_auth_prep",
                DelayDistribution::Lognormal {
                    mean: 96.0 / 24.0,
                    sigma: 0.5 / 24.0,
                },
            ),
            StageConfig::new(
                "payer_decision",
                DelayDistribution::Lognormal {
                    mean: 120.0 / 24.0,
                    sigma: 0.4 / 24.0,
                },
            ),
            StageConfig::new(
                "scheduling",
                DelayDistribution::Lognormal {
                    mean: 168.0 / 24.0,
                    sigma: 0.6 / 24.0,
                },
            ),
        ],
        resources: BTreeMap::new(),
        triage: TriageConfig::Rules(TriageRules {
            rules: Vec::new(),
            default: PriorityClass::Routine,
        }),
        cohort: cohort(&[
            "diabetes",
            "hypertension",
            "acute coronary syndrome",
            "cancer staging",
            "chronic kidney disease",
        ]),
        arrival_stagger: DEFAULT_ARRIVAL_STAGGER,
        max_events: DEFAULT_MAX_EVENTS,
    }
}

/// FIFO queue baseline: two-class keyword triage, no automation.
///
/// The staged pipeline at full manual delays; priority affects only the
/// order in which waiters get radiology and specialist slots.
pub fn fifo() -> ScenarioConfig {
    ScenarioConfig {
        name: "fifo".to_string(),
        stages: staged_pipeline(),
        resources: staged_resources(),
        triage: TriageConfig::Rules(TriageRules {
            rules: vec![TriageRule {
                when: RuleCondition::DiagnosisContainsAny(vec![
                    "cancer".to_string(),
                    "acute".to_string(),
                    "emergency".to_string(),
                    "critical".to_string(),
                ]),
                assign: PriorityClass::Urgent,
            }],
            default: PriorityClass::Routine,
        }),
        cohort: cohort(&[
            "diabetes",
            "hypertension",
            "acute coronary syndrome",
            "cancer staging",
            "chronic kidney disease",
        ]),
        arrival_stagger: DEFAULT_ARRIVAL_STAGGER,
        max_events: DEFAULT_MAX_EVENTS,
    }
}

/// Rule-based automation: keyword matching and fixed business rules.
///
/// Deterministic triage (age threshold, urgent keywords, chronic
/// conditions) and modest per-stage automation speedups; the external
/// payer review is untouched. Automated reminders lower the no-show rate
/// by a third and rescheduling is faster.
pub fn rule_based() -> ScenarioConfig {
    let mut stages = apply_multipliers(
        staged_pipeline(),
        &[
            ("radiology_report", 0.8),
            ("pcp_acknowledgment", 0.85),
            ("referral_processing", 0.75),
            ("prior_authorization", 0.8),
            ("specialist_scheduling", 0.85),
        ],
    );

    // Reminder system: fewer no-shows, quicker automated rescheduling.
    if let Some(stage) = stages.iter_mut().find(|s| s.name == "patient_confirmation") {
        *stage = StageConfig::confirmation(
            "patient_confirmation",
            NoShowRule {
                probability: 0.15 * 0.67,
                reschedule: DelayDistribution::Uniform { min: 0.5, max: 1.5 },
                confirm_delay: 0.25,
            },
        )
        .with_multiplier(0.7);
    }

    ScenarioConfig {
        name: "rule_based".to_string(),
        stages,
        resources: staged_resources(),
        triage: TriageConfig::Rules(TriageRules {
            rules: vec![
                TriageRule {
                    when: RuleCondition::AgeAtLeast(65),
                    assign: PriorityClass::High,
                },
                TriageRule {
                    when: RuleCondition::DiagnosisContainsAny(vec![
                        "cancer".to_string(),
                        "acute".to_string(),
                        "emergency".to_string(),
                        "critical".to_string(),
                        "urgent".to_string(),
                    ]),
                    assign: PriorityClass::Urgent,
                },
                TriageRule {
                    when: RuleCondition::DiagnosisContainsAny(vec![
                        "diabetes".to_string(),
                        "hypertension".to_string(),
                        "coronary".to_string(),
                    ]),
                    assign: PriorityClass::High,
                },
            ],
            default: PriorityClass::Routine,
        }),
        cohort: cohort(&STAGED_DIAGNOSES),
        arrival_stagger: DEFAULT_ARRIVAL_STAGGER,
        max_events: DEFAULT_MAX_EVENTS,
    }
}

/// Partial automation (hybrid): electronic records plus limited ML.
///
/// A simulated classifier at 85% accuracy, deeper automation multipliers,
/// an EHR-integration flag that speeds radiology for most of the cohort,
/// and a one-day overlap between referral completion and prior-auth
/// preparation. Reminders halve the no-show rate.
pub fn partial_automation() -> ScenarioConfig {
    let mut stages = apply_multipliers(
        staged_pipeline(),
        &[
            ("pcp_acknowledgment", 0.6),
            ("referral_processing", 0.65),
            ("prior_authorization", 0.7),
            ("payer_review", 0.9),
            ("specialist_scheduling", 0.75),
        ],
    );

    if let Some(stage) = stages.iter_mut().find(|s| s.name == "radiology_report") {
        stage.flag_multiplier = Some(crate::scenario::FlagMultiplier {
            flag: "ehr_integration".to_string(),
            multiplier: 0.7,
        });
    }
    if let Some(stage) = stages.iter_mut().find(|s| s.name == "prior_authorization") {
        stage.overlap_with_previous = 1.0;
    }
    if let Some(stage) = stages.iter_mut().find(|s| s.name == "patient_confirmation") {
        *stage = StageConfig::confirmation(
            "patient_confirmation",
            NoShowRule {
                probability: 0.15 * 0.5,
                reschedule: DelayDistribution::Uniform { min: 0.5, max: 1.5 },
                confirm_delay: 0.2,
            },
        )
        .with_multiplier(0.6);
    }

    let mut cohort = cohort(&STAGED_DIAGNOSES);
    cohort
        .flag_probabilities
        .insert("ehr_integration".to_string(), 0.85);

    ScenarioConfig {
        name: "partial_automation".to_string(),
        stages,
        resources: staged_resources(),
        triage: TriageConfig::SimulatedClassifier {
            rules: TriageRules {
                rules: vec![
                    TriageRule {
                        when: RuleCondition::AnyOf(vec![
                            RuleCondition::AgeAtLeast(70),
                            RuleCondition::DiagnosisContainsAny(vec!["acute".to_string()]),
                        ]),
                        assign: PriorityClass::High,
                    },
                    TriageRule {
                        when: RuleCondition::AnyOf(vec![
                            RuleCondition::AgeAtLeast(65),
                            RuleCondition::DiagnosisContainsAny(vec!["cancer".to_string()]),
                        ]),
                        assign: PriorityClass::Elevated,
                    },
                ],
                default: PriorityClass::Routine,
            },
            accuracy: 0.85,
        },
        cohort,
        arrival_stagger: DEFAULT_ARRIVAL_STAGGER,
        max_events: DEFAULT_MAX_EVENTS,
    }
}

/// Full orchestration: near-deterministic automated coordination.
///
/// Machine-speed stages (normal distributions with tiny sigmas) for the
/// automatable work; the radiologist interpretation and external payer
/// review remain human-paced.
pub fn orchestrator() -> ScenarioConfig {
    ScenarioConfig {
        name: "orchestrator".to_string(),
        stages: vec![
            StageConfig::new(
                "radiologist_report",
                DelayDistribution::Lognormal {
                    mean: 4.0 / 24.0,
                    sigma: 0.5 / 24.0,
                },
            ),
            StageConfig::new(
                "pcp_ack",
                DelayDistribution::Lognormal {
                    mean: 2.0 / 24.0,
                    sigma: 0.2 / 24.0,
                },
            ),
            StageConfig::new(
                "referral_gen",
                DelayDistribution::Normal {
                    mean: 0.05 / 24.0,
                    sigma: 0.01 / 24.0,
                },
            ),
            StageConfig::new(
                "prior_auth_prep",
                DelayDistribution::Normal {
                    mean: 0.1 / 24.0,
                    sigma: 0.01 / 24.0,
                },
            ),
            StageConfig::new(
                "payer_decision",
                DelayDistribution::Lognormal {
                    mean: 120.0 / 24.0,
                    sigma: 0.4 / 24.0,
                },
            ),
            StageConfig::new(
                "scheduling",
                DelayDistribution::Lognormal {
                    mean: 24.0 / 24.0,
                    sigma: 4.0 / 24.0,
                },
            ),
        ],
        resources: BTreeMap::new(),
        triage: TriageConfig::Rules(TriageRules {
            rules: Vec::new(),
            default: PriorityClass::Routine,
        }),
        cohort: cohort(&[
            "diabetes",
            "hypertension",
            "acute coronary syndrome",
            "cancer staging",
            "chronic kidney disease",
        ]),
        arrival_stagger: DEFAULT_ARRIVAL_STAGGER,
        max_events: DEFAULT_MAX_EVENTS,
    }
}

/// All five presets in comparison order.
pub fn all() -> Vec<ScenarioConfig> {
    vec![
        legacy(),
        fifo(),
        rule_based(),
        partial_automation(),
        orchestrator(),
    ]
}
