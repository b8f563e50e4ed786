//! Policy preset and triage behavior tests
//!
//! Runs the five built-in scenarios end to end and checks the
//! cross-policy properties: automation lowers latency, the simulated
//! classifier degrades exactly as configured, parameter reductions never
//! increase expected durations, and the overlap credit shows up in the
//! ledger without breaking the latency decomposition.

use std::collections::BTreeMap;

use careflow_simulator_core_rs::cohort::CohortConfig;
use careflow_simulator_core_rs::models::{CaseRecord, PriorityClass, SimEvent};
use careflow_simulator_core_rs::orchestrator::run_scenario;
use careflow_simulator_core_rs::sampling::DelayDistribution;
use careflow_simulator_core_rs::scenario::{presets, ScenarioConfig, StageConfig};
use careflow_simulator_core_rs::triage::{RuleCondition, TriageConfig, TriageRule, TriageRules};
use careflow_simulator_core_rs::RngManager;

#[test]
fn test_all_presets_run_to_completion() {
    for preset in presets::all() {
        let name = preset.name.clone();
        let ledger = run_scenario(preset, 100, 42).unwrap();
        assert_eq!(ledger.len(), 100, "{} lost cases", name);
        for case in &ledger.cases {
            let reconstructed = case.total_stage_time() + case.total_wait_time();
            assert!(
                (case.total_latency - reconstructed).abs() < 1e-6,
                "{}: decomposition broke for case {}",
                name,
                case.id
            );
        }
    }
}

#[test]
fn test_orchestration_beats_manual_baseline() {
    let legacy = run_scenario(presets::legacy(), 200, 42).unwrap();
    let orchestrated = run_scenario(presets::orchestrator(), 200, 42).unwrap();

    // ~21 days of manual coordination against ~7 days orchestrated; the
    // gap dwarfs sampling noise at this cohort size.
    assert!(
        orchestrated.mean_latency() < legacy.mean_latency(),
        "orchestrator {} not below legacy {}",
        orchestrated.mean_latency(),
        legacy.mean_latency()
    );
}

#[test]
fn test_partial_automation_overlap_credits_prior_auth() {
    let ledger = run_scenario(presets::partial_automation(), 150, 7).unwrap();

    let mut credited = 0usize;
    for event in ledger.events.events() {
        if let SimEvent::StageCompleted {
            stage, sampled, recorded, ..
        } = event
        {
            if stage == "prior_authorization" {
                assert!(recorded <= sampled);
                if recorded < sampled {
                    credited += 1;
                }
            } else {
                // No other stage in this preset overlaps.
                assert!(
                    (recorded - sampled).abs() < 1e-12,
                    "{} recorded {} != sampled {}",
                    stage,
                    recorded,
                    sampled
                );
            }
        }
    }
    assert!(credited > 0, "the one-day overlap never produced a credit");
}

#[test]
fn test_simulated_classifier_extremes() {
    fn classifier_config(accuracy: f64) -> ScenarioConfig {
        ScenarioConfig {
            name: "classifier_probe".to_string(),
            stages: vec![StageConfig::new(
                "intake",
                DelayDistribution::Normal { mean: 0.5, sigma: 0.05 },
            )],
            resources: BTreeMap::new(),
            triage: TriageConfig::SimulatedClassifier {
                rules: probe_rules(),
                accuracy,
            },
            cohort: CohortConfig {
                age_range: (35, 85),
                diagnoses: vec!["cancer staging".to_string(), "hypertension".to_string()],
                urgent_probability: 0.1,
                flag_probabilities: BTreeMap::new(),
            },
            arrival_stagger: 0.01,
            max_events: 100_000,
        }
    }

    fn probe_rules() -> TriageRules {
        TriageRules {
            rules: vec![
                TriageRule {
                    when: RuleCondition::AgeAtLeast(60),
                    assign: PriorityClass::High,
                },
                TriageRule {
                    when: RuleCondition::DiagnosisContainsAny(vec!["cancer".to_string()]),
                    assign: PriorityClass::Urgent,
                },
            ],
            default: PriorityClass::Routine,
        }
    }

    // accuracy 1.0: classification always equals the rule output.
    let perfect = run_scenario(classifier_config(1.0), 150, 9).unwrap();
    for case in &perfect.cases {
        let rebuilt = CaseRecord::new(
            case.id,
            case.age,
            case.diagnosis.clone(),
            case.urgent,
            case.flags.clone(),
        );
        assert_eq!(case.priority, probe_rules().classify(&rebuilt));
    }

    // accuracy 0.0: classification never equals the rule output.
    let broken = run_scenario(classifier_config(0.0), 150, 9).unwrap();
    for case in &broken.cases {
        let rebuilt = CaseRecord::new(
            case.id,
            case.age,
            case.diagnosis.clone(),
            case.urgent,
            case.flags.clone(),
        );
        assert_ne!(case.priority, probe_rules().classify(&rebuilt));
    }
}

#[test]
fn test_scale_reduction_never_increases_draws() {
    // Per-draw comparison under a shared seed for scale-parameterized
    // families: the reduced-parameter variant is pointwise no larger.
    let pairs = [
        (
            DelayDistribution::Normal { mean: 4.0, sigma: 0.5 },
            DelayDistribution::Normal { mean: 2.0, sigma: 0.5 },
        ),
        (
            DelayDistribution::Exponential { rate: 0.125 },
            DelayDistribution::Exponential { rate: 0.25 },
        ),
        (
            DelayDistribution::Gamma { shape: 2.5, scale: 1.2 },
            DelayDistribution::Gamma { shape: 2.5, scale: 0.6 },
        ),
        (
            DelayDistribution::Weibull { shape: 1.8, scale: 28.0 },
            DelayDistribution::Weibull { shape: 1.8, scale: 14.0 },
        ),
        (
            DelayDistribution::Uniform { min: 0.5, max: 4.0 },
            DelayDistribution::Uniform { min: 0.5, max: 2.0 },
        ),
    ];

    for (base, reduced) in &pairs {
        let mut rng_base = RngManager::new(4242);
        let mut rng_reduced = RngManager::new(4242);
        for _ in 0..2000 {
            let a = base.sample(&mut rng_base);
            let b = reduced.sample(&mut rng_reduced);
            assert!(b <= a + 1e-12, "{:?}: reduced draw {} above base {}", reduced, b, a);
        }
    }
}

#[test]
fn test_mean_reduction_lowers_expected_duration() {
    // Families whose draw shape changes with the mean are checked on the
    // sample mean instead of pointwise.
    let pairs = [
        (
            DelayDistribution::Lognormal { mean: 48.0, sigma: 1.0 },
            DelayDistribution::Lognormal { mean: 24.0, sigma: 1.0 },
        ),
        (
            DelayDistribution::Triangular { min: 1.0, mode: 2.0, max: 5.0 },
            DelayDistribution::Triangular { min: 1.0, mode: 2.0, max: 3.0 },
        ),
    ];

    for (base, reduced) in &pairs {
        let mut rng = RngManager::new(31337);
        let n = 20_000;
        let base_mean: f64 = (0..n).map(|_| base.sample(&mut rng)).sum::<f64>() / n as f64;
        let reduced_mean: f64 = (0..n).map(|_| reduced.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!(
            reduced_mean < base_mean,
            "{:?}: mean {} not below {}",
            reduced,
            reduced_mean,
            base_mean
        );
    }
}

#[test]
fn test_stage_mean_reduction_lowers_total_latency() {
    fn one_stage(mean: f64) -> ScenarioConfig {
        ScenarioConfig {
            name: "mean_probe".to_string(),
            stages: vec![StageConfig::new(
                "work",
                DelayDistribution::Normal { mean, sigma: 0.5 },
            )],
            resources: BTreeMap::new(),
            triage: TriageConfig::Rules(TriageRules {
                rules: Vec::new(),
                default: PriorityClass::Routine,
            }),
            cohort: CohortConfig {
                age_range: (35, 85),
                diagnoses: vec!["probe".to_string()],
                urgent_probability: 0.0,
                flag_probabilities: BTreeMap::new(),
            },
            arrival_stagger: 0.01,
            max_events: 100_000,
        }
    }

    let slow = run_scenario(one_stage(4.0), 300, 11).unwrap();
    let fast = run_scenario(one_stage(2.0), 300, 11).unwrap();
    assert!(fast.mean_latency() < slow.mean_latency());
}
