//! Triage classification
//!
//! Assigns each case a [`PriorityClass`] used only for resource-queue
//! ordering. Two variants share the same `classify` surface:
//!
//! - **Rules**: a fixed, ordered rule list evaluated first-match-wins
//!   against the case's attributes (keyword sets, age thresholds, flags).
//! - **Simulated classifier**: wraps a rule set with a stated accuracy.
//!   With probability `accuracy` it returns the rule-based class; otherwise
//!   a uniformly random class from the *remaining* classes, modeling real
//!   classifier error without implementing a model.
//!
//! Classification is a pure function of case attributes and RNG draws; no
//! state is retained between calls.

use serde::{Deserialize, Serialize};

use crate::models::{CaseRecord, PriorityClass};
use crate::rng::RngManager;

/// A predicate over case attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleCondition {
    /// Age at or above a threshold
    AgeAtLeast(u32),

    /// Diagnosis contains any of the keywords (case-insensitive substring)
    DiagnosisContainsAny(Vec<String>),

    /// The cohort generator set this flag on the case
    HasFlag(String),

    /// Any sub-condition holds
    AnyOf(Vec<RuleCondition>),
}

impl RuleCondition {
    fn matches(&self, case: &CaseRecord) -> bool {
        match self {
            RuleCondition::AgeAtLeast(threshold) => case.age() >= *threshold,
            RuleCondition::DiagnosisContainsAny(keywords) => {
                let diagnosis = case.diagnosis().to_lowercase();
                keywords
                    .iter()
                    .any(|keyword| diagnosis.contains(&keyword.to_lowercase()))
            }
            RuleCondition::HasFlag(flag) => case.has_flag(flag),
            RuleCondition::AnyOf(conditions) => {
                conditions.iter().any(|condition| condition.matches(case))
            }
        }
    }
}

/// One rule: when the condition matches, assign the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRule {
    pub when: RuleCondition,
    pub assign: PriorityClass,
}

/// An ordered rule list with first-match-wins semantics.
///
/// # Example
/// ```
/// use careflow_simulator_core_rs::triage::{RuleCondition, TriageRule, TriageRules};
/// use careflow_simulator_core_rs::models::{CaseRecord, PriorityClass};
///
/// let rules = TriageRules {
///     rules: vec![TriageRule {
///         when: RuleCondition::DiagnosisContainsAny(vec!["cancer".to_string()]),
///         assign: PriorityClass::Urgent,
///     }],
///     default: PriorityClass::Routine,
/// };
///
/// let case = CaseRecord::new(0, 55, "Cancer staging".to_string(), false, Default::default());
/// assert_eq!(rules.classify(&case), PriorityClass::Urgent);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRules {
    /// Rules in precedence order; the first match wins
    pub rules: Vec<TriageRule>,

    /// Class assigned when no rule matches
    pub default: PriorityClass,
}

impl TriageRules {
    /// Deterministic rule-based classification.
    pub fn classify(&self, case: &CaseRecord) -> PriorityClass {
        self.rules
            .iter()
            .find(|rule| rule.when.matches(case))
            .map(|rule| rule.assign)
            .unwrap_or(self.default)
    }
}

/// Triage variant configured on a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriageConfig {
    /// Deterministic keyword/threshold rules
    Rules(TriageRules),

    /// Rule output with simulated classification error
    SimulatedClassifier {
        rules: TriageRules,
        /// Probability of returning the rule-based class, in [0, 1]
        accuracy: f64,
    },
}

impl TriageConfig {
    /// Assign a priority class to the case.
    ///
    /// Always returns exactly one of the finite classes and never fails
    /// for well-formed input. The simulated variant consumes one RNG draw,
    /// plus one more on a miss.
    pub fn classify(&self, case: &CaseRecord, rng: &mut RngManager) -> PriorityClass {
        match self {
            TriageConfig::Rules(rules) => rules.classify(case),
            TriageConfig::SimulatedClassifier { rules, accuracy } => {
                let correct = rules.classify(case);
                if rng.chance(*accuracy) {
                    return correct;
                }

                // Misclassification: uniform over the remaining classes,
                // so accuracy 0.0 never reproduces the correct class.
                let others: Vec<PriorityClass> = PriorityClass::ALL
                    .iter()
                    .copied()
                    .filter(|class| *class != correct)
                    .collect();
                others[rng.index(others.len())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn rules() -> TriageRules {
        TriageRules {
            rules: vec![
                TriageRule {
                    when: RuleCondition::AgeAtLeast(65),
                    assign: PriorityClass::High,
                },
                TriageRule {
                    when: RuleCondition::DiagnosisContainsAny(vec![
                        "cancer".to_string(),
                        "acute".to_string(),
                    ]),
                    assign: PriorityClass::Urgent,
                },
            ],
            default: PriorityClass::Routine,
        }
    }

    fn case(age: u32, diagnosis: &str) -> CaseRecord {
        CaseRecord::new(0, age, diagnosis.to_string(), false, BTreeSet::new())
    }

    #[test]
    fn test_first_match_wins() {
        // Age rule precedes the keyword rule, so a 70-year-old cancer
        // patient classifies High, not Urgent.
        assert_eq!(rules().classify(&case(70, "cancer staging")), PriorityClass::High);
        assert_eq!(rules().classify(&case(50, "cancer staging")), PriorityClass::Urgent);
        assert_eq!(rules().classify(&case(50, "hypertension")), PriorityClass::Routine);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert_eq!(
            rules().classify(&case(40, "Acute Coronary Syndrome")),
            PriorityClass::Urgent
        );
    }

    #[test]
    fn test_perfect_accuracy_matches_rules() {
        let config = TriageConfig::SimulatedClassifier {
            rules: rules(),
            accuracy: 1.0,
        };
        let mut rng = RngManager::new(11);
        for age in [30, 50, 70, 90] {
            let c = case(age, "diabetes type 2");
            assert_eq!(config.classify(&c, &mut rng), rules().classify(&c));
        }
    }

    #[test]
    fn test_zero_accuracy_never_matches() {
        let config = TriageConfig::SimulatedClassifier {
            rules: rules(),
            accuracy: 0.0,
        };
        let mut rng = RngManager::new(12);
        for _ in 0..200 {
            let c = case(70, "cancer staging");
            assert_ne!(config.classify(&c, &mut rng), rules().classify(&c));
        }
    }
}
