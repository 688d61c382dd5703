use serde::Serialize;

use super::classify::{classify, Classification};
use super::input::InputRecord;
use super::params::Configuration;
use super::policy::{Combine, ScoringPolicy};

/// Errors a scoring pass can signal. All carry the offending factor or field
/// name so callers can surface field-level messages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("field `{field}`: expected {expected}, got {found}")]
    InvalidInput {
        field: String,
        expected: &'static str,
        found: String,
    },
    #[error("field `{field}` is not a finite number")]
    NotFinite { field: String },
    #[error("factor `{factor}` produced a non-finite contribution")]
    NonFiniteContribution { factor: String },
    #[error("factor `{factor}` references unknown parameter `{param}`")]
    UnknownParam { factor: String, param: String },
    #[error("factor `{factor}`: weight must be finite and non-negative, got {weight}")]
    InvalidWeight { factor: String, weight: f64 },
    #[error("policy `{policy}` has no classification bands")]
    NoBands { policy: String },
}

/// One factor's share of the total, in policy order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub name: String,
    pub contribution: f64,
    pub weight: f64,
    /// How the contribution was derived, e.g. "5 × 8" or "-3 matched <0".
    pub detail: String,
}

/// The outcome of one scoring pass. Created fresh per call and never mutated;
/// re-score to get a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Combined total, clamped into the policy's declared range.
    pub total: f64,
    /// The pre-clamp combination. Breakdown contributions sum to this in
    /// sum-clamped mode; clamping never rewrites the breakdown.
    pub raw_total: f64,
    /// True when a weighted average had zero total weight. Distinguishes
    /// "no data entered" from "all factors scored zero".
    pub no_data: bool,
    pub tier: Classification,
    /// One entry per policy rule, in policy order.
    pub breakdown: Vec<FactorContribution>,
}

/// Score an input record against a policy. Strict: the first invalid input
/// fails the pass. Pure and stateless; identical arguments always produce an
/// identical result.
pub fn score(
    input: &InputRecord,
    policy: &ScoringPolicy,
    config: &Configuration,
) -> Result<ScoreResult, ScoreError> {
    let mut breakdown = Vec::with_capacity(policy.rules.len());
    for rule in &policy.rules {
        let (contribution, detail) = rule.apply(input, config)?;
        let weight = rule.weight_for(input)?;
        breakdown.push(FactorContribution {
            name: rule.name.clone(),
            contribution,
            weight,
            detail,
        });
    }
    combine(policy, breakdown)
}

/// Score with skip-and-flag recovery: factors whose input is invalid
/// contribute 0 with weight 0 and their errors are returned alongside the
/// result, so one bad field never aborts the whole pass. The breakdown still
/// carries one entry per rule.
pub fn score_partial(
    input: &InputRecord,
    policy: &ScoringPolicy,
    config: &Configuration,
) -> Result<(ScoreResult, Vec<ScoreError>), ScoreError> {
    let mut breakdown = Vec::with_capacity(policy.rules.len());
    let mut skipped = Vec::new();

    for rule in &policy.rules {
        let applied = rule.apply(input, config).and_then(|(contribution, detail)| {
            rule.weight_for(input)
                .map(|weight| (contribution, weight, detail))
        });
        match applied {
            Ok((contribution, weight, detail)) => breakdown.push(FactorContribution {
                name: rule.name.clone(),
                contribution,
                weight,
                detail,
            }),
            Err(err) => {
                breakdown.push(FactorContribution {
                    name: rule.name.clone(),
                    contribution: 0.0,
                    weight: 0.0,
                    detail: "skipped (invalid input)".to_string(),
                });
                skipped.push(err);
            }
        }
    }

    combine(policy, breakdown).map(|result| (result, skipped))
}

fn combine(
    policy: &ScoringPolicy,
    breakdown: Vec<FactorContribution>,
) -> Result<ScoreResult, ScoreError> {
    let (raw_total, total, no_data) = match policy.combine {
        Combine::SumClamped { min, max } => {
            let raw: f64 = breakdown.iter().map(|f| f.contribution).sum();
            (raw, raw.clamp(min, max), false)
        }
        Combine::WeightedAverage { max_scale } => {
            let weight_sum: f64 = breakdown.iter().map(|f| f.weight).sum();
            if weight_sum == 0.0 {
                // Defined as 0 with a flag, never NaN.
                (0.0, 0.0, true)
            } else {
                let weighted: f64 = breakdown.iter().map(|f| f.contribution * f.weight).sum();
                let raw = weighted / weight_sum;
                (raw, raw.clamp(0.0, max_scale), false)
            }
        }
    };

    let tier = classify(total, &policy.bands).ok_or_else(|| ScoreError::NoBands {
        policy: policy.name.clone(),
    })?;

    Ok(ScoreResult {
        total,
        raw_total,
        no_data,
        tier,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classify::Band;
    use crate::scoring::rules::{Bound, FactorRule, ParamRef, RuleKind, Tier, Weight};
    use std::collections::BTreeMap;

    fn band(threshold: f64, label: &str) -> Band {
        Band {
            threshold_low: threshold,
            label: label.to_string(),
            message: label.to_string(),
        }
    }

    fn sum_policy() -> ScoringPolicy {
        let mut school_table = BTreeMap::new();
        school_table.insert("public".to_string(), 5.0);
        school_table.insert("private".to_string(), 0.0);
        let mut district_table = BTreeMap::new();
        district_table.insert("cautious".to_string(), 10.0);
        district_table.insert("standard".to_string(), 0.0);
        district_table.insert("aggressive".to_string(), -10.0);

        ScoringPolicy {
            name: "snow-day".to_string(),
            combine: Combine::SumClamped {
                min: 0.0,
                max: 100.0,
            },
            rules: vec![
                FactorRule {
                    name: "snowfall".to_string(),
                    rule: RuleKind::Scaled {
                        field: "snowfall".to_string(),
                        multiplier: ParamRef::Value(8.0),
                        cap: ParamRef::Value(50.0),
                    },
                    weight: Weight::default(),
                },
                FactorRule {
                    name: "temperature".to_string(),
                    rule: RuleKind::Tiered {
                        field: "temperature".to_string(),
                        tiers: vec![
                            Tier {
                                when: Bound::Below(0.0),
                                points: 15.0,
                            },
                            Tier {
                                when: Bound::Below(2.0),
                                points: 10.0,
                            },
                            Tier {
                                when: Bound::Below(5.0),
                                points: 5.0,
                            },
                        ],
                        otherwise: -10.0,
                    },
                    weight: Weight::default(),
                },
                FactorRule {
                    name: "wind".to_string(),
                    rule: RuleKind::Tiered {
                        field: "wind".to_string(),
                        tiers: vec![
                            Tier {
                                when: Bound::Above(60.0),
                                points: 15.0,
                            },
                            Tier {
                                when: Bound::Above(40.0),
                                points: 10.0,
                            },
                            Tier {
                                when: Bound::Above(25.0),
                                points: 5.0,
                            },
                        ],
                        otherwise: 0.0,
                    },
                    weight: Weight::default(),
                },
                FactorRule {
                    name: "school".to_string(),
                    rule: RuleKind::Lookup {
                        field: "school".to_string(),
                        table: school_table,
                        default: 0.0,
                    },
                    weight: Weight::default(),
                },
                FactorRule {
                    name: "district".to_string(),
                    rule: RuleKind::Lookup {
                        field: "district".to_string(),
                        table: district_table,
                        default: 0.0,
                    },
                    weight: Weight::default(),
                },
            ],
            params: vec![],
            bands: vec![
                band(85.0, "very-likely"),
                band(65.0, "likely"),
                band(0.0, "unlikely"),
            ],
        }
    }

    fn grade_rule(name: &str, grade_field: &str, credits_field: &str) -> FactorRule {
        let mut table = BTreeMap::new();
        table.insert("A".to_string(), 4.0);
        table.insert("B+".to_string(), 3.3);
        table.insert("B".to_string(), 3.0);
        FactorRule {
            name: name.to_string(),
            rule: RuleKind::Lookup {
                field: grade_field.to_string(),
                table,
                default: 0.0,
            },
            weight: Weight::Field {
                field: credits_field.to_string(),
            },
        }
    }

    fn gpa_policy(courses: &[&str]) -> ScoringPolicy {
        ScoringPolicy {
            name: "gpa".to_string(),
            combine: Combine::WeightedAverage { max_scale: 4.0 },
            rules: courses
                .iter()
                .map(|name| {
                    grade_rule(
                        name,
                        &format!("{}.grade", name),
                        &format!("{}.credits", name),
                    )
                })
                .collect(),
            params: vec![],
            bands: vec![band(3.5, "honors"), band(0.0, "enrolled")],
        }
    }

    #[test]
    fn test_snow_day_scenario() {
        // snowfall=5 (×8 capped 50 → 40), temp=-3 (→15), wind=30 (→5),
        // public (+5), standard (+0) = 65, unchanged by the clamp.
        let input = InputRecord::new()
            .with("snowfall", 5.0)
            .with("temperature", -3.0)
            .with("wind", 30.0)
            .with("school", "Public")
            .with("district", "Standard");

        let result = score(&input, &sum_policy(), &Configuration::default()).unwrap();
        assert_eq!(result.total, 65.0);
        assert_eq!(result.raw_total, 65.0);
        assert!(!result.no_data);
        assert_eq!(result.tier.label, "likely");

        let by_name: BTreeMap<&str, f64> = result
            .breakdown
            .iter()
            .map(|f| (f.name.as_str(), f.contribution))
            .collect();
        assert_eq!(by_name["snowfall"], 40.0);
        assert_eq!(by_name["temperature"], 15.0);
        assert_eq!(by_name["wind"], 5.0);
        assert_eq!(by_name["school"], 5.0);
        assert_eq!(by_name["district"], 0.0);
    }

    #[test]
    fn test_breakdown_names_match_policy_order() {
        let policy = sum_policy();
        let result = score(&InputRecord::new(), &policy, &Configuration::default()).unwrap();
        let names: Vec<&str> = result.breakdown.iter().map(|f| f.name.as_str()).collect();
        let expected: Vec<&str> = policy.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_contributions_sum_to_raw_total() {
        let input = InputRecord::new()
            .with("snowfall", 20.0)
            .with("temperature", -10.0)
            .with("wind", 70.0)
            .with("school", "public")
            .with("district", "cautious");

        let result = score(&input, &sum_policy(), &Configuration::default()).unwrap();
        let sum: f64 = result.breakdown.iter().map(|f| f.contribution).sum();
        assert_eq!(sum, result.raw_total);
        // 50 + 15 + 15 + 5 + 10 = 95, within range
        assert_eq!(result.total, 95.0);
    }

    #[test]
    fn test_clamp_affects_total_not_breakdown() {
        // Everything maxed out: raw goes past 100, total clamps to 100.
        let input = InputRecord::new()
            .with("snowfall", 100.0)
            .with("temperature", -20.0)
            .with("wind", 90.0)
            .with("school", "public")
            .with("district", "cautious");

        let result = score(&input, &sum_policy(), &Configuration::default()).unwrap();
        assert_eq!(result.total, 100.0);
        assert!(result.raw_total > 100.0);
        let sum: f64 = result.breakdown.iter().map(|f| f.contribution).sum();
        assert_eq!(sum, result.raw_total);
    }

    #[test]
    fn test_missing_numeric_fields_read_as_zero() {
        // Nothing entered: snowfall 0, temp 0 (<2 → 10), wind 0 (→ 0),
        // school/district unset (→ 0). Total 10.
        let result = score(
            &InputRecord::new(),
            &sum_policy(),
            &Configuration::default(),
        )
        .unwrap();
        assert_eq!(result.total, 10.0);
        assert!(!result.no_data);
    }

    #[test]
    fn test_gpa_weighted_average() {
        // A(4.0), A(4.0), B+(3.3), B(3.0), one credit each → 3.575.
        let policy = gpa_policy(&["one", "two", "three", "four"]);
        let input = InputRecord::new()
            .with("one.grade", "A")
            .with("one.credits", 1.0)
            .with("two.grade", "A")
            .with("two.credits", 1.0)
            .with("three.grade", "B+")
            .with("three.credits", 1.0)
            .with("four.grade", "B")
            .with("four.credits", 1.0);

        let result = score(&input, &policy, &Configuration::default()).unwrap();
        assert!((result.total - 3.575).abs() < 1e-12);
        assert!(!result.no_data);
        assert_eq!(result.tier.label, "honors");
    }

    #[test]
    fn test_gpa_credits_weight_courses() {
        // A × 3 credits, B × 1 credit → (4.0·3 + 3.0·1) / 4 = 3.75.
        let policy = gpa_policy(&["one", "two"]);
        let input = InputRecord::new()
            .with("one.grade", "A")
            .with("one.credits", 3.0)
            .with("two.grade", "B")
            .with("two.credits", 1.0);

        let result = score(&input, &policy, &Configuration::default()).unwrap();
        assert!((result.total - 3.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_total_weight_flags_no_data() {
        // Credits never entered → every weight reads 0 → no data, not NaN.
        let policy = gpa_policy(&["one", "two"]);
        let input = InputRecord::new()
            .with("one.grade", "A")
            .with("two.grade", "B");

        let result = score(&input, &policy, &Configuration::default()).unwrap();
        assert_eq!(result.total, 0.0);
        assert!(result.no_data);
        assert!(result.total.is_finite());
    }

    #[test]
    fn test_weighted_average_clamps_to_scale() {
        let mut policy = gpa_policy(&["one"]);
        policy.combine = Combine::WeightedAverage { max_scale: 3.0 };
        let input = InputRecord::new()
            .with("one.grade", "A")
            .with("one.credits", 2.0);

        let result = score(&input, &policy, &Configuration::default()).unwrap();
        assert_eq!(result.total, 3.0);
        assert_eq!(result.raw_total, 4.0);
    }

    #[test]
    fn test_strict_score_fails_on_bad_input() {
        let input = InputRecord::new().with("snowfall", "lots");
        let err = score(&input, &sum_policy(), &Configuration::default()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidInput { .. }));
        assert!(err.to_string().contains("snowfall"));
    }

    #[test]
    fn test_partial_score_skips_and_flags() {
        // Negative credits invalidate one course; the pass continues with
        // that course excluded (weight 0) instead of aborting.
        let policy = gpa_policy(&["one", "two"]);
        let input = InputRecord::new()
            .with("one.grade", "A")
            .with("one.credits", 3.0)
            .with("two.grade", "B")
            .with("two.credits", -1.0);

        let (result, skipped) =
            score_partial(&input, &policy, &Configuration::default()).unwrap();
        assert_eq!(skipped.len(), 1);
        assert!(matches!(skipped[0], ScoreError::InvalidInput { .. }));
        assert!(skipped[0].to_string().contains("two.credits"));
        assert!((result.total - 4.0).abs() < 1e-12);
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown[1].weight, 0.0);
    }

    #[test]
    fn test_determinism() {
        let input = InputRecord::new()
            .with("snowfall", 7.3)
            .with("temperature", 1.2)
            .with("wind", 41.0)
            .with("school", "public")
            .with("district", "aggressive");
        let policy = sum_policy();
        let config = Configuration::default();

        let first = score(&input, &policy, &config).unwrap();
        let second = score(&input, &policy, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_bands_is_an_error() {
        let mut policy = sum_policy();
        policy.bands.clear();
        let err = score(&InputRecord::new(), &policy, &Configuration::default()).unwrap_err();
        assert!(matches!(err, ScoreError::NoBands { .. }));
    }
}
