use serde::{Deserialize, Serialize};

use super::classify::Band;
use super::params::{Configuration, ParamSpec};
use super::rules::FactorRule;

/// How per-factor contributions become a total.
///
/// The two modes are kept distinct on purpose: an odds-style policy clamps a
/// running sum into a fixed range, a grade-style policy normalizes by total
/// weight. Neither is a special case of the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Combine {
    /// total = clamp(Σ contributions, min, max). Weights are ignored.
    SumClamped { min: f64, max: f64 },
    /// total = clamp(Σ(cᵢ·wᵢ) / Σwᵢ, 0, max_scale). Zero total weight means
    /// "no data", reported as 0 with a flag rather than NaN.
    WeightedAverage { max_scale: f64 },
}

/// An ordered set of factor rules plus the combination method, tunable
/// parameters and classification bands.
///
/// Policies are plain data (YAML-serializable), so a new calculator is a new
/// policy file, not a new code path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub name: String,
    pub combine: Combine,
    pub rules: Vec<FactorRule>,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    pub bands: Vec<Band>,
}

impl ScoringPolicy {
    /// Default configuration built from this policy's parameter specs.
    pub fn default_config(&self) -> Configuration {
        Configuration::defaults(&self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::rules::{ParamRef, RuleKind};

    #[test]
    fn test_policy_yaml_roundtrip() {
        let yaml = r#"
name: demo
combine:
  mode: sum-clamped
  min: 0
  max: 100
rules:
  - name: snowfall
    rule:
      type: scaled
      field: snowfall
      multiplier: snowfall_multiplier
      cap: 50
  - name: temperature
    rule:
      type: tiered
      field: temperature
      tiers:
        - when: "<0"
          points: 15
        - when: "<2"
          points: 10
      otherwise: -10
params:
  - name: snowfall_multiplier
    default: 8
    min: 0
    max: 20
    out_of_range: clamp
bands:
  - threshold_low: 65
    label: likely
    message: Likely
  - threshold_low: 0
    label: unlikely
    message: Unlikely
"#;
        let policy: ScoringPolicy = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(policy.name, "demo");
        assert_eq!(policy.rules.len(), 2);
        assert!(matches!(
            policy.rules[0].rule,
            RuleKind::Scaled {
                multiplier: ParamRef::Param(_),
                ..
            }
        ));
        assert!(matches!(policy.combine, Combine::SumClamped { .. }));
        assert_eq!(policy.default_config().get("snowfall_multiplier"), Some(8.0));

        let back = serde_saphyr::to_string(&policy).unwrap();
        let reparsed: ScoringPolicy = serde_saphyr::from_str(&back).unwrap();
        assert_eq!(policy, reparsed);
    }

    #[test]
    fn test_weighted_average_mode_parse() {
        let yaml = r#"
name: gpa
combine:
  mode: weighted-average
  max_scale: 4.0
rules:
  - name: algebra
    rule:
      type: lookup
      field: algebra.grade
      table:
        A: 4.0
        B: 3.0
    weight:
      field: algebra.credits
bands:
  - threshold_low: 0
    label: fallback
    message: Fallback
"#;
        let policy: ScoringPolicy = serde_saphyr::from_str(yaml).unwrap();
        assert!(matches!(
            policy.combine,
            Combine::WeightedAverage { max_scale } if max_scale == 4.0
        ));
    }
}
