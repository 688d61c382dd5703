use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring::{
    Band, Bound, Combine, FactorRule, InputRecord, OutOfRange, ParamRef, ParamSpec, RuleKind,
    ScoringPolicy, Tier, Weight,
};

/// Weather and district conditions feeding the snow-day policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Expected snowfall over the next 24h, in cm.
    pub snowfall_cm: f64,
    /// Expected low temperature, in °C.
    pub temperature_c: f64,
    /// Precipitation probability, 0-100.
    pub precipitation_pct: f64,
    /// Peak wind speed, in km/h.
    pub wind_kmh: f64,
    /// School type: public, private, boarding.
    pub school: String,
    /// District closure posture: cautious, standard, aggressive.
    pub district: String,
}

impl Conditions {
    pub fn to_input(&self) -> InputRecord {
        InputRecord::new()
            .with("snowfall", self.snowfall_cm)
            .with("temperature", self.temperature_c)
            .with("precipitation", self.precipitation_pct)
            .with("wind", self.wind_kmh)
            .with("school", self.school.as_str())
            .with("district", self.district.as_str())
    }
}

/// The built-in snow-day closure policy: additive contributions clamped into
/// [0, 100].
///
/// Tunable parameters (override via `overrides.snow-day` in the config file):
/// - `snowfall_multiplier` — points per cm of snowfall. Clamps into [0, 20]:
///   a slider-style knob, saturating beats erroring.
/// - `snowfall_cap` — ceiling on the snowfall contribution. Rejects outside
///   [0, 100]: moving the cap past the score range changes the contract.
/// - `precipitation_multiplier` — points per % precipitation probability.
///   Clamps into [0, 1].
/// - `precipitation_cap` — ceiling on the precipitation contribution.
///   Rejects outside [0, 50].
pub fn policy() -> ScoringPolicy {
    let mut school_table = BTreeMap::new();
    school_table.insert("public".to_string(), 5.0);
    school_table.insert("private".to_string(), 0.0);
    school_table.insert("boarding".to_string(), -5.0);

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
                    multiplier: ParamRef::Param("snowfall_multiplier".to_string()),
                    cap: ParamRef::Param("snowfall_cap".to_string()),
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
                name: "precipitation".to_string(),
                rule: RuleKind::Scaled {
                    field: "precipitation".to_string(),
                    multiplier: ParamRef::Param("precipitation_multiplier".to_string()),
                    cap: ParamRef::Param("precipitation_cap".to_string()),
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
        params: vec![
            ParamSpec {
                name: "snowfall_multiplier".to_string(),
                default: 8.0,
                min: 0.0,
                max: 20.0,
                out_of_range: OutOfRange::Clamp,
            },
            ParamSpec {
                name: "snowfall_cap".to_string(),
                default: 50.0,
                min: 0.0,
                max: 100.0,
                out_of_range: OutOfRange::Reject,
            },
            ParamSpec {
                name: "precipitation_multiplier".to_string(),
                default: 0.15,
                min: 0.0,
                max: 1.0,
                out_of_range: OutOfRange::Clamp,
            },
            ParamSpec {
                name: "precipitation_cap".to_string(),
                default: 15.0,
                min: 0.0,
                max: 50.0,
                out_of_range: OutOfRange::Reject,
            },
        ],
        bands: vec![
            Band {
                threshold_low: 85.0,
                label: "very-likely".to_string(),
                message: "Very likely. Set a late alarm, check the district site at dawn.".to_string(),
            },
            Band {
                threshold_low: 65.0,
                label: "likely".to_string(),
                message: "Likely. Prep for a day off, but keep the backpack packed.".to_string(),
            },
            Band {
                threshold_low: 40.0,
                label: "possible".to_string(),
                message: "Possible. Could go either way; watch the evening forecast.".to_string(),
            },
            Band {
                threshold_low: 20.0,
                label: "unlikely".to_string(),
                message: "Unlikely. Expect a normal school day.".to_string(),
            },
            Band {
                threshold_low: 0.0,
                label: "very-unlikely".to_string(),
                message: "Very unlikely. School is on.".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{score, validate_policy};

    #[test]
    fn test_policy_validates() {
        assert!(validate_policy(&policy()).is_ok());
    }

    #[test]
    fn test_reference_conditions_score_65() {
        let conditions = Conditions {
            snowfall_cm: 5.0,
            temperature_c: -3.0,
            precipitation_pct: 0.0,
            wind_kmh: 30.0,
            school: "Public".to_string(),
            district: "Standard".to_string(),
        };
        let policy = policy();
        let result = score(&conditions.to_input(), &policy, &policy.default_config()).unwrap();
        assert_eq!(result.total, 65.0);
        assert_eq!(result.tier.label, "likely");
    }

    #[test]
    fn test_blizzard_clamps_to_100() {
        let conditions = Conditions {
            snowfall_cm: 40.0,
            temperature_c: -15.0,
            precipitation_pct: 100.0,
            wind_kmh: 80.0,
            school: "public".to_string(),
            district: "cautious".to_string(),
        };
        let policy = policy();
        let result = score(&conditions.to_input(), &policy, &policy.default_config()).unwrap();
        assert_eq!(result.total, 100.0);
        assert!(result.raw_total > 100.0);
        assert_eq!(result.tier.label, "very-likely");
    }

    #[test]
    fn test_warm_day_clamps_to_zero() {
        let conditions = Conditions {
            snowfall_cm: 0.0,
            temperature_c: 18.0,
            precipitation_pct: 0.0,
            wind_kmh: 5.0,
            school: "boarding".to_string(),
            district: "aggressive".to_string(),
        };
        let policy = policy();
        let result = score(&conditions.to_input(), &policy, &policy.default_config()).unwrap();
        assert_eq!(result.total, 0.0);
        assert_eq!(result.raw_total, -25.0);
        assert_eq!(result.tier.label, "very-unlikely");
    }

    #[test]
    fn test_unknown_school_type_is_neutral() {
        let conditions = Conditions {
            snowfall_cm: 5.0,
            temperature_c: -3.0,
            precipitation_pct: 0.0,
            wind_kmh: 30.0,
            school: "homeschool".to_string(),
            district: "standard".to_string(),
        };
        let policy = policy();
        let result = score(&conditions.to_input(), &policy, &policy.default_config()).unwrap();
        // Same as the reference scenario minus the +5 school contribution
        assert_eq!(result.total, 60.0);
    }
}
