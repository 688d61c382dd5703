use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::engine::ScoreError;
use super::input::InputRecord;
use super::params::Configuration;

/// Threshold predicate for tiered rules.
///
/// String form matches the policy-file syntax: `"<0"`, `"<=1.5"`, `">25"`,
/// `">=60"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Bound {
    Below(f64),
    AtMost(f64),
    Above(f64),
    AtLeast(f64),
}

impl Bound {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(val) = s.strip_prefix(">=") {
            Ok(Bound::AtLeast(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix("<=") {
            Ok(Bound::AtMost(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('>') {
            Ok(Bound::Above(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('<') {
            Ok(Bound::Below(val.trim().parse()?))
        } else {
            bail!("Bound must start with <, <=, > or >=: {}", s)
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        match self {
            Bound::Below(n) => value < *n,
            Bound::AtMost(n) => value <= *n,
            Bound::Above(n) => value > *n,
            Bound::AtLeast(n) => value >= *n,
        }
    }

    /// The threshold constant, for validation.
    pub fn threshold(&self) -> f64 {
        match self {
            Bound::Below(n) | Bound::AtMost(n) | Bound::Above(n) | Bound::AtLeast(n) => *n,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Below(n) => write!(f, "<{}", n),
            Bound::AtMost(n) => write!(f, "<={}", n),
            Bound::Above(n) => write!(f, ">{}", n),
            Bound::AtLeast(n) => write!(f, ">={}", n),
        }
    }
}

impl TryFrom<String> for Bound {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Bound::parse(&s).map_err(|e| e.to_string())
    }
}

impl From<Bound> for String {
    fn from(bound: Bound) -> Self {
        bound.to_string()
    }
}

/// One tier of a tiered rule: points awarded when the bound matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub when: Bound,
    pub points: f64,
}

/// A rule tunable: either an inline value or a reference to a named
/// configuration parameter (so "advanced mode" overrides can retune the
/// rule without rebuilding the policy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamRef {
    Value(f64),
    Param(String),
}

impl ParamRef {
    pub fn resolve(&self, factor: &str, config: &Configuration) -> Result<f64, ScoreError> {
        match self {
            ParamRef::Value(v) => Ok(*v),
            ParamRef::Param(name) => {
                config
                    .get(name)
                    .ok_or_else(|| ScoreError::UnknownParam {
                        factor: factor.to_string(),
                        param: name.clone(),
                    })
            }
        }
    }
}

/// How much a factor's contribution counts in weighted-average combination.
/// Ignored by sum-clamped policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    Fixed(f64),
    Field { field: String },
}

impl Default for Weight {
    fn default() -> Self {
        Weight::Fixed(1.0)
    }
}

/// The pure mapping from one input field to a contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RuleKind {
    /// value × multiplier, capped. Multiplier and cap may be parameters.
    Scaled {
        field: String,
        multiplier: ParamRef,
        cap: ParamRef,
    },
    /// Ordered tiers evaluated most-severe first; first match wins, and the
    /// required `otherwise` covers everything the tiers don't.
    Tiered {
        field: String,
        tiers: Vec<Tier>,
        otherwise: f64,
    },
    /// Categorical table, matched case-insensitively. Unknown categories take
    /// `default` instead of failing.
    Lookup {
        field: String,
        table: BTreeMap<String, f64>,
        #[serde(default)]
        default: f64,
    },
    /// Fixed points when a boolean field is set.
    Flag { field: String, points: f64 },
}

/// A named factor rule plus its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRule {
    pub name: String,
    pub rule: RuleKind,
    #[serde(default)]
    pub weight: Weight,
}

impl FactorRule {
    /// Apply the rule to an input, returning the contribution and a short
    /// human-readable note on how it was derived.
    ///
    /// Total over its domain: out-of-domain inputs are rejected with the
    /// offending field named, never silently coerced into NaN/Infinity.
    pub fn apply(
        &self,
        input: &InputRecord,
        config: &Configuration,
    ) -> Result<(f64, String), ScoreError> {
        let (contribution, detail) = match &self.rule {
            RuleKind::Scaled {
                field,
                multiplier,
                cap,
            } => {
                let value = input.number(field)?;
                let multiplier = multiplier.resolve(&self.name, config)?;
                let cap = cap.resolve(&self.name, config)?;
                let scaled = value * multiplier;
                if scaled > cap {
                    (cap, format!("{} × {}, capped at {}", value, multiplier, cap))
                } else {
                    (scaled, format!("{} × {}", value, multiplier))
                }
            }
            RuleKind::Tiered {
                field,
                tiers,
                otherwise,
            } => {
                let value = input.number(field)?;
                match tiers.iter().find(|t| t.when.matches(value)) {
                    Some(tier) => (tier.points, format!("{} matched {}", value, tier.when)),
                    None => (*otherwise, format!("{} matched no tier", value)),
                }
            }
            RuleKind::Lookup {
                field,
                table,
                default,
            } => match input.category(field)? {
                Some(category) => {
                    let hit = table
                        .iter()
                        .find(|(key, _)| key.eq_ignore_ascii_case(category));
                    match hit {
                        Some((key, points)) => (*points, format!("{} → {:+}", key, points)),
                        None => (*default, format!("unknown `{}` → default", category)),
                    }
                }
                None => (*default, "not set → default".to_string()),
            },
            RuleKind::Flag { field, points } => {
                if input.flag(field)? {
                    (*points, format!("set → {:+}", points))
                } else {
                    (0.0, "not set".to_string())
                }
            }
        };

        if contribution.is_finite() {
            Ok((contribution, detail))
        } else {
            Err(ScoreError::NonFiniteContribution {
                factor: self.name.clone(),
            })
        }
    }

    /// Resolve this factor's weight against the input. A field-sourced
    /// weight that reads negative names the offending field, so callers can
    /// show the message next to that input.
    pub fn weight_for(&self, input: &InputRecord) -> Result<f64, ScoreError> {
        match &self.weight {
            Weight::Fixed(w) => {
                if w.is_finite() && *w >= 0.0 {
                    Ok(*w)
                } else {
                    Err(ScoreError::InvalidWeight {
                        factor: self.name.clone(),
                        weight: *w,
                    })
                }
            }
            Weight::Field { field } => {
                let weight = input.number(field)?;
                if weight >= 0.0 {
                    Ok(weight)
                } else {
                    Err(ScoreError::InvalidInput {
                        field: field.clone(),
                        expected: "non-negative number",
                        found: format!("number `{}`", weight),
                    })
                }
            }
        }
    }
}
