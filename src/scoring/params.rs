use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with an override outside a parameter's declared range.
///
/// Fixed per parameter so callers always get the same behavior for the same
/// knob: slider-style multipliers clamp, contract-style caps reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutOfRange {
    Clamp,
    #[default]
    Reject,
}

/// Declaration of one tunable rule parameter: its default and valid range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub out_of_range: OutOfRange,
}

/// Resolved parameter values for one scoring call.
///
/// Never mutated in place: overrides produce a new `Configuration` via
/// [`Configuration::with_overrides`], so "reset to defaults" is just keeping
/// the original around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown parameter `{name}`")]
    UnknownParam { name: String },
    #[error("parameter `{name}`: {value} is outside the valid range [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("parameter `{name}`: override must be a finite number")]
    NotFinite { name: String },
}

impl Configuration {
    /// Build the default configuration for a set of parameter specs.
    pub fn defaults(specs: &[ParamSpec]) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.name.clone(), spec.default))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Apply overrides, validating each against its declared range.
    ///
    /// Returns a new configuration; `self` is left untouched. Unknown names
    /// fail outright. Out-of-range values clamp or fail per each parameter's
    /// [`OutOfRange`] policy.
    pub fn with_overrides(
        &self,
        specs: &[ParamSpec],
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Configuration, ConfigError> {
        let mut next = self.clone();
        for (name, &value) in overrides {
            let spec = specs
                .iter()
                .find(|s| s.name == *name)
                .ok_or_else(|| ConfigError::UnknownParam { name: name.clone() })?;

            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name: name.clone() });
            }

            let value = if value < spec.min || value > spec.max {
                match spec.out_of_range {
                    OutOfRange::Clamp => value.clamp(spec.min, spec.max),
                    OutOfRange::Reject => {
                        return Err(ConfigError::OutOfRange {
                            name: name.clone(),
                            value,
                            min: spec.min,
                            max: spec.max,
                        })
                    }
                }
            } else {
                value
            };

            next.values.insert(name.clone(), value);
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ParamSpec> {
        vec![
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
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::defaults(&specs());
        assert_eq!(config.get("snowfall_multiplier"), Some(8.0));
        assert_eq!(config.get("snowfall_cap"), Some(50.0));
        assert_eq!(config.get("nope"), None);
    }

    #[test]
    fn test_override_in_range() {
        let base = Configuration::defaults(&specs());
        let overrides = BTreeMap::from([("snowfall_multiplier".to_string(), 10.0)]);
        let next = base.with_overrides(&specs(), &overrides).unwrap();
        assert_eq!(next.get("snowfall_multiplier"), Some(10.0));
        // base is untouched
        assert_eq!(base.get("snowfall_multiplier"), Some(8.0));
    }

    #[test]
    fn test_clamp_param_saturates() {
        let base = Configuration::defaults(&specs());
        let overrides = BTreeMap::from([("snowfall_multiplier".to_string(), 99.0)]);
        let next = base.with_overrides(&specs(), &overrides).unwrap();
        assert_eq!(next.get("snowfall_multiplier"), Some(20.0));
    }

    #[test]
    fn test_reject_param_fails() {
        let base = Configuration::defaults(&specs());
        let overrides = BTreeMap::from([("snowfall_cap".to_string(), 500.0)]);
        let err = base.with_overrides(&specs(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn test_unknown_param_fails() {
        let base = Configuration::defaults(&specs());
        let overrides = BTreeMap::from([("mystery".to_string(), 1.0)]);
        let err = base.with_overrides(&specs(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownParam { .. }));
    }

    #[test]
    fn test_nan_override_fails() {
        let base = Configuration::defaults(&specs());
        let overrides = BTreeMap::from([("snowfall_multiplier".to_string(), f64::NAN)]);
        let err = base.with_overrides(&specs(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::NotFinite { .. }));
    }
}
