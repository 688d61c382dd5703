use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::engine::ScoreError;

/// A single typed input value for one factor field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorValue {
    Flag(bool),
    Number(f64),
    Category(String),
}

impl FactorValue {
    /// Short description of the value for error messages.
    pub fn describe(&self) -> String {
        match self {
            FactorValue::Flag(b) => format!("flag `{}`", b),
            FactorValue::Number(n) => format!("number `{}`", n),
            FactorValue::Category(s) => format!("category `{}`", s),
        }
    }
}

impl From<f64> for FactorValue {
    fn from(value: f64) -> Self {
        FactorValue::Number(value)
    }
}

impl From<bool> for FactorValue {
    fn from(value: bool) -> Self {
        FactorValue::Flag(value)
    }
}

impl From<&str> for FactorValue {
    fn from(value: &str) -> Self {
        FactorValue::Category(value.to_string())
    }
}

impl From<String> for FactorValue {
    fn from(value: String) -> Self {
        FactorValue::Category(value)
    }
}

/// The typed inputs for one scoring call, keyed by factor field name.
///
/// Treated as immutable during scoring: the engine only reads it, and callers
/// build a fresh record per call. A BTreeMap keeps iteration order stable so
/// identical records always score identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputRecord {
    fields: BTreeMap<String, FactorValue>,
}

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: &str, value: impl Into<FactorValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<FactorValue>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FactorValue> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read a numeric field. Missing fields read as 0 (a blank numeric input
    /// means "nothing entered", not an error). Non-numeric or non-finite
    /// values are rejected with the offending field named.
    pub fn number(&self, field: &str) -> Result<f64, ScoreError> {
        match self.fields.get(field) {
            None => Ok(0.0),
            Some(FactorValue::Number(n)) if n.is_finite() => Ok(*n),
            Some(FactorValue::Number(_)) => Err(ScoreError::NotFinite {
                field: field.to_string(),
            }),
            Some(other) => Err(ScoreError::InvalidInput {
                field: field.to_string(),
                expected: "number",
                found: other.describe(),
            }),
        }
    }

    /// Read a categorical field. Missing fields read as None.
    pub fn category(&self, field: &str) -> Result<Option<&str>, ScoreError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(FactorValue::Category(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ScoreError::InvalidInput {
                field: field.to_string(),
                expected: "category",
                found: other.describe(),
            }),
        }
    }

    /// Read a boolean field. Missing fields read as false.
    pub fn flag(&self, field: &str) -> Result<bool, ScoreError> {
        match self.fields.get(field) {
            None => Ok(false),
            Some(FactorValue::Flag(b)) => Ok(*b),
            Some(other) => Err(ScoreError::InvalidInput {
                field: field.to_string(),
                expected: "flag",
                found: other.describe(),
            }),
        }
    }
}
