pub mod classify;
pub mod engine;
pub mod input;
pub mod params;
pub mod policy;
pub mod rules;
pub mod validation;

pub use classify::{classify, Band, Classification};
pub use engine::{score, score_partial, FactorContribution, ScoreError, ScoreResult};
pub use input::{FactorValue, InputRecord};
pub use params::{ConfigError, Configuration, OutOfRange, ParamSpec};
pub use policy::{Combine, ScoringPolicy};
pub use rules::{Bound, FactorRule, ParamRef, RuleKind, Tier, Weight};
pub use validation::{check_overrides, validate_policy};
