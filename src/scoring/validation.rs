use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::params::{OutOfRange, ParamSpec};
use super::policy::{Combine, ScoringPolicy};
use super::rules::{ParamRef, RuleKind, Weight};

/// Validate a policy at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_policy(policy: &ScoringPolicy) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if policy.rules.is_empty() {
        errors.push(format!("policy `{}`: has no rules", policy.name));
    }

    // Rule names must be unique so the breakdown maps one entry per factor
    let mut seen_rules = BTreeSet::new();
    for rule in &policy.rules {
        if !seen_rules.insert(rule.name.as_str()) {
            errors.push(format!(
                "policy `{}`: duplicate rule name `{}`",
                policy.name, rule.name
            ));
        }
    }

    let mut seen_params = BTreeSet::new();
    for spec in &policy.params {
        if !seen_params.insert(spec.name.as_str()) {
            errors.push(format!(
                "params.{}: duplicate parameter name",
                spec.name
            ));
        }
        if !spec.min.is_finite() || !spec.max.is_finite() || !spec.default.is_finite() {
            errors.push(format!("params.{}: bounds must be finite", spec.name));
            continue;
        }
        if spec.min > spec.max {
            errors.push(format!(
                "params.{}: min {} exceeds max {}",
                spec.name, spec.min, spec.max
            ));
        }
        if spec.default < spec.min || spec.default > spec.max {
            errors.push(format!(
                "params.{}: default {} is outside [{}, {}]",
                spec.name, spec.default, spec.min, spec.max
            ));
        }
    }

    for rule in &policy.rules {
        validate_rule(policy, rule, &mut errors);

        if let Weight::Fixed(w) = rule.weight {
            if !w.is_finite() || w < 0.0 {
                errors.push(format!(
                    "rules.{}: weight must be finite and non-negative, got {}",
                    rule.name, w
                ));
            }
        }
    }

    match policy.combine {
        Combine::SumClamped { min, max } => {
            if !min.is_finite() || !max.is_finite() || min >= max {
                errors.push(format!(
                    "policy `{}`: sum-clamped range [{}, {}] is invalid",
                    policy.name, min, max
                ));
            }
        }
        Combine::WeightedAverage { max_scale } => {
            if !max_scale.is_finite() || max_scale <= 0.0 {
                errors.push(format!(
                    "policy `{}`: weighted-average max_scale {} is invalid",
                    policy.name, max_scale
                ));
            }
        }
    }

    if policy.bands.is_empty() {
        errors.push(format!("policy `{}`: has no bands", policy.name));
    } else {
        let fallbacks = policy
            .bands
            .iter()
            .filter(|b| b.threshold_low <= 0.0)
            .count();
        if fallbacks != 1 {
            errors.push(format!(
                "policy `{}`: expected exactly one fallback band with threshold_low <= 0, found {}",
                policy.name, fallbacks
            ));
        }
        for band in &policy.bands {
            if !band.threshold_low.is_finite() {
                errors.push(format!(
                    "bands.{}: threshold_low must be finite",
                    band.label
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rule(
    policy: &ScoringPolicy,
    rule: &super::rules::FactorRule,
    errors: &mut Vec<String>,
) {
    let check_ref = |param_ref: &ParamRef, what: &str, errors: &mut Vec<String>| {
        match param_ref {
            ParamRef::Value(v) => {
                if !v.is_finite() {
                    errors.push(format!("rules.{}: {} must be finite", rule.name, what));
                }
            }
            ParamRef::Param(name) => {
                if !policy.params.iter().any(|s| s.name == *name) {
                    errors.push(format!(
                        "rules.{}: {} references undeclared parameter `{}`",
                        rule.name, what, name
                    ));
                }
            }
        }
    };

    match &rule.rule {
        RuleKind::Scaled {
            multiplier, cap, ..
        } => {
            check_ref(multiplier, "multiplier", errors);
            check_ref(cap, "cap", errors);
        }
        RuleKind::Tiered {
            tiers, otherwise, ..
        } => {
            if tiers.is_empty() {
                errors.push(format!("rules.{}: tiered rule has no tiers", rule.name));
            }
            for tier in tiers {
                if !tier.when.threshold().is_finite() || !tier.points.is_finite() {
                    errors.push(format!(
                        "rules.{}: tier `{}` must use finite numbers",
                        rule.name, tier.when
                    ));
                }
            }
            if !otherwise.is_finite() {
                errors.push(format!("rules.{}: otherwise must be finite", rule.name));
            }
        }
        RuleKind::Lookup { table, default, .. } => {
            for (key, points) in table {
                if !points.is_finite() {
                    errors.push(format!(
                        "rules.{}: table entry `{}` must be finite",
                        rule.name, key
                    ));
                }
            }
            if !default.is_finite() {
                errors.push(format!("rules.{}: default must be finite", rule.name));
            }
        }
        RuleKind::Flag { points, .. } => {
            if !points.is_finite() {
                errors.push(format!("rules.{}: points must be finite", rule.name));
            }
        }
    }
}

/// Validate a set of overrides against parameter specs, collecting every
/// problem instead of stopping at the first. The strict single-error path is
/// [`Configuration::with_overrides`](super::params::Configuration::with_overrides);
/// this variant feeds startup diagnostics.
pub fn check_overrides(
    specs: &[ParamSpec],
    overrides: &BTreeMap<String, f64>,
) -> Vec<String> {
    let mut errors = Vec::new();
    for (name, &value) in overrides {
        let Some(spec) = specs.iter().find(|s| s.name == *name) else {
            errors.push(format!("overrides.{}: unknown parameter", name));
            continue;
        };
        if !value.is_finite() {
            errors.push(format!("overrides.{}: must be a finite number", name));
            continue;
        }
        if (value < spec.min || value > spec.max) && spec.out_of_range == OutOfRange::Reject {
            errors.push(format!(
                "overrides.{}: {} is outside the valid range [{}, {}]",
                name, value, spec.min, spec.max
            ));
        }
    }
    errors
}
