use anyhow::{bail, Result};

/// Percentage change from `from` to `to`, signed.
/// Undefined for a starting value of 0.
pub fn percent_change(from: f64, to: f64) -> Result<f64> {
    if !from.is_finite() || !to.is_finite() {
        bail!("Values must be finite numbers");
    }
    if from == 0.0 {
        bail!("Percentage change from 0 is undefined");
    }
    Ok((to - from) / from.abs() * 100.0)
}

/// What percent `part` is of `whole`.
pub fn percent_of(part: f64, whole: f64) -> Result<f64> {
    if !part.is_finite() || !whole.is_finite() {
        bail!("Values must be finite numbers");
    }
    if whole == 0.0 {
        bail!("Percent of 0 is undefined");
    }
    Ok(part / whole * 100.0)
}
