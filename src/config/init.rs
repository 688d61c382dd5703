use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::get_config_path;

const DEFAULT_CONFIG: &str = r#"# scorecard configuration
#
# Named locations for `scorecard snow-day --location NAME` (and --all).
# The query is passed to the geocoding service as-is.
locations: []
#  - name: home
#    query: "Ottawa"
#  - name: school
#    query: "Kanata"

# Per-policy parameter overrides. Each parameter has a declared valid range;
# slider-style multipliers clamp, caps reject out-of-range values.
overrides: {}
#  snow-day:
#    snowfall_multiplier: 10
#    snowfall_cap: 60

# Weather fetch settings.
weather:
  timeout: 10s
  cache_ttl: 15m
  cache: true
"#;

/// Write a starter config file.
///
/// If `path` is Some, uses that as the config file path; otherwise the
/// default path. Refuses to overwrite an existing file unless `force`.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}
