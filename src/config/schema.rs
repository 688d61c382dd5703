use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::weather::CacheConfig;

/// Main configuration file.
///
/// Example YAML:
/// ```yaml
/// locations:
///   - name: home
///     query: "Ottawa"
///   - name: school
///     query: "Kanata"
/// overrides:
///   snow-day:
///     snowfall_multiplier: 10
/// weather:
///   timeout: 10s
///   cache_ttl: 15m
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Named geocoding queries for the snow-day forecast
    #[serde(default)]
    pub locations: Vec<LocationConfig>,

    /// Per-policy parameter overrides: policy name -> parameter -> value
    #[serde(default)]
    pub overrides: BTreeMap<String, BTreeMap<String, f64>>,

    /// Weather fetch settings
    #[serde(default)]
    pub weather: Option<WeatherSection>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    pub name: Option<String>,
    pub query: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherSection {
    /// Fetch timeout as a duration string, e.g. "10s" (default)
    #[serde(default)]
    pub timeout: Option<String>,

    /// Forecast cache freshness as a duration string, e.g. "15m" (default)
    #[serde(default)]
    pub cache_ttl: Option<String>,

    /// Disable the forecast cache entirely when false
    #[serde(default)]
    pub cache: Option<bool>,
}

impl Config {
    /// Overrides declared for one policy, empty if none.
    pub fn overrides_for(&self, policy: &str) -> BTreeMap<String, f64> {
        self.overrides.get(policy).cloned().unwrap_or_default()
    }

    /// Weather fetch timeout, defaulting to 10 seconds.
    pub fn weather_timeout(&self) -> Result<Duration> {
        match self.weather.as_ref().and_then(|w| w.timeout.as_deref()) {
            Some(raw) => humantime::parse_duration(raw)
                .with_context(|| format!("weather.timeout: invalid duration '{}'", raw)),
            None => Ok(Duration::from_secs(10)),
        }
    }

    /// Forecast cache settings. `no_cache` (the --no-cache flag) wins over
    /// the config file.
    pub fn cache_config(&self, no_cache: bool) -> Result<CacheConfig> {
        let defaults = CacheConfig::default();
        let section = self.weather.as_ref();

        let ttl = match section.and_then(|w| w.cache_ttl.as_deref()) {
            Some(raw) => humantime::parse_duration(raw)
                .with_context(|| format!("weather.cache_ttl: invalid duration '{}'", raw))?,
            None => defaults.ttl,
        };

        let enabled = !no_cache && section.and_then(|w| w.cache).unwrap_or(true);
        Ok(CacheConfig { enabled, ttl })
    }

    /// Find a configured location by its name (or by the query itself when
    /// unnamed).
    pub fn find_location(&self, name: &str) -> Option<&LocationConfig> {
        self.locations.iter().find(|location| {
            location
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
                || location.query.eq_ignore_ascii_case(name)
        })
    }
}
