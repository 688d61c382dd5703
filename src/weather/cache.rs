use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for forecast response caching
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(15 * 60),
        }
    }
}

/// Get the platform-appropriate cache directory for scorecard
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("scorecard/weather-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/scorecard/weather-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the forecast cache directory
pub fn clear_cache() -> Result<()> {
    let cache_path = get_cache_path();
    match std::fs::remove_dir_all(&cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Serializable representation of a cached response for disk storage
#[derive(serde::Serialize, serde::Deserialize)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    body: String,
}

fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match (now - fetched_at).to_std() {
        Ok(age) => age <= ttl,
        // fetched_at in the future means a clock change; treat as stale
        Err(_) => false,
    }
}

/// Load a cached response body by URL if it is still within the TTL.
pub fn load(cache_path: &Path, url: &str, ttl: Duration) -> Option<String> {
    let bytes = cacache::read_sync(cache_path, url).ok()?;
    let entry: CacheEntry = serde_json::from_slice(&bytes).ok()?;
    if is_fresh(entry.fetched_at, Utc::now(), ttl) {
        Some(entry.body)
    } else {
        None
    }
}

/// Store a response body under its URL. Fire-and-forget: a cache write
/// failure never fails the fetch.
pub fn store(cache_path: &Path, url: &str, body: &str) {
    let entry = CacheEntry {
        fetched_at: Utc::now(),
        body: body.to_string(),
    };
    if let Ok(serialized) = serde_json::to_vec(&entry) {
        let _ = cacache::write_sync(cache_path, url, &serialized);
    }
}
