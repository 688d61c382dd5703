use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use super::cache::{self, CacheConfig};
use super::types::{Forecast, HourlySample, Location};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Client for the Open-Meteo geocoding and forecast APIs.
///
/// The network is strictly a boundary concern: this client produces plain
/// [`Forecast`] values and the scoring engine never sees a failed or partial
/// fetch. Callers fall back to manual inputs when a fetch fails.
pub struct WeatherClient {
    http: reqwest::Client,
    cache_path: PathBuf,
    cache: CacheConfig,
}

impl WeatherClient {
    pub fn new(timeout: Duration, cache: CacheConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("scorecard")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            cache_path: cache::get_cache_path(),
            cache,
        })
    }

    /// GET a URL with retry, serving from the response cache when fresh.
    async fn get_text(&self, url: &str) -> Result<String> {
        if self.cache.enabled {
            if let Some(body) = cache::load(&self.cache_path, url, self.cache.ttl) {
                return Ok(body);
            }
        }

        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        let body = Retry::spawn(retry_strategy, || async {
            let response = self.http.get(url).send().await.map_err(|e| {
                if e.is_timeout() {
                    anyhow!("Weather service timed out. Try again or enter conditions manually.")
                } else if e.is_connect() {
                    anyhow!("Could not reach the weather service. Check your network connection.")
                } else {
                    anyhow!("Weather service error: {}", e)
                }
            })?;

            if !response.status().is_success() {
                bail!("Weather service returned {}", response.status());
            }

            response
                .text()
                .await
                .context("Failed to read weather service response")
        })
        .await?;

        if self.cache.enabled {
            cache::store(&self.cache_path, url, &body);
        }

        Ok(body)
    }

    /// Resolve a place name to coordinates.
    pub async fn geocode(&self, query: &str) -> Result<Location> {
        let url = reqwest::Url::parse_with_params(
            GEOCODING_URL,
            &[("name", query), ("count", "1"), ("format", "json")],
        )
        .context("Failed to build geocoding URL")?;

        let body = self.get_text(url.as_str()).await?;
        parse_geocode(query, &body)
    }

    /// Fetch a two-day hourly forecast for a location.
    pub async fn forecast(&self, location: &Location) -> Result<Forecast> {
        let url = reqwest::Url::parse_with_params(
            FORECAST_URL,
            &[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                (
                    "hourly",
                    "temperature_2m,snowfall,precipitation_probability,wind_speed_10m"
                        .to_string(),
                ),
                ("forecast_days", "2".to_string()),
                ("timezone", "auto".to_string()),
            ],
        )
        .context("Failed to build forecast URL")?;

        let body = self.get_text(url.as_str()).await?;
        parse_forecast(location.clone(), &body)
    }

    /// Geocode a place name and fetch its forecast in one call.
    pub async fn forecast_for(&self, query: &str) -> Result<Forecast> {
        let location = self.geocode(query).await?;
        self.forecast(&location).await
    }
}

/// Fetch forecasts for several configured locations concurrently.
/// Per-location failures are returned alongside the successes so one bad
/// location doesn't sink the rest.
pub async fn fetch_locations(
    client: &WeatherClient,
    queries: &[(String, String)],
) -> Vec<(String, Result<Forecast>)> {
    let mut futures = FuturesUnordered::new();
    for (name, query) in queries {
        futures.push(async move {
            let result = client.forecast_for(query).await;
            (name.clone(), result)
        });
    }

    let mut results = Vec::with_capacity(queries.len());
    while let Some(entry) = futures.next().await {
        results.push(entry);
    }
    results
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    snowfall: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
}

fn parse_geocode(query: &str, body: &str) -> Result<Location> {
    let response: GeocodeResponse =
        serde_json::from_str(body).context("Failed to parse geocoding response")?;

    let hit = response
        .results
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No location found for '{}'", query))?;

    Ok(Location {
        name: hit.name,
        latitude: hit.latitude,
        longitude: hit.longitude,
    })
}

fn parse_forecast(location: Location, body: &str) -> Result<Forecast> {
    let response: ForecastResponse =
        serde_json::from_str(body).context("Failed to parse forecast response")?;
    let hourly = response.hourly;

    // The API returns parallel arrays; truncate to the shortest so a ragged
    // response can't misalign samples.
    let len = hourly
        .time
        .len()
        .min(hourly.temperature_2m.len())
        .min(hourly.snowfall.len())
        .min(hourly.precipitation_probability.len())
        .min(hourly.wind_speed_10m.len());

    let hours = (0..len)
        .map(|i| HourlySample {
            time: hourly.time[i].clone(),
            snowfall_cm: hourly.snowfall[i].unwrap_or(0.0),
            temperature_c: hourly.temperature_2m[i].unwrap_or(0.0),
            precipitation_pct: hourly.precipitation_probability[i].unwrap_or(0.0),
            wind_kmh: hourly.wind_speed_10m[i].unwrap_or(0.0),
        })
        .collect();

    Ok(Forecast { location, hours })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geocode_first_result() {
        let body = r#"{"results":[
            {"name":"Ottawa","latitude":45.41,"longitude":-75.7},
            {"name":"Ottawa, KS","latitude":38.6,"longitude":-95.3}
        ]}"#;
        let location = parse_geocode("ottawa", body).unwrap();
        assert_eq!(location.name, "Ottawa");
        assert_eq!(location.latitude, 45.41);
    }

    #[test]
    fn test_parse_geocode_no_results() {
        let err = parse_geocode("nowhere", r#"{"results":[]}"#).unwrap_err();
        assert!(err.to_string().contains("nowhere"));

        // Open-Meteo omits the field entirely for zero hits
        assert!(parse_geocode("nowhere", r#"{}"#).is_err());
    }

    #[test]
    fn test_parse_forecast_samples() {
        let location = Location {
            name: "Ottawa".to_string(),
            latitude: 45.41,
            longitude: -75.7,
        };
        let body = r#"{"hourly":{
            "time":["2026-01-12T00:00","2026-01-12T01:00"],
            "temperature_2m":[-3.2,-4.0],
            "snowfall":[0.7,1.4],
            "precipitation_probability":[80,null],
            "wind_speed_10m":[22.3,28.1]
        }}"#;

        let forecast = parse_forecast(location, body).unwrap();
        assert_eq!(forecast.hours.len(), 2);
        assert_eq!(forecast.hours[0].snowfall_cm, 0.7);
        assert_eq!(forecast.hours[0].precipitation_pct, 80.0);
        // nulls read as 0 rather than poisoning the sample
        assert_eq!(forecast.hours[1].precipitation_pct, 0.0);
    }

    #[test]
    fn test_parse_forecast_ragged_arrays_truncate() {
        let location = Location {
            name: "Ottawa".to_string(),
            latitude: 45.41,
            longitude: -75.7,
        };
        let body = r#"{"hourly":{
            "time":["2026-01-12T00:00","2026-01-12T01:00","2026-01-12T02:00"],
            "temperature_2m":[-3.2],
            "snowfall":[0.7,1.4],
            "precipitation_probability":[80,75],
            "wind_speed_10m":[22.3,28.1]
        }}"#;

        let forecast = parse_forecast(location, body).unwrap();
        assert_eq!(forecast.hours.len(), 1);
    }
}
