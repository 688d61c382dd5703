use serde::{Deserialize, Serialize};

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One hour of forecast data, already converted to the units the snow-day
/// policy expects (cm, °C, %, km/h).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySample {
    /// ISO-8601 local time, e.g. "2026-01-12T06:00".
    pub time: String,
    pub snowfall_cm: f64,
    pub temperature_c: f64,
    pub precipitation_pct: f64,
    pub wind_kmh: f64,
}

/// Hourly forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub location: Location,
    pub hours: Vec<HourlySample>,
}

/// Worst-case conditions over a window of hours: total snowfall, coldest
/// temperature, peak precipitation probability and peak wind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlook {
    pub snowfall_cm: f64,
    pub temperature_c: f64,
    pub precipitation_pct: f64,
    pub wind_kmh: f64,
}

impl Forecast {
    /// Aggregate the first `window` hours into an [`Outlook`].
    /// Returns None for an empty forecast.
    pub fn outlook(&self, window: usize) -> Option<Outlook> {
        let hours = &self.hours[..self.hours.len().min(window)];
        if hours.is_empty() {
            return None;
        }

        Some(Outlook {
            snowfall_cm: hours.iter().map(|h| h.snowfall_cm).sum(),
            temperature_c: hours
                .iter()
                .map(|h| h.temperature_c)
                .fold(f64::INFINITY, f64::min),
            precipitation_pct: hours
                .iter()
                .map(|h| h.precipitation_pct)
                .fold(0.0, f64::max),
            wind_kmh: hours.iter().map(|h| h.wind_kmh).fold(0.0, f64::max),
        })
    }
}
