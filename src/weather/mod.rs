pub mod cache;
pub mod client;
pub mod types;

pub use cache::CacheConfig;
pub use client::{fetch_locations, WeatherClient};
pub use types::{Forecast, HourlySample, Location, Outlook};
