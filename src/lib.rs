//! `weather-proxy` - daily weather forecasts around 14:00 UTC
//!
//! This library provides the HTTP surface, the upstream clients for met.no and
//! the RapidAPI geocoder, and the reducer that picks one forecast entry per day.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod location_resolver;
pub mod models;
pub mod rate_limit;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, router};
pub use config::ProxyConfig;
pub use error::ProxyError;
pub use geocoding::{Geocoder, GeocodingResult, RapidApiGeocoder};
pub use location_resolver::{LocationInput, LocationResolver};
pub use models::{Coordinates, DailyForecast, ForecastEntry};
pub use rate_limit::RateLimiter;
pub use weather::{ForecastProvider, MetNoClient, reduce_to_daily};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ProxyError>;
