//! Data models for the weather proxy
//!
//! - Location: geographic coordinates and the default location
//! - Forecast: upstream forecast entries and the per-day projection

pub mod forecast;
pub mod location;

// Re-export all public types for convenient access
pub use forecast::{DailyForecast, ForecastEntry, WeatherDetails};
pub use location::Coordinates;
