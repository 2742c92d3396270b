//! Forecast entries as delivered upstream and the per-day projection served to clients

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Instantaneous weather details keyed by field name
pub type Details = BTreeMap<String, f64>;

/// One timestamped entry of the upstream forecast series
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    /// ISO-8601 UTC timestamp, verbatim from upstream
    pub time: String,
    /// Instantaneous details at `time`
    pub details: Details,
}

impl ForecastEntry {
    #[must_use]
    pub fn new(time: impl Into<String>, details: Details) -> Self {
        Self {
            time: time.into(),
            details,
        }
    }
}

/// Forecast chosen for a single calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct DailyForecast {
    /// UTC timestamp of the chosen entry
    #[schema(example = "2024-01-01T14:00:00Z")]
    pub time: String,
    /// Instantaneous details of the chosen entry
    #[schema(value_type = WeatherDetails)]
    pub data: Details,
}

impl From<ForecastEntry> for DailyForecast {
    fn from(entry: ForecastEntry) -> Self {
        Self {
            time: entry.time,
            data: entry.details,
        }
    }
}

/// Documented shape of the details block. met.no may add fields; they are passed through.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherDetails {
    /// Air pressure at sea level (hPa)
    pub air_pressure_at_sea_level: f64,
    /// Air temperature (celsius)
    pub air_temperature: f64,
    /// Cloud area fraction (%)
    pub cloud_area_fraction: f64,
    /// Relative humidity (%)
    pub relative_humidity: f64,
    /// Direction the wind blows from (degrees)
    pub wind_from_direction: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_forecast_serializes_as_time_and_data() {
        let details = Details::from([
            ("air_temperature".to_string(), -3.5),
            ("wind_speed".to_string(), 4.2),
        ]);
        let daily = DailyForecast::from(ForecastEntry::new("2024-01-01T14:00:00Z", details));

        let json = serde_json::to_value(&daily).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "time": "2024-01-01T14:00:00Z",
                "data": {"air_temperature": -3.5, "wind_speed": 4.2}
            })
        );
    }
}
