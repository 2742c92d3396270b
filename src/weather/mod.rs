//! Forecast retrieval and reduction
//!
//! The upstream forecast source sits behind [`ForecastProvider`]; the only
//! production implementation is [`MetNoClient`]. [`daily_forecast`] runs the
//! fetch-then-reduce pipeline shared by both HTTP routes.

use async_trait::async_trait;
use tracing::debug;

use crate::Result;
use crate::models::{Coordinates, DailyForecast, ForecastEntry};

pub mod met_no;
pub mod reducer;

pub use met_no::MetNoClient;
pub use reducer::{TARGET_HOUR, reduce_to_daily};

/// Source of raw forecast time series
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch every forecast entry upstream offers for `coordinates`
    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<ForecastEntry>>;
}

/// Fetch the series for `coordinates` and keep one entry per day
pub async fn daily_forecast(
    provider: &dyn ForecastProvider,
    coordinates: Coordinates,
) -> Result<Vec<DailyForecast>> {
    let series = provider.fetch_forecast(coordinates).await?;
    let total = series.len();
    let daily = reduce_to_daily(series)?;
    debug!("Reduced {} forecast entries to {} days", total, daily.len());
    Ok(daily)
}
