//! Client for the met.no Locationforecast 2.0 `compact` product

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::ForecastProvider;
use crate::config::ProxyConfig;
use crate::models::{Coordinates, ForecastEntry};
use crate::{ProxyError, Result};

const COMPACT_PATH: &str = "/weatherapi/locationforecast/2.0/compact";

/// met.no forecast client
pub struct MetNoClient {
    client: Client,
    base_url: String,
}

impl MetNoClient {
    /// Create a new client from the forecast and upstream settings
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.forecast.user_agent.clone());
        if let Some(seconds) = config.upstream.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ProxyError::config(format!("Failed to create forecast HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.forecast.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ForecastProvider for MetNoClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<ForecastEntry>> {
        let url = format!("{}{}", self.base_url, COMPACT_PATH);
        let start_time = Instant::now();
        debug!("Requesting met.no forecast from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("lat", coordinates.latitude), ("lon", coordinates.longitude)])
            .send()
            .await
            .map_err(|e| ProxyError::forecast(format!("met.no request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("met.no answered with HTTP {}", status);
            return Err(ProxyError::forecast(format!(
                "met.no returned {status}: {body}"
            )));
        }

        let forecast: metno::LocationForecast = response
            .json()
            .await
            .map_err(|e| ProxyError::forecast(format!("Failed to parse met.no response: {e}")))?;

        let entries: Vec<ForecastEntry> = forecast
            .properties
            .timeseries
            .into_iter()
            .map(ForecastEntry::from)
            .collect();

        info!(
            "Retrieved {} forecast entries in {:.3}s",
            entries.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(entries)
    }
}

/// met.no response structures; only the parts the proxy serves are modelled
mod metno {
    use super::ForecastEntry;
    use crate::models::forecast::Details;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct LocationForecast {
        pub properties: Properties,
    }

    #[derive(Debug, Deserialize)]
    pub struct Properties {
        pub timeseries: Vec<TimeStep>,
    }

    #[derive(Debug, Deserialize)]
    pub struct TimeStep {
        pub time: String,
        pub data: TimeStepData,
    }

    /// `next_1_hours` and friends are ignored
    #[derive(Debug, Deserialize)]
    pub struct TimeStepData {
        pub instant: InstantData,
    }

    #[derive(Debug, Deserialize)]
    pub struct InstantData {
        #[serde(default)]
        pub details: Details,
    }

    impl From<TimeStep> for ForecastEntry {
        fn from(step: TimeStep) -> Self {
            ForecastEntry::new(step.time, step.data.instant.details)
        }
    }
}
