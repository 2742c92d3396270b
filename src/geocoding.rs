//! Forward geocoding through the RapidAPI "forward-reverse-geocoding" service.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use tracing::{debug, info, instrument, warn};

use crate::config::ProxyConfig;
use crate::models::Coordinates;
use crate::{ProxyError, Result};

const SEARCH_PATH: &str = "/v1/search";

/// One candidate returned by a geocoding search
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeocodingResult {
    /// Latitude; upstream sends it as a string
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub lat: f64,
    /// Longitude; upstream sends it as a string
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub lon: f64,
    /// Human readable place name
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<&GeocodingResult> for Coordinates {
    fn from(result: &GeocodingResult) -> Self {
        Coordinates::new(result.lat, result.lon)
    }
}

/// Turns free text into candidate locations, best match first
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str, lang: &str) -> Result<Vec<GeocodingResult>>;
}

/// RapidAPI geocoding client
pub struct RapidApiGeocoder {
    client: Client,
    base_url: String,
    host: String,
    api_key: Option<Secret<String>>,
}

impl RapidApiGeocoder {
    /// Create a new client from the geocoding and upstream settings
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.upstream.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ProxyError::config(format!("Failed to create geocoding HTTP client: {e}")))?;

        if config.geocoding.api_key.is_none() {
            warn!("No geocoding API key configured; searches will be rejected upstream");
        }

        Ok(Self {
            client,
            base_url: config.geocoding.base_url.trim_end_matches('/').to_string(),
            host: config.geocoding.host.clone(),
            api_key: config.geocoding.api_key.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for RapidApiGeocoder {
    #[instrument(skip(self), fields(query = query, lang = lang))]
    async fn search(&self, query: &str, lang: &str) -> Result<Vec<GeocodingResult>> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let start_time = Instant::now();
        info!("Geocoding location: '{}'", query);

        let mut request = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("accept-language", lang),
                ("polygon_threshold", "0.0"),
            ])
            .header("X-RapidAPI-Host", &self.host);

        if let Some(api_key) = &self.api_key {
            request = request.header("X-RapidAPI-Key", api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::geocoding(format!("Geocoding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Geocoding answered with HTTP {}", status);
            return Err(ProxyError::geocoding(format!(
                "Geocoding returned {status}: {body}"
            )));
        }

        let results: Vec<GeocodingResult> = response.json().await.map_err(|e| {
            ProxyError::geocoding(format!("Failed to parse geocoding response for '{query}': {e}"))
        })?;

        if results.is_empty() {
            warn!("No results found for location '{}'", query);
        } else {
            info!(
                "Found {} geocoding results for '{}' in {:.3}s",
                results.len(),
                query,
                start_time.elapsed().as_secs_f64()
            );
            debug!(
                "Geocoding results: {:?}",
                results
                    .iter()
                    .map(|r| format!("{:.4}, {:.4}", r.lat, r.lon))
                    .collect::<Vec<_>>()
            );
        }

        Ok(results)
    }
}
