use std::sync::Arc;

use anyhow::{Context, Result};
use weather_proxy::{
    AppState, MetNoClient, ProxyConfig, RapidApiGeocoder, RateLimiter, telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProxyConfig::load().context("Failed to load configuration")?;
    let _telemetry = telemetry::init(&config.logging)?;

    let geocoder = Arc::new(RapidApiGeocoder::new(&config)?);
    let forecasts = Arc::new(MetNoClient::new(&config)?);
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window(),
    ));
    tracing::debug!(
        "Rate limit: {} requests per {}ms",
        config.rate_limit.max_requests,
        config.rate_limit.window_ms
    );

    let app = web::app(AppState::new(geocoder, forecasts), limiter);
    web::run(&config.server, app)
        .await
        .context("Web server failed")?;
    Ok(())
}
