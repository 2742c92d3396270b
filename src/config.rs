//! Configuration management for the weather proxy
//!
//! Settings are layered: built-in defaults, an optional TOML file, variables
//! prefixed with `WEATHER_PROXY_` (sections separated by `__`), and finally
//! the conventional `PORT` and `RAPID_API_KEY` variables.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use secrecy::Secret;
use serde::Deserialize;

use crate::{ProxyError, Result};

/// Environment variable naming the TOML file to read
pub const CONFIG_PATH_VAR: &str = "WEATHER_PROXY_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "WEATHER_PROXY";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Geocoding upstream settings
    pub geocoding: GeocodingConfig,
    /// Forecast upstream settings
    pub forecast: ForecastConfig,
    /// Settings shared by both upstream clients
    pub upstream: UpstreamConfig,
    /// Global request rate ceiling
    pub rate_limit: RateLimitConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// RapidAPI key; searches fail upstream without one
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    /// Value of the `X-RapidAPI-Host` header
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub base_url: String,
    /// met.no refuses requests without an identifying agent
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Overall request timeout; unset leaves the transport defaults
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector for span export
    pub otlp_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://forward-reverse-geocoding.p.rapidapi.com".to_string(),
            host: "forward-reverse-geocoding.p.rapidapi.com".to_string(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.met.no".to_string(),
            user_agent: "weather-app/1.0".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // met.no: anything over 20 requests/second per application needs an agreement
        Self {
            max_requests: 20,
            window_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            otlp_endpoint: None,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl ServerConfig {
    /// `host:port` to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ProxyConfig {
    /// Load configuration from the file named by `WEATHER_PROXY_CONFIG` and the environment
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from_path(&path)
    }

    /// Load configuration from specified path; a missing file is skipped
    pub fn load_from_path(config_file: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                File::from(config_file)
                    .required(false)
                    .format(FileFormat::Toml),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env_override("PORT"))
            .and_then(|builder| {
                builder.set_override_option("geocoding.api_key", env_override("RAPID_API_KEY"))
            })
            .and_then(|builder| builder.build())
            .map_err(|e| ProxyError::config(format!("Failed to build configuration: {e}")))?;

        let config: ProxyConfig = settings
            .try_deserialize()
            .map_err(|e| ProxyError::config(format!("Failed to deserialize configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_api_keys(&self) -> Result<()> {
        use secrecy::ExposeSecret;

        if let Some(api_key) = &self.geocoding.api_key {
            if api_key.expose_secret().trim().is_empty() {
                return Err(ProxyError::config(
                    "Geocoding API key cannot be empty if provided. Either remove it or provide a valid key.",
                ));
            }
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ProxyError::config("Server port cannot be 0"));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(ProxyError::config("Rate limit max_requests must be positive"));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ProxyError::config("Rate limit window_ms must be positive"));
        }
        if self.upstream.timeout_seconds == Some(0) {
            return Err(ProxyError::config("Upstream timeout cannot be 0 seconds"));
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ProxyError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ProxyError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Forecast", &self.forecast.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProxyError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        if self.forecast.user_agent.trim().is_empty() {
            return Err(ProxyError::config("Forecast user agent cannot be empty"));
        }

        Ok(())
    }
}

/// Value of an override variable; unset and empty are both ignored
fn env_override(name: &str) -> Option<String> {
    non_empty(env::var(name).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
