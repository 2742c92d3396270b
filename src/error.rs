//! Error types and handling for the weather proxy

use thiserror::Error;

/// Main error type for the weather proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Missing or malformed request parameters
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Geocoding upstream failures (network, status, payload, no match)
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// Forecast upstream failures (network, status, payload)
    #[error("Forecast error: {message}")]
    Forecast { message: String },

    /// Failures while reducing a forecast series
    #[error("Reduce error: {message}")]
    Reduce { message: String },
}

impl ProxyError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new geocoding error
    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    /// Create a new forecast error
    pub fn forecast<S: Into<String>>(message: S) -> Self {
        Self::Forecast {
            message: message.into(),
        }
    }

    /// Create a new reduce error
    pub fn reduce<S: Into<String>>(message: S) -> Self {
        Self::Reduce {
            message: message.into(),
        }
    }

    /// Whether the caller is at fault and may see the message
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProxyError::Validation { .. })
    }

    /// Short name of the stage that failed, used in log lines
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            ProxyError::Config { .. } => "config",
            ProxyError::Validation { .. } => "validation",
            ProxyError::Geocoding { .. } => "geocoding",
            ProxyError::Forecast { .. } => "forecast",
            ProxyError::Reduce { .. } => "reduce",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = ProxyError::config("missing port");
        assert!(matches!(config_err, ProxyError::Config { .. }));

        let geo_err = ProxyError::geocoding("connection failed");
        assert!(matches!(geo_err, ProxyError::Geocoding { .. }));

        let validation_err = ProxyError::validation("search was not provided");
        assert!(matches!(validation_err, ProxyError::Validation { .. }));
    }

    #[test]
    fn test_only_validation_is_client_error() {
        assert!(ProxyError::validation("x").is_client_error());
        assert!(!ProxyError::forecast("x").is_client_error());
        assert!(!ProxyError::geocoding("x").is_client_error());
        assert!(!ProxyError::reduce("x").is_client_error());
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = ProxyError::forecast("HTTP 503 from met.no");
        assert_eq!(err.to_string(), "Forecast error: HTTP 503 from met.no");
        assert_eq!(err.stage(), "forecast");
    }
}
