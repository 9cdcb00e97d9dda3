//! Configuration for the speechlink client
//!
//! Controls the service endpoint the session is configured against and the
//! cadence of the background drive worker.

use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default recognition service endpoint
pub const DEFAULT_ENDPOINT: &str =
    "wss://speech.platform.bing.com/speech/recognition/interactive/cognitiveservices/v1";

/// Default recognition language
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Default interval between drive steps
pub const DEFAULT_DRIVE_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for a [`SpeechClient`](crate::SpeechClient) connection
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the recognition service
    /// Default: [`DEFAULT_ENDPOINT`]
    pub endpoint: String,

    /// Recognition language appended to the endpoint as a query parameter;
    /// empty string omits the parameter
    /// Default: "en-us"
    pub language: String,

    /// Idle interval between drive steps of the background worker. Shutdown
    /// and new protocol work are both serviced within one interval at worst.
    /// Default: 200 ms
    pub drive_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            drive_interval: DEFAULT_DRIVE_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Create a ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ClientConfig tuned for low-latency interactive recognition
    pub fn low_latency() -> Self {
        Self {
            drive_interval: Duration::from_millis(50),
            ..Default::default()
        }
    }

    /// Full endpoint URL the session is configured against, including the
    /// language query parameter when one is set
    pub fn service_url(&self) -> String {
        if self.language.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}?language={}", self.endpoint, self.language)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(ClientError::InvalidParameter(
                "endpoint must not be empty".to_string(),
            ));
        }
        if !self.endpoint.starts_with("ws://") && !self.endpoint.starts_with("wss://") {
            return Err(ClientError::InvalidParameter(format!(
                "endpoint must be a ws:// or wss:// URL, got '{}'",
                self.endpoint
            )));
        }
        if self.drive_interval == Duration::ZERO {
            return Err(ClientError::InvalidParameter(
                "drive interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_drive_interval(mut self, interval: Duration) -> Self {
        self.drive_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.language, "en-us");
        assert_eq!(config.drive_interval, Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_service_url_includes_language() {
        let config = ClientConfig::default().with_endpoint("wss://example.invalid/v1");
        assert_eq!(config.service_url(), "wss://example.invalid/v1?language=en-us");

        let config = config.with_language("");
        assert_eq!(config.service_url(), "wss://example.invalid/v1");
    }

    #[test]
    fn test_validation() {
        let empty = ClientConfig::default().with_endpoint("");
        assert!(empty.validate().is_err());

        let http = ClientConfig::default().with_endpoint("https://example.invalid/v1");
        assert!(http.validate().is_err());

        let zero = ClientConfig::default().with_drive_interval(Duration::ZERO);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_presets_and_builders() {
        let low = ClientConfig::low_latency();
        assert_eq!(low.drive_interval, Duration::from_millis(50));
        assert!(low.validate().is_ok());

        let config = ClientConfig::new()
            .with_endpoint("ws://localhost:9000/speech")
            .with_language("de-de")
            .with_drive_interval(Duration::from_millis(10));
        assert_eq!(config.service_url(), "ws://localhost:9000/speech?language=de-de");
        assert!(config.validate().is_ok());
    }
}
