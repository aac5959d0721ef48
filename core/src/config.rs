//! Client configuration.
//!
//! Settings are endpoint-independent: where the API lives, how long a call
//! may take, and headers every request carries. They can be deserialized
//! (all fields optional) or read from `RIDE_API_*` environment variables.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://us-or-rly101.zwift.com/api/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_VERSION_HEADER: &str = "Zwift-Api-Version";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Duration,
    /// Sent with every request after the endpoint's own headers.
    pub default_headers: Vec<(String, String)>,
    pub api_version: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_headers: Vec::new(),
            api_version: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Defaults overridden by `RIDE_API_BASE_URL`, `RIDE_API_TIMEOUT_MS` and
    /// `RIDE_API_VERSION` when set.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("RIDE_API_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(timeout) = lookup("RIDE_API_TIMEOUT_MS") {
            let ms: u64 = timeout.parse().map_err(|_| {
                let message = format!("invalid RIDE_API_TIMEOUT_MS '{timeout}'");
                ApiError::configuration("config", message)
            })?;
            config.timeout = Duration::from_millis(ms);
        }
        config.api_version = lookup("RIDE_API_VERSION").or(config.api_version);
        Ok(config)
    }

    /// Parsed base URL, always ending in `/` so relative templates join
    /// beneath it.
    pub fn base_url(&self) -> Result<Url, ApiError> {
        let mut raw = self.base_url.trim_end_matches('/').to_string();
        raw.push('/');
        let url = Url::parse(&raw).map_err(|e| {
            ApiError::configuration("config", format!("invalid base URL '{}': {e}", self.base_url))
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::configuration(
                "config",
                format!("base URL '{}' must be an http(s) URL", self.base_url),
            ));
        }
        if url.query().is_some() {
            return Err(ApiError::configuration("config", "base URL cannot carry a query"));
        }
        Ok(url)
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        self.base_url()?;
        if self.timeout.is_zero() {
            return Err(ApiError::configuration("config", "timeout must be positive"));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let a = ClientConfig::new("http://localhost:3000/api").base_url().unwrap();
        let b = ClientConfig::new("http://localhost:3000/api///").base_url().unwrap();
        assert_eq!(a.as_str(), "http://localhost:3000/api/");
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_base_urls_are_configuration_errors() {
        for raw in ["not a url", "mailto:x@y.z", "ftp://host/api", "http://host/api?x=1"] {
            let err = ClientConfig::new(raw).base_url().unwrap_err();
            assert!(matches!(err, ApiError::Configuration { .. }), "{raw}");
        }
    }

    #[test]
    fn deserializes_with_defaults() {
        let raw = r#"{"base_url":"http://127.0.0.1:9000/api","timeout_ms":1500}"#;
        let config: ClientConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert!(config.default_headers.is_empty());
        assert_eq!(config.api_version, None);

        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn env_lookup_overrides_defaults() {
        let config = ClientConfig::from_lookup(|key| match key {
            "RIDE_API_BASE_URL" => Some("http://localhost:1/api".to_string()),
            "RIDE_API_TIMEOUT_MS" => Some("250".to_string()),
            "RIDE_API_VERSION" => Some("2.6".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:1/api");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.api_version.as_deref(), Some("2.6"));

        let err = ClientConfig::from_lookup(|key| {
            (key == "RIDE_API_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(err.is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(ClientConfig::default().with_timeout(Duration::ZERO).validate().is_err());
    }
}
