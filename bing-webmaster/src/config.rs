//! Configuration types for the client, its transport and pagination.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::{Result, WebmasterError};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "BING_WEBMASTER_API_KEY";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "BING_WEBMASTER_API_URL";

/// Default JSON endpoint of the service.
pub const DEFAULT_BASE_URL: &str = "https://ssl.bing.com/webmaster/api.svc/json";

/// Configuration for the webmaster client.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Base URL of the JSON API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Multi-page retrieval settings.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> f64 {
    30.0
}

fn default_connect_timeout() -> f64 {
    10.0
}

fn default_user_agent() -> String {
    concat!("bing-webmaster-rust/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ClientConfig {
    /// Creates a configuration with defaults and the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
            pagination: PaginationConfig::default(),
        }
    }

    /// Loads configuration from `BING_WEBMASTER_API_KEY` and, if set,
    /// `BING_WEBMASTER_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                WebmasterError::Config(format!(
                    "Required environment variable '{API_KEY_ENV}' is not set"
                ))
            })?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config.base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would otherwise fail late at request time.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(WebmasterError::Config("api_key cannot be empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(WebmasterError::Config(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        check_seconds("timeout_seconds", self.timeout_seconds)?;
        check_seconds("connect_timeout_seconds", self.connect_timeout_seconds)?;
        Ok(())
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the pagination configuration.
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or(Duration::MAX)
    }

    /// Gets connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.connect_timeout_seconds).unwrap_or(Duration::MAX)
    }
}

fn check_seconds(field: &str, seconds: f64) -> Result<()> {
    if seconds > 0.0 && Duration::try_from_secs_f64(seconds).is_ok() {
        return Ok(());
    }
    Err(WebmasterError::Config(format!(
        "{field} must be a positive, representable number of seconds (got {seconds})"
    )))
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("user_agent", &self.user_agent)
            .field("pagination", &self.pagination)
            .finish()
    }
}

/// Settings for full aggregation over paginated endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// First page requested.
    #[serde(default)]
    pub start_page: u64,
    /// Upper bound on pages fetched per aggregation. `None` trusts the
    /// empty-page and `total_pages` terminators alone.
    #[serde(default)]
    pub max_pages: Option<u64>,
}

impl PaginationConfig {
    /// Creates a new pagination configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first page requested.
    #[must_use]
    pub fn with_start_page(mut self, page: u64) -> Self {
        self.start_page = page;
        self
    }

    /// Caps the number of pages fetched.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_seconds, 30.0);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.pagination, PaginationConfig::default());
        assert!(config.user_agent.starts_with("bing-webmaster-rust/"));
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "secret"),
            (API_URL_ENV, "http://localhost:8080/json"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, "http://localhost:8080/json");
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let err = ClientConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, WebmasterError::Config(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_key": "k", "timeout_seconds": 5.0, "pagination": {{"max_pages": 100}}}}"#
        )
        .unwrap();

        let config = ClientConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout_seconds, 5.0);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.pagination.max_pages, Some(100));
        assert_eq!(config.pagination.start_page, 0);
    }

    #[test]
    fn test_from_json_file_rejects_bad_base_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "k", "base_url": "ssl.bing.com"}}"#).unwrap();

        let err = ClientConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, WebmasterError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_unrepresentable_timeouts() {
        for seconds in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e20] {
            let err = ClientConfig::new("k").with_timeout(seconds).validate().unwrap_err();
            assert!(matches!(err, WebmasterError::Config(_)), "{seconds}");
        }

        let mut config = ClientConfig::new("k");
        config.connect_timeout_seconds = 1e20;
        assert!(config.validate().is_err());
        assert_eq!(config.connect_timeout(), Duration::MAX);
    }

    #[test]
    fn test_from_json_file_rejects_huge_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "k", "timeout_seconds": 1e20}}"#).unwrap();

        let err = ClientConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, WebmasterError::Config(_)));
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = ClientConfig::from_json_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, WebmasterError::Io(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_pagination_builder() {
        let config = PaginationConfig::new().with_start_page(3).with_max_pages(10);
        assert_eq!(config.start_page, 3);
        assert_eq!(config.max_pages, Some(10));
    }
}
