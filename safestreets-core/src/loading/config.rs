use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Public Overpass mirrors raced when the proxy is unavailable
pub const DEFAULT_MIRRORS: [&str; 4] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

/// Path of the proxy endpoint relative to its base URL
pub const PROXY_PATH: &str = "/api/overpass";

/// Endpoints and limits for the fetch client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base URL of the backend proxy, tried before the mirrors
    pub proxy_url: Option<String>,
    /// Mirror endpoints, raced concurrently
    pub mirrors: Vec<String>,
    /// Per-attempt timeout for mirror requests
    pub timeout_ms: u64,
    /// Per-attempt timeout for the proxy request
    pub proxy_timeout_ms: u64,
    /// Extra proxy-then-mirrors rounds after the first one
    pub max_retries: usize,
    /// Pause between rounds
    pub retry_delay_ms: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            mirrors: DEFAULT_MIRRORS.iter().map(ToString::to_string).collect(),
            timeout_ms: 25_000,
            proxy_timeout_ms: 15_000,
            max_retries: 2,
            retry_delay_ms: 1_000,
            user_agent: concat!("safestreets/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    /// Checks that at least one endpoint is usable and limits are positive
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found
    pub fn validate(&self) -> Result<(), Error> {
        if self.mirrors.is_empty() && self.proxy_url.is_none() {
            return Err(Error::Config(
                "no proxy URL and no mirror endpoints configured".to_string(),
            ));
        }
        if self.timeout_ms == 0 || self.proxy_timeout_ms == 0 {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }

        for url in self.mirrors.iter().chain(self.proxy_url.iter()) {
            reqwest::Url::parse(url)
                .map_err(|e| Error::Config(format!("invalid endpoint URL '{url}': {e}")))?;
        }

        Ok(())
    }

    /// Full proxy endpoint URL, if a proxy is configured
    pub fn proxy_endpoint(&self) -> Option<String> {
        self.proxy_url
            .as_deref()
            .map(|base| format!("{}{PROXY_PATH}", base.trim_end_matches('/')))
    }

    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            max_retries: self.max_retries,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Per-call limits; both apply at once, whichever triggers first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub max_retries: usize,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchConfig::default().options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(FetchConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_config_without_endpoints() {
        let config = FetchConfig {
            mirrors: vec![],
            ..FetchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_malformed_mirror_url() {
        let config = FetchConfig {
            mirrors: vec!["not a url".to_string()],
            ..FetchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn proxy_endpoint_joins_path_once() {
        let config = FetchConfig {
            proxy_url: Some("http://localhost:8080/".to_string()),
            ..FetchConfig::default()
        };
        assert_eq!(
            config.proxy_endpoint().as_deref(),
            Some("http://localhost:8080/api/overpass")
        );
    }
}
