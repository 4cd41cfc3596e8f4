use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use safestreets_core::AnalysisConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Top-level configuration of the HTTP service, read from TOML.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Upper bound on the time spent answering one request
    pub request_timeout_secs: u64,
    /// Requests processed at once across all routes
    pub concurrency_limit: usize,
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            request_timeout_secs: 120,
            concurrency_limit: 32,
            cache: CacheConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Proxy response cache limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 60,
            capacity: 256,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl ServerConfig {
    /// Reads `path` if given, otherwise starts from the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ServerError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.request_timeout_secs == 0 {
            return Err(ServerError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.concurrency_limit == 0 {
            return Err(ServerError::Config(
                "concurrency_limit must be positive".to_string(),
            ));
        }
        self.analysis
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(|_| {
            ServerError::Config(format!(
                "host '{}' must be an IPv4 or IPv6 address",
                self.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn nested_sections_override_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            port = 9000
            [cache]
            ttl_secs = 60

            [analysis]
            radius_m = 800

            [analysis.fetch]
            proxy_url = "http://localhost:9000"
            timeout_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.capacity, 256);
        assert_eq!(config.analysis.radius_m, 800);
        assert_eq!(config.analysis.fetch.timeout_ms, 5000);
        assert!(!config.analysis.fetch.mirrors.is_empty());
    }

    #[test]
    fn example_file_is_valid() {
        let config =
            ServerConfig::from_toml_str(include_str!("../safestreets.example.toml")).unwrap();
        assert_eq!(config.analysis.tiers.fair_m, 1200.0);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn rejects_invalid_analysis_section() {
        let result = ServerConfig::from_toml_str("[analysis]\nradius_m = 0\n");
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn rejects_unparseable_toml() {
        let result = ServerConfig::from_toml_str("port = \"eighty\"");
        assert!(matches!(result, Err(ServerError::ConfigSyntax(_))));
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            config.socket_addr().unwrap(),
            SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080)
        );
    }
}
