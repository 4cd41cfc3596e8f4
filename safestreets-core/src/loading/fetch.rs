//! Resilient retrieval of map elements from a proxy and a set of mirrors

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;
use tokio::task::JoinSet;

use super::config::{FetchConfig, FetchOptions};
use super::parser::ElementParser;
use super::raw::{OverpassResponse, ProxyRequest, ProxyResponse};
use crate::{Error, ParsedMapData, RawMapElement};

/// Anything that can answer a map query with raw elements
pub trait ElementSource: Send + Sync {
    /// Runs `query`, returning every element or an error; never a partial set
    fn fetch_elements(
        &self,
        query: &str,
        options: FetchOptions,
    ) -> impl Future<Output = Result<Vec<RawMapElement>, Error>> + Send;
}

/// Why a single proxy or mirror attempt failed
#[derive(Debug, Error)]
enum AttemptError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Malformed(String),
}

impl From<reqwest::Error> for AttemptError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Fetch client racing mirrors behind an optional caching proxy
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    config: Arc<FetchConfig>,
    parser: ElementParser,
}

impl FetchClient {
    /// Creates a client for the configured endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
            parser: ElementParser::default(),
        })
    }

    /// Replaces the parser used by [`FetchClient::execute`]
    #[must_use]
    pub fn with_parser(mut self, parser: ElementParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Runs `query` and parses the winning response
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] when every attempt failed
    pub async fn execute(&self, query: &str, options: FetchOptions) -> Result<ParsedMapData, Error> {
        let elements = self.fetch(query, options).await?;
        Ok(self.parser.parse(elements))
    }

    /// Races the mirrors only, skipping the proxy, and returns the winning
    /// response body as decoded. Used by the proxy itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] when every mirror failed in
    /// every round
    pub async fn mirror_response(
        &self,
        query: &str,
        options: FetchOptions,
    ) -> Result<OverpassResponse, Error> {
        self.fetch_response(query, options, false).await
    }

    async fn fetch(&self, query: &str, options: FetchOptions) -> Result<Vec<RawMapElement>, Error> {
        let response = self.fetch_response(query, options, true).await?;
        Ok(response.into_elements())
    }

    async fn fetch_response(
        &self,
        query: &str,
        options: FetchOptions,
        use_proxy: bool,
    ) -> Result<OverpassResponse, Error> {
        let started = Instant::now();
        let proxy_endpoint = self.config.proxy_endpoint().filter(|_| use_proxy);
        let query: Arc<str> = Arc::from(query);

        let mut attempts = 0;
        let mut last_error = String::from("no endpoints attempted");

        for round in 0..=options.max_retries {
            if round > 0 {
                debug!("Retrying map query, round {} of {}", round + 1, options.max_retries + 1);
                if self.config.retry_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
            }

            if let Some(endpoint) = &proxy_endpoint {
                attempts += 1;
                match self.query_proxy(endpoint, &query).await {
                    Ok(response) => {
                        info!(
                            "Proxy answered with {} elements in {} ms",
                            response.elements.len(),
                            started.elapsed().as_millis()
                        );
                        return Ok(response);
                    }
                    Err(e) => {
                        warn!("Proxy {endpoint} failed: {e}; falling back to mirrors");
                        last_error = format!("proxy {endpoint}: {e}");
                    }
                }
            }

            if self.config.mirrors.is_empty() {
                continue;
            }

            match self.race_mirrors(&query, options.timeout).await {
                Ok((mirror, response)) => {
                    info!(
                        "Mirror {mirror} answered with {} elements in {} ms",
                        response.elements.len(),
                        started.elapsed().as_millis()
                    );
                    return Ok(response);
                }
                Err(failures) => {
                    attempts += failures.len();
                    warn!(
                        "All {} mirrors failed in round {}",
                        failures.len(),
                        round + 1
                    );
                    if let Some((mirror, e)) = failures.last() {
                        last_error = format!("mirror {mirror}: {e}");
                    }
                }
            }
        }

        Err(Error::SourceUnavailable {
            attempts,
            last_error,
        })
    }

    async fn query_proxy(&self, endpoint: &str, query: &str) -> Result<OverpassResponse, AttemptError> {
        let timeout = Duration::from_millis(self.config.proxy_timeout_ms);
        let request = async {
            let response = self
                .http
                .post(endpoint)
                .json(&ProxyRequest {
                    query: query.to_string(),
                })
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(AttemptError::Status(status));
            }

            let body = response.bytes().await?;
            let decoded: ProxyResponse = serde_json::from_slice(&body)
                .map_err(|e| AttemptError::Malformed(format!("malformed proxy body: {e}")))?;
            decoded.data.check().map_err(AttemptError::Malformed)?;
            Ok::<_, AttemptError>(decoded.data)
        };

        tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| AttemptError::Timeout(timeout))?
    }

    /// Sends the query to every mirror at once; the first valid response
    /// wins and the remaining requests are aborted.
    async fn race_mirrors(
        &self,
        query: &Arc<str>,
        timeout: Duration,
    ) -> Result<(String, OverpassResponse), Vec<(String, AttemptError)>> {
        let mut in_flight = JoinSet::new();
        for mirror in &self.config.mirrors {
            let http = self.http.clone();
            let mirror = mirror.clone();
            let query = Arc::clone(query);
            in_flight.spawn(async move {
                let result = query_mirror(&http, &mirror, &query, timeout).await;
                (mirror, result)
            });
        }

        let mut failures = Vec::with_capacity(self.config.mirrors.len());
        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok((mirror, Ok(response))) => {
                    in_flight.abort_all();
                    return Ok((mirror, response));
                }
                Ok((mirror, Err(e))) => {
                    debug!("Mirror {mirror} failed: {e}");
                    failures.push((mirror, e));
                }
                Err(e) => failures.push((
                    "<task>".to_string(),
                    AttemptError::Transport(e.to_string()),
                )),
            }
        }

        Err(failures)
    }
}

async fn query_mirror(
    http: &reqwest::Client,
    mirror: &str,
    query: &str,
    timeout: Duration,
) -> Result<OverpassResponse, AttemptError> {
    let request = async {
        let response = http.post(mirror).form(&[("data", query)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        let body = response.bytes().await?;
        OverpassResponse::from_slice(&body).map_err(AttemptError::Malformed)
    };

    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| AttemptError::Timeout(timeout))?
}

impl ElementSource for FetchClient {
    async fn fetch_elements(
        &self,
        query: &str,
        options: FetchOptions,
    ) -> Result<Vec<RawMapElement>, Error> {
        self.fetch(query, options).await
    }
}
