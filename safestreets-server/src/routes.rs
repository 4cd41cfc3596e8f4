use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use safestreets_core::loading::raw::{ProxyRequest, ProxyResponse};
use safestreets_core::scoring::{CrashHistory, Demographics, ExternalInputs};
use safestreets_core::{Location, WalkabilityReport};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::server::AppState;

pub(crate) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/api/analyze", post(analyze))
        .route("/api/overpass", post(overpass))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeRequest {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) city: Option<String>,
    #[serde(default)]
    pub(crate) country: Option<String>,
    #[serde(default)]
    pub(crate) demographics: Option<Demographics>,
    #[serde(default)]
    pub(crate) crash_history: Option<CrashHistory>,
}

impl AnalyzeRequest {
    fn into_parts(self) -> Result<(Location, ExternalInputs), ServerError> {
        let mut location = Location::new(self.lat, self.lon)?;
        if let Some(name) = self.name {
            location = location.with_name(name);
        }
        if let Some(city) = self.city {
            location = location.with_city(city);
        }
        if let Some(country) = self.country {
            location = location.with_country(country);
        }

        let external = ExternalInputs {
            demographics: self.demographics,
            crash_history: self.crash_history,
        };
        Ok((location, external))
    }
}

pub(crate) async fn healthcheck() -> &'static str {
    "OK"
}

pub(crate) async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<WalkabilityReport>, ServerError> {
    let (location, external) = request.into_parts()?;
    info!(location = %location.label(), "analysis requested");

    let report = state.analyzer.analyze(location, external).await;
    Ok(Json(report))
}

/// Geodata proxy: answers `{ query }` with `{ data }` from the mirrors,
/// caching successful responses by query text.
pub(crate) async fn overpass(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>, ServerError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ServerError::BadRequest("query must not be empty".to_string()));
    }

    if let Some(data) = state.cache.get(query).await {
        debug!(elements = data.elements.len(), "proxy cache hit");
        return Ok(Json(ProxyResponse { data }));
    }

    let data = state
        .analyzer
        .source()
        .mirror_response(query, state.fetch_options)
        .await?;

    info!(elements = data.elements.len(), "proxy fetched from mirrors");
    state.cache.insert(query.to_string(), data.clone()).await;
    Ok(Json(ProxyResponse { data }))
}
