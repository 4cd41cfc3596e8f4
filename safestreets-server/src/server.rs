use std::sync::Arc;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use safestreets_core::loading::raw::OverpassResponse;
use safestreets_core::{Analyzer, FetchOptions};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cache::TtlCache;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::routes::routes;
use crate::telemetry;

/// Shared state of every handler
pub struct AppState {
    pub analyzer: Analyzer,
    pub cache: TtlCache<OverpassResponse>,
    pub fetch_options: FetchOptions,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        Ok(Self {
            analyzer: Analyzer::new(config.analysis.clone())?,
            cache: TtlCache::new(config.cache.ttl(), config.cache.capacity),
            fetch_options: config.analysis.fetch_options(),
        })
    }
}

/// Builds the application with its timeout, concurrency, tracing and CORS
/// layers
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let limits = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(GlobalConcurrencyLimitLayer::new(config.concurrency_limit));

    routes()
        .layer(limits)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled internal error: {err}"),
        )
    }
}

pub(crate) async fn run(config: ServerConfig) -> Result<(), ServerError> {
    telemetry::init(&config.log_level)?;

    let state = Arc::new(AppState::new(&config)?);
    let app = router(state, &config);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        %addr,
        radius_m = config.analysis.radius_m,
        mirrors = config.analysis.fetch.mirrors.len(),
        proxy = config.analysis.fetch.proxy_url.as_deref().unwrap_or("none"),
        "walkability service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
