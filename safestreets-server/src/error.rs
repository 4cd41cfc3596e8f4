use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to read configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    ConfigSyntax(#[from] toml::de::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("telemetry error: {0}")]
    Telemetry(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("upstream unavailable: {0}")]
    Upstream(safestreets_core::Error),
    #[error(transparent)]
    Core(safestreets_core::Error),
}

impl From<safestreets_core::Error> for ServerError {
    fn from(e: safestreets_core::Error) -> Self {
        use safestreets_core::Error as CoreError;
        match e {
            CoreError::InvalidLocation(msg) => Self::BadRequest(msg),
            e @ CoreError::SourceUnavailable { .. } => Self::Upstream(e),
            e => Self::Core(e),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigFile { .. }
            | Self::ConfigSyntax(_)
            | Self::Config(_)
            | Self::Telemetry(_)
            | Self::Io(_)
            | Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_core_errors_to_statuses() {
        let invalid: ServerError =
            safestreets_core::Error::InvalidLocation("latitude 95 out of range".to_string()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let exhausted: ServerError = safestreets_core::Error::SourceUnavailable {
            attempts: 4,
            last_error: "mirror: HTTP status 429".to_string(),
        }
        .into();
        assert_eq!(exhausted.status(), StatusCode::BAD_GATEWAY);

        let config: ServerError = safestreets_core::Error::Config("no mirrors".to_string()).into();
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
