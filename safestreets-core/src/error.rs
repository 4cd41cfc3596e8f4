use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("All sources exhausted after {attempts} attempts: {last_error}")]
    SourceUnavailable { attempts: usize, last_error: String },
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
}
