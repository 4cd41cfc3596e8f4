//! HTTP service around the walkability engine: the analysis endpoint, the
//! cached geodata proxy and a health probe.

mod cache;
mod cli;
pub mod config;
mod error;
mod routes;
mod server;
mod telemetry;

pub use cache::TtlCache;
pub use cli::Cli;
pub use config::{CacheConfig, ServerConfig};
pub use error::ServerError;
pub use server::{AppState, router};

pub async fn run() -> Result<(), ServerError> {
    cli::run().await
}
