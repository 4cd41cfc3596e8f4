use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Installs the global subscriber; `RUST_LOG` wins over `log_level`.
///
/// Records emitted through the `log` facade by the core crate are forwarded
/// to the same subscriber.
pub fn init(log_level: &str) -> Result<(), ServerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|e| {
            ServerError::Telemetry(format!("invalid log level/filter '{log_level}': {e}"))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| ServerError::Telemetry(e.to_string()))
}
