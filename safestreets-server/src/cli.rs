use std::path::PathBuf;

use clap::Parser;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::server;

#[derive(Parser, Debug, Default)]
#[command(
    name = "safestreets-server",
    about = "Serve walkability analyses and the cached geodata proxy over HTTP",
    version
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short, env = "SAFESTREETS_CONFIG")]
    pub config: Option<PathBuf>,
    /// Backend proxy tried before the public mirrors
    #[arg(long, env = "SAFESTREETS_PROXY_URL")]
    pub proxy_url: Option<String>,
    /// Override the configured host
    #[arg(long, env = "SAFESTREETS_HOST")]
    pub host: Option<String>,
    /// Override the configured port
    #[arg(long, env = "SAFESTREETS_PORT")]
    pub port: Option<u16>,
    /// Log level or `EnvFilter` directive
    #[arg(long, env = "SAFESTREETS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Loads the configuration file and applies the command-line overrides
    pub fn into_config(self) -> Result<ServerConfig, ServerError> {
        let mut config = ServerConfig::load(self.config.as_deref())?;

        if let Some(proxy_url) = self.proxy_url {
            config.analysis.fetch.proxy_url = Some(proxy_url);
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }
}

pub(crate) async fn run() -> Result<(), ServerError> {
    let config = Cli::parse().into_config()?;
    server::run(config).await
}
