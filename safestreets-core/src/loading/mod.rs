//! This module is responsible for retrieving map data from geodata services
//! and normalizing it into a parsed snapshot with a street network.

mod config;
mod fetch;
pub mod network;
mod parser;
mod query;
pub mod raw;

pub use config::{DEFAULT_MIRRORS, FetchConfig, FetchOptions, PROXY_PATH};
pub use fetch::{ElementSource, FetchClient};
pub use network::build_network_graph;
pub use parser::ElementParser;
pub use query::QueryBuilder;
