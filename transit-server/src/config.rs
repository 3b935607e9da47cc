//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable naming the graph snapshot to serve.
pub const GRAPH_VAR: &str = "TRANSIT_GRAPH";

/// Environment variable holding the bind address.
pub const ADDR_VAR: &str = "TRANSIT_ADDR";

/// Environment variable capping the stop listing.
pub const STOPS_LIMIT_VAR: &str = "TRANSIT_STOPS_LIMIT";

/// Error reading the server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The bind address does not parse
    #[error("{}={value:?} is not a socket address", ADDR_VAR)]
    InvalidAddr { value: String },

    /// The stop listing limit is not a non-negative integer
    #[error("{}={value:?} is not a valid limit", STOPS_LIMIT_VAR)]
    InvalidStopsLimit { value: String },
}

/// Settings for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Path of the JSON graph snapshot
    pub graph_path: PathBuf,

    /// Address to listen on
    pub addr: SocketAddr,

    /// Maximum number of stops returned by `/get_all_stops`
    pub stops_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from("graph.json"),
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            stops_limit: 3000,
        }
    }
}

impl ServerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(GRAPH_VAR) {
            config.graph_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ADDR_VAR) {
            config.addr = value
                .parse()
                .map_err(|_| ConfigError::InvalidAddr { value })?;
        }
        if let Some(value) = lookup(STOPS_LIMIT_VAR) {
            config.stops_limit = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidStopsLimit { value })?;
        }

        Ok(config)
    }
}
