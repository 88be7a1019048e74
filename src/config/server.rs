//! Exporter HTTP server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use super::parse::{env_opt, env_parse, env_timeout, Env};
use super::ConfigError;

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:METRICS_PORT).
    pub listen_addr: SocketAddr,
    /// Deadline for receiving request headers.
    pub header_read_timeout: Duration,
    /// How long a new connection may stay silent before it is closed.
    pub idle_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// LISTEN_ADDR, when set, overrides METRICS_PORT.
    pub fn from_env(env: Env<'_>) -> Result<Self, ConfigError> {
        let listen_addr = match env_opt(env, "LISTEN_ADDR") {
            Some(addr) => addr.parse().map_err(|e| ConfigError::Parse {
                key: "LISTEN_ADDR".into(),
                value: addr.clone(),
                error: format!("{}", e),
            })?,
            None => {
                let port: u16 = env_parse(env, "METRICS_PORT", 8080)?;
                SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
            }
        };

        Ok(Self {
            listen_addr,
            header_read_timeout: env_timeout(env, "HEADER_READ_TIMEOUT", "5s")?,
            idle_timeout: env_timeout(env, "IDLE_TIMEOUT", "5m")?,
        })
    }
}
