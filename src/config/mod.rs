//! Configuration module for icap_exporter.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use icap_exporter::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("ICAP target: {}:{}", config.icap.host, config.icap.port);
//! ```

mod error;
mod icap;
mod logging;
mod parse;
mod server;

pub use error::ConfigError;
pub use icap::IcapConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::{parse_duration, process_env, Env};
pub use server::ServerConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Probed ICAP service.
    pub icap: IcapConfig,
    /// Exporter HTTP server.
    pub server: ServerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(env: Env<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            icap: IcapConfig::from_env(env)?,
            server: ServerConfig::from_env(env)?,
            logging: LoggingConfig::from_env(env)?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  ICAP target: {}", self.icap.target());
        info!("  Statistics service: {}", self.icap.service);
        info!("  Health service: {}", self.icap.options_service);
        info!("  Workload labels: Service {}", self.icap.stats_service);
        info!(
            "  Timeouts: connect {:?}, read {:?}, header read {:?}, idle {:?}",
            self.icap.connect_timeout,
            self.icap.read_timeout,
            self.server.header_read_timeout,
            self.server.idle_timeout
        );
        info!("  Log format: {:?}", self.logging.format);
    }
}
