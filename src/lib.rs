//! icap_exporter - Prometheus exporter for c-icap services.
//!
//! This crate probes an ICAP service over its own wire protocol, extracts
//! worker-pool and per-service counters from the statistics page and serves
//! them as Prometheus gauges alongside liveness and readiness endpoints.
//!
//! # Features
//!
//! - **One-shot probes**: Each scrape opens its own connection, with connect
//!   and read deadlines and cancellation
//! - **Field-tolerant parsing**: A missing or malformed counter reads as zero
//!   without affecting the rest
//! - **Fail-closed metrics**: A failed collection exposes no ICAP gauges
//! - **Structured Logging**: Text or JSON output via tracing
//!
//! # Example
//!
//! ```rust,ignore
//! use icap_exporter::{Config, ExporterServer};
//!
//! let config = Config::from_env()?;
//! let server = ExporterServer::new(&config)?;
//! server.run().await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix, empty if unknown
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 ()"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod collector;
pub mod config;
pub mod health;
pub mod icap;
pub mod logging;
pub mod observability;
pub mod server;
pub mod stats;

// Re-exports for convenience
pub use collector::{CollectionError, IcapCollector};
pub use config::Config;
pub use server::ExporterServer;
