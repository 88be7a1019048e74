//! Observability module: Prometheus metrics export.
//!
//! # Usage
//!
//! ```rust,ignore
//! use icap_exporter::observability::{ExporterMetrics, RESULT_SUCCESS};
//!
//! let metrics = ExporterMetrics::new()?;
//! metrics.record_scrape(RESULT_SUCCESS, 0.05);
//! println!("{}", metrics.render(Some(&snapshot))?);
//! ```

pub mod metrics;

// Re-exports
pub use metrics::{snapshot_registry, ExporterMetrics, RESULT_SUCCESS};
