//! Health checks for Kubernetes probes.
//!
//! Both probe types send an ICAP `OPTIONS` request and report the service as
//! available only when it answers `200`:
//! - **Liveness**: `/health/live`
//! - **Readiness**: `/health/readiness`
//!
//! # Kubernetes Integration
//!
//! ```yaml
//! livenessProbe:
//!   httpGet:
//!     path: /health/live
//!     port: 8080
//!   periodSeconds: 10
//!
//! readinessProbe:
//!   httpGet:
//!     path: /health/readiness
//!     port: 8080
//!   periodSeconds: 5
//! ```

mod checker;
mod status;

pub use checker::{HealthChecker, HealthVerdict, AVAILABLE_MESSAGE, UNAVAILABLE_MESSAGE};
pub use status::{CheckResult, HealthDetails, HealthStatus, ProbeType};
