//! Health status types for the liveness and readiness endpoints.

use serde::Serialize;

/// Health check probe types (Kubernetes-compatible).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeType {
    /// Liveness probe: restart container if failed.
    Liveness,
    /// Readiness probe: remove from load balancer if failed.
    Readiness,
}

impl std::fmt::Display for ProbeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Liveness => write!(f, "liveness"),
            Self::Readiness => write!(f, "readiness"),
        }
    }
}

/// Health status response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: &'static str,
    /// Human-readable availability message
    pub message: String,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Probe target and exporter details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

impl HealthStatus {
    /// Create a healthy status.
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: "healthy",
            message: message.into(),
            checks: Vec::new(),
            details: None,
        }
    }

    /// Create an unhealthy status with a message.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy",
            message: message.into(),
            checks: Vec::new(),
            details: None,
        }
    }

    /// Add a check result.
    pub fn with_check(mut self, check: CheckResult) -> Self {
        self.checks.push(check);
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: HealthDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns true if status is healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Individual health check result.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Check name: "icap_connect", "icap_response" or "icap_status"
    pub name: &'static str,
    /// Check status: "pass" or "fail"
    pub status: &'static str,
    /// Optional message with details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

impl CheckResult {
    /// Create a passing check.
    pub fn pass(name: &'static str, duration_ms: u64) -> Self {
        Self {
            name,
            status: "pass",
            message: None,
            duration_ms,
        }
    }

    /// Create a failing check with a message.
    pub fn fail(name: &'static str, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name,
            status: "fail",
            message: Some(message.into()),
            duration_ms,
        }
    }

    /// Returns true if check passed.
    pub fn is_pass(&self) -> bool {
        self.status == "pass"
    }
}

/// Details included in every health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthDetails {
    /// Probed ICAP service (`host:port`)
    pub target: String,
    /// Status code from the OPTIONS response, if one was read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icap_status: Option<u16>,
    /// Exporter version
    pub version: &'static str,
    /// Exporter uptime in seconds
    pub uptime_seconds: u64,
}
