//! Health evaluation against the ICAP service.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};
use uuid::Uuid;

use super::{CheckResult, HealthDetails, HealthStatus, ProbeType};
use crate::icap::{IcapClient, IcapStatus, ProbeError, ProbeTarget};

/// Message returned when the service answered `200`.
pub const AVAILABLE_MESSAGE: &str = "icap-service is available";

/// Message returned for any failure.
pub const UNAVAILABLE_MESSAGE: &str = "icap-service is not available";

/// Outcome of one capability probe.
#[derive(Debug)]
pub struct HealthVerdict {
    /// True only for a non-empty response with status `200`.
    pub alive: bool,
    /// Status read from the response; `None` if no response was read.
    pub status: Option<IcapStatus>,
    /// Transport failure or empty response. `None` for a non-200 status.
    pub cause: Option<ProbeError>,
    /// Wall time of the probe.
    pub duration: Duration,
}

/// Evaluates ICAP service health with an `OPTIONS` probe.
///
/// Liveness and readiness run the same probe; the service either answers
/// `200` or it is unavailable.
#[derive(Debug, Clone)]
pub struct HealthChecker {
    client: IcapClient,
    target: ProbeTarget,
    service: String,
    /// Exporter start time for uptime calculation
    start_time: Instant,
}

impl HealthChecker {
    /// Create a checker probing `service` on `target`.
    pub fn new(client: IcapClient, target: ProbeTarget, service: impl Into<String>) -> Self {
        Self {
            client,
            target,
            service: service.into(),
            start_time: Instant::now(),
        }
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    /// Run the capability probe and reduce the result to a verdict.
    pub async fn evaluate(&self, cancel: &CancellationToken) -> HealthVerdict {
        let span = tracing::info_span!(
            "health",
            probe_id = %Uuid::new_v4(),
            target = %self.target,
            service = %self.service,
        );

        async {
            let start = Instant::now();
            let result = self
                .client
                .probe_capability(&self.target, &self.service, cancel)
                .await
                .and_then(|response| response.require_non_empty());

            let verdict = match result {
                Ok(response) => {
                    let status = response.status();
                    HealthVerdict {
                        alive: status.is_ok(),
                        status: Some(status),
                        cause: None,
                        duration: start.elapsed(),
                    }
                }
                Err(cause) => HealthVerdict {
                    alive: false,
                    status: None,
                    cause: Some(cause),
                    duration: start.elapsed(),
                },
            };

            debug!(
                alive = verdict.alive,
                status = ?verdict.status,
                elapsed_ms = verdict.duration.as_millis() as u64,
                "Health probe finished"
            );

            verdict
        }
        .instrument(span)
        .await
    }

    /// Perform health check for an endpoint.
    pub async fn check(&self, probe: ProbeType, cancel: &CancellationToken) -> HealthStatus {
        let verdict = self.evaluate(cancel).await;
        let duration_ms = verdict.duration.as_millis() as u64;

        debug!(probe = %probe, alive = verdict.alive, "Health check");

        let mut status = if verdict.alive {
            HealthStatus::healthy(AVAILABLE_MESSAGE)
        } else {
            HealthStatus::unhealthy(UNAVAILABLE_MESSAGE)
        };

        // Failures after the connection was established belong to `icap_response`.
        status = match &verdict.cause {
            Some(cause) if cause.is_connection_error() => status.with_check(CheckResult::fail(
                "icap_connect",
                cause.to_string(),
                duration_ms,
            )),
            Some(cause) => status
                .with_check(CheckResult::pass("icap_connect", duration_ms))
                .with_check(CheckResult::fail(
                    "icap_response",
                    cause.to_string(),
                    duration_ms,
                )),
            None => status.with_check(CheckResult::pass("icap_connect", duration_ms)),
        };

        if let Some(icap_status) = verdict.status {
            let status_check = if icap_status.is_ok() {
                CheckResult::pass("icap_status", duration_ms)
            } else {
                CheckResult::fail(
                    "icap_status",
                    format!("unexpected ICAP status {}", icap_status),
                    duration_ms,
                )
            };
            status = status.with_check(status_check);
        }

        status.with_details(HealthDetails {
            target: self.target.host_port(),
            icap_status: verdict.status.and_then(|s| s.code()),
            version: crate::VERSION,
            uptime_seconds: self.uptime().as_secs(),
        })
    }

    /// Get exporter uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
