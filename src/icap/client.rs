//! One-shot ICAP round-trips over a dedicated TCP connection.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{IcapStatus, ProbeError, ProbeRequest, ProbeTarget, RequestBuilder};

/// Default connect deadline.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default deadline for the write/read phase.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on the bytes read from one response (1 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

/// Raw bytes returned by one round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    bytes: Vec<u8>,
}

impl ProbeResponse {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Response as text, invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Status code from the status line.
    pub fn status(&self) -> IcapStatus {
        IcapStatus::parse(&self.bytes)
    }

    /// Fails with [`ProbeError::EmptyResponse`] if nothing was received.
    pub fn require_non_empty(self) -> Result<Self, ProbeError> {
        if self.bytes.is_empty() {
            Err(ProbeError::EmptyResponse)
        } else {
            Ok(self)
        }
    }
}

/// ICAP client performing single-attempt probes.
///
/// Each call opens its own connection, writes the request, half-closes the
/// write side and reads until the peer closes. Connections are never reused
/// and no call retries.
#[derive(Debug, Clone)]
pub struct IcapClient {
    builder: RequestBuilder,
    connect_timeout: Duration,
    read_timeout: Duration,
    max_response_bytes: u64,
}

impl Default for IcapClient {
    fn default() -> Self {
        Self::new(RequestBuilder::new())
    }
}

impl IcapClient {
    pub fn new(builder: RequestBuilder) -> Self {
        Self {
            builder,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Set the connect deadline (resolution + TCP connect).
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the deadline for writing the request and reading the full response.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the largest response accepted before the probe fails.
    pub fn with_max_response_bytes(mut self, limit: u64) -> Self {
        self.max_response_bytes = limit;
        self
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Send an `OPTIONS` probe for `service`.
    pub async fn probe_capability(
        &self,
        target: &ProbeTarget,
        service: &str,
        cancel: &CancellationToken,
    ) -> Result<ProbeResponse, ProbeError> {
        let request = self.builder.capability(target, service);
        self.round_trip(&request, cancel).await
    }

    /// Send a `REQMOD` probe for `service` with an embedded HTTP request.
    pub async fn probe_work(
        &self,
        target: &ProbeTarget,
        service: &str,
        cancel: &CancellationToken,
    ) -> Result<ProbeResponse, ProbeError> {
        let request = self
            .builder
            .work_simulation(target, service, OffsetDateTime::now_utc());
        self.round_trip(&request, cancel).await
    }

    /// Run a prepared request. Cancellation drops the connection and discards
    /// anything already read.
    pub async fn round_trip(
        &self,
        request: &ProbeRequest,
        cancel: &CancellationToken,
    ) -> Result<ProbeResponse, ProbeError> {
        let kind = request.kind();
        let target = request.target();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProbeError::Cancelled),
            result = self.exchange(request) => result,
        };

        match &result {
            Ok(response) => debug!(
                target: "probe",
                kind = %kind,
                target_addr = %target,
                bytes = response.len(),
                "Received ICAP response"
            ),
            Err(e) => warn!(
                target: "probe",
                kind = %kind,
                target_addr = %target,
                error = %e,
                "ICAP probe failed"
            ),
        }

        result
    }

    async fn exchange(&self, request: &ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        let mut stream = self.connect(request.target()).await?;

        let exchange = send_and_receive(&mut stream, request, self.max_response_bytes);
        match tokio::time::timeout(self.read_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::ReadTimeout(self.read_timeout)),
        }
    }

    async fn connect(&self, target: &ProbeTarget) -> Result<TcpStream, ProbeError> {
        match tokio::time::timeout(self.connect_timeout, connect_any(target)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::ConnectTimeout {
                target: target.host_port(),
                timeout: self.connect_timeout,
            }),
        }
    }
}

/// Resolve `target` and connect to the first address that accepts.
async fn connect_any(target: &ProbeTarget) -> Result<TcpStream, ProbeError> {
    let host = target.host.trim_start_matches('[').trim_end_matches(']');
    let addrs: Vec<SocketAddr> = lookup_host((host, target.port))
        .await
        .map_err(|error| ProbeError::Resolve {
            target: target.host_port(),
            error,
        })?
        .collect();

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                debug!(target: "probe", addr = %addr, "Connected to icap-service");
                return Ok(stream);
            }
            Err(error) => {
                debug!(target: "probe", addr = %addr, error = %error, "Connect attempt failed");
                last_error = Some(error);
            }
        }
    }

    match last_error {
        Some(error) => Err(ProbeError::Connect {
            target: target.host_port(),
            error,
        }),
        None => Err(ProbeError::NoAddress {
            target: target.host_port(),
        }),
    }
}

/// Write the request, half-close, then read until EOF or `limit` bytes.
async fn send_and_receive<S>(
    stream: &mut S,
    request: &ProbeRequest,
    limit: u64,
) -> Result<ProbeResponse, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!(
        target: "probe",
        kind = %request.kind(),
        method = request.kind().method(),
        bytes = request.len(),
        "Sending ICAP request"
    );

    let mut payload = request.as_bytes();
    let written = tokio::io::copy(&mut payload, stream).await?;
    if written != request.len() as u64 {
        return Err(ProbeError::ShortWrite {
            written,
            expected: request.len(),
        });
    }

    stream.shutdown().await?;

    // One byte past the limit tells an oversized response from one that fits.
    let mut buf = Vec::with_capacity(4096);
    (&mut *stream)
        .take(limit.saturating_add(1))
        .read_to_end(&mut buf)
        .await?;
    if buf.len() as u64 > limit {
        return Err(ProbeError::ResponseTooLarge { limit });
    }

    Ok(ProbeResponse::new(buf))
}
