//! ICAP request serialization.
//!
//! Two request shapes are produced:
//!
//! - `OPTIONS` capability probe with `Encapsulated: null-body=0`.
//! - `REQMOD` work probe followed on the same connection by a minimal
//!   HTTP request. The `null-body` offset in the REQMOD `Encapsulated`
//!   header is the serialized length of that HTTP request, computed from
//!   the bytes actually written.

use std::fmt;

use time::macros::format_description;
use time::OffsetDateTime;

/// Protocol/version token on request and status lines.
pub const ICAP_VERSION: &str = "ICAP/1.0";

/// URI scheme of ICAP service URLs.
pub const ICAP_SCHEME: &str = "icap";

/// Default `User-Agent` on ICAP requests.
pub const DEFAULT_ICAP_USER_AGENT: &str = "C-ICAP-Client-Library/0.5.6";

/// Default `User-Agent` on the embedded HTTP request.
pub const DEFAULT_HTTP_USER_AGENT: &str = "C-ICAP-Client/x.xx";

/// Kind of probe a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// `OPTIONS` request, used for health.
    Capability,
    /// `REQMOD` request with an embedded HTTP request, used for statistics.
    WorkSimulation,
}

impl ProbeKind {
    /// ICAP method for this probe.
    pub fn method(self) -> &'static str {
        match self {
            Self::Capability => "OPTIONS",
            Self::WorkSimulation => "REQMOD",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capability => write!(f, "capability"),
            Self::WorkSimulation => write!(f, "work_simulation"),
        }
    }
}

/// Address of the probed ICAP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn host_port(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host_port())
    }
}

/// A fully serialized probe request. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    kind: ProbeKind,
    target: ProbeTarget,
    service: String,
    bytes: Vec<u8>,
}

impl ProbeRequest {
    pub fn kind(&self) -> ProbeKind {
        self.kind
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Wire bytes, including the embedded HTTP request for REQMOD.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds probe requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    icap_user_agent: String,
    http_user_agent: String,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            icap_user_agent: DEFAULT_ICAP_USER_AGENT.to_string(),
            http_user_agent: DEFAULT_HTTP_USER_AGENT.to_string(),
        }
    }

    /// Set the `User-Agent` sent on ICAP requests.
    pub fn with_icap_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.icap_user_agent = agent.into();
        self
    }

    /// Set the `User-Agent` sent on the embedded HTTP request.
    pub fn with_http_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.http_user_agent = agent.into();
        self
    }

    /// Capability-discovery (`OPTIONS`) request.
    pub fn capability(&self, target: &ProbeTarget, service: &str) -> ProbeRequest {
        let bytes = self.icap_head(ProbeKind::Capability, target, service, "null-body=0");

        ProbeRequest {
            kind: ProbeKind::Capability,
            target: target.clone(),
            service: service.to_string(),
            bytes,
        }
    }

    /// Work-simulation (`REQMOD`) request followed by the embedded HTTP request.
    pub fn work_simulation(
        &self,
        target: &ProbeTarget,
        service: &str,
        date: OffsetDateTime,
    ) -> ProbeRequest {
        let http = self.http_request(date);
        let encapsulated = format!("req-hdr=0, null-body={}", http.len());

        let mut bytes = self.icap_head(ProbeKind::WorkSimulation, target, service, &encapsulated);
        bytes.extend_from_slice(&http);

        ProbeRequest {
            kind: ProbeKind::WorkSimulation,
            target: target.clone(),
            service: service.to_string(),
            bytes,
        }
    }

    /// The minimal HTTP request embedded in a REQMOD probe.
    pub fn http_request(&self, date: OffsetDateTime) -> Vec<u8> {
        let mut req = String::with_capacity(96);
        req.push_str("GET any HTTP/1.0\r\n");
        req.push_str(&format!("Date: {}\r\n", format_date(date)));
        req.push_str(&format!("User-Agent: {}\r\n", self.http_user_agent));
        req.push_str("\r\n");
        req.into_bytes()
    }

    fn icap_head(
        &self,
        kind: ProbeKind,
        target: &ProbeTarget,
        service: &str,
        encapsulated: &str,
    ) -> Vec<u8> {
        let host_port = target.host_port();
        let service = service.trim_start_matches('/');

        let mut req = String::with_capacity(160);
        req.push_str(&format!(
            "{} {}://{}/{} {}\r\n",
            kind.method(),
            ICAP_SCHEME,
            host_port,
            service,
            ICAP_VERSION
        ));
        req.push_str(&format!("Host: {}\r\n", host_port));
        req.push_str(&format!("User-Agent: {}\r\n", self.icap_user_agent));
        req.push_str(&format!("Encapsulated: {}\r\n", encapsulated));
        req.push_str("\r\n");
        req.into_bytes()
    }
}

/// Format a timestamp as `Mon Jan 02 15:04:05 2006` (UTC).
pub fn format_date(date: OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [year]"
    );
    // OffsetDateTime carries every component the description asks for.
    date.to_offset(time::UtcOffset::UTC)
        .format(format)
        .unwrap_or_default()
}
