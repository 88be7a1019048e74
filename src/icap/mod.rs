//! ICAP probe protocol.
//!
//! Builds the two probe requests the ICAP service understands, runs them over
//! a dedicated TCP connection and exposes the raw response plus its status.
//!
//! # Example
//!
//! ```rust,ignore
//! use icap_exporter::icap::{IcapClient, ProbeTarget};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = IcapClient::default();
//! let target = ProbeTarget::new("localhost", 1344);
//! let response = client
//!     .probe_capability(&target, "gw_rebuild", &CancellationToken::new())
//!     .await?;
//! assert!(response.status().is_ok());
//! ```

mod client;
mod error;
mod request;
mod status;

pub use client::{
    IcapClient, ProbeResponse, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_RESPONSE_BYTES,
    DEFAULT_READ_TIMEOUT,
};
pub use error::ProbeError;
pub use request::{
    format_date, ProbeKind, ProbeRequest, ProbeTarget, RequestBuilder, DEFAULT_HTTP_USER_AGENT,
    DEFAULT_ICAP_USER_AGENT, ICAP_SCHEME, ICAP_VERSION,
};
pub use status::IcapStatus;
