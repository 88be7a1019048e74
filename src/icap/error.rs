//! Probe error types.

use std::fmt;
use std::io;
use std::time::Duration;

/// Errors that can occur during a single ICAP round-trip.
#[derive(Debug)]
pub enum ProbeError {
    /// Name resolution failed.
    Resolve {
        /// `host:port` that was looked up.
        target: String,
        error: io::Error,
    },

    /// Name resolution returned no addresses.
    NoAddress { target: String },

    /// Every resolved address refused or failed the TCP connect.
    Connect { target: String, error: io::Error },

    /// Resolution plus connect did not finish within the connect deadline.
    ConnectTimeout { target: String, timeout: Duration },

    /// Fewer request bytes reached the socket than were serialized.
    ShortWrite {
        /// Bytes accepted by the socket.
        written: u64,
        /// Serialized request length.
        expected: usize,
    },

    /// Write, half-close or read failed mid-probe.
    Io(io::Error),

    /// The write/read phase exceeded the read deadline.
    ReadTimeout(Duration),

    /// The response exceeded the configured size cap.
    ResponseTooLarge { limit: u64 },

    /// The peer closed the connection without sending anything.
    EmptyResponse,

    /// The caller aborted the probe.
    Cancelled,
}

impl ProbeError {
    /// True for failures before a connection was established
    /// (DNS, refused connect, connect deadline).
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ProbeError::Resolve { .. }
                | ProbeError::NoAddress { .. }
                | ProbeError::Connect { .. }
                | ProbeError::ConnectTimeout { .. }
        )
    }

    /// True if a deadline fired.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ProbeError::ConnectTimeout { .. } | ProbeError::ReadTimeout(_)
        )
    }

    /// Short label for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Resolve { .. } | ProbeError::NoAddress { .. } => "resolve",
            ProbeError::Connect { .. } => "connect",
            ProbeError::ConnectTimeout { .. } => "connect_timeout",
            ProbeError::ShortWrite { .. } => "short_write",
            ProbeError::Io(_) => "io",
            ProbeError::ReadTimeout(_) => "read_timeout",
            ProbeError::ResponseTooLarge { .. } => "response_too_large",
            ProbeError::EmptyResponse => "empty_response",
            ProbeError::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Resolve { target, error } => {
                write!(f, "failed to resolve {}: {}", target, error)
            }
            ProbeError::NoAddress { target } => {
                write!(f, "no addresses found for {}", target)
            }
            ProbeError::Connect { target, error } => {
                write!(f, "failed to connect to {}: {}", target, error)
            }
            ProbeError::ConnectTimeout { target, timeout } => {
                write!(
                    f,
                    "connect to {} timed out after {}ms",
                    target,
                    timeout.as_millis()
                )
            }
            ProbeError::ShortWrite { written, expected } => {
                write!(
                    f,
                    "partial write of request: {}/{} bytes",
                    written, expected
                )
            }
            ProbeError::Io(e) => write!(f, "I/O error: {}", e),
            ProbeError::ReadTimeout(timeout) => {
                write!(f, "response not received within {}ms", timeout.as_millis())
            }
            ProbeError::ResponseTooLarge { limit } => {
                write!(f, "response exceeded {} bytes", limit)
            }
            ProbeError::EmptyResponse => write!(f, "empty response from icap-service"),
            ProbeError::Cancelled => write!(f, "probe cancelled"),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Resolve { error, .. } | ProbeError::Connect { error, .. } => Some(error),
            ProbeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProbeError {
    fn from(e: io::Error) -> Self {
        ProbeError::Io(e)
    }
}
