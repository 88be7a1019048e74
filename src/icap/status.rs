//! ICAP status-line parsing.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Status-line pattern (compiled once).
static STATUS_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn status_line_regex() -> &'static Regex {
    STATUS_LINE_REGEX
        .get_or_init(|| Regex::new(r"^ICAP/1\.0\s+(\d{1,3})(?:\s|$)").expect("Invalid regex"))
}

/// Status code carried by an ICAP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcapStatus {
    /// Code parsed from the status line.
    Code(u16),
    /// No status line matched. Never healthy.
    Unknown,
}

impl IcapStatus {
    /// Extract the status code from the first line of a raw response.
    pub fn parse(raw: &[u8]) -> Self {
        let line_end = raw.iter().position(|&b| b == b'\n').unwrap_or(raw.len());
        let line = String::from_utf8_lossy(&raw[..line_end]);
        let line = line.trim_end_matches('\r');

        status_line_regex()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .map(IcapStatus::Code)
            .unwrap_or(IcapStatus::Unknown)
    }

    /// True only for `200`.
    pub fn is_ok(&self) -> bool {
        matches!(self, IcapStatus::Code(200))
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            IcapStatus::Code(code) => Some(*code),
            IcapStatus::Unknown => None,
        }
    }
}

impl fmt::Display for IcapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcapStatus::Code(code) => write!(f, "{}", code),
            IcapStatus::Unknown => write!(f, "unknown"),
        }
    }
}
