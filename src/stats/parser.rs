//! Statistics page parser.
//!
//! Each field is looked up on its own: find the first occurrence of its
//! label, read the value that follows. A missing label or unreadable value
//! leaves that counter at zero and does not affect any other counter.

use tracing::debug;

use super::fields::{FieldTable, Unit, KILOBYTE};
use super::snapshot::{ServerProcessCounters, WorkloadCounters};

/// Parser for the ICAP statistics response.
#[derive(Debug, Clone)]
pub struct StatisticsParser {
    table: FieldTable,
}

impl StatisticsParser {
    /// Create a parser for the workload counters of `service`.
    pub fn new(service: &str) -> Self {
        Self {
            table: FieldTable::new(service),
        }
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Extract worker-pool counters.
    pub fn parse_server_process_counters(&self, raw: &[u8]) -> ServerProcessCounters {
        let text = String::from_utf8_lossy(raw);
        let mut counters = ServerProcessCounters::default();

        for rule in self.table.server() {
            match extract(&text, &rule.anchor, rule.unit) {
                Some(value) => counters.set(rule.field, value),
                None => debug!(field = ?rule.field, anchor = %rule.anchor, "Statistics field missing"),
            }
        }

        counters
    }

    /// Extract workload counters.
    pub fn parse_workload_counters(&self, raw: &[u8]) -> WorkloadCounters {
        let text = String::from_utf8_lossy(raw);
        let mut counters = WorkloadCounters::default();

        for rule in self.table.workload() {
            match extract(&text, &rule.anchor, rule.unit) {
                Some(value) => counters.set(rule.field, value),
                None => debug!(field = ?rule.field, anchor = %rule.anchor, "Statistics field missing"),
            }
        }

        counters
    }
}

/// Read the value following the first occurrence of `anchor`.
pub fn extract(text: &str, anchor: &str, unit: Unit) -> Option<u64> {
    let start = text.find(anchor)? + anchor.len();
    let rest = &text[start..];

    match unit {
        Unit::Count => leading_integer(rest).map(|(value, _)| value),
        Unit::KilobytesAndBytes => {
            let (kbs, rest) = leading_integer(rest)?;
            let rest = expect_word(rest, "Kbs")?;
            let (bytes, rest) = leading_integer(rest)?;
            expect_word(rest, "bytes")?;
            kbs.checked_mul(KILOBYTE)?.checked_add(bytes)
        }
    }
}

/// Parse an unsigned integer after optional spaces/tabs.
fn leading_integer(s: &str) -> Option<(u64, &str)> {
    let s = s.trim_start_matches([' ', '\t']);
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

fn expect_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    s.trim_start_matches([' ', '\t']).strip_prefix(word)
}
