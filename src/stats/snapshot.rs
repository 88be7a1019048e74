//! Counter groups and the per-cycle metrics snapshot.

use std::time::SystemTime;

use super::fields::{ServerField, WorkloadField};

/// Worker-pool counters. Missing fields stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerProcessCounters {
    pub children: u64,
    pub free: u64,
    pub used: u64,
    pub started: u64,
    pub closed: u64,
    pub crashed: u64,
    pub closing: u64,
}

impl ServerProcessCounters {
    pub fn get(&self, field: ServerField) -> u64 {
        match field {
            ServerField::Children => self.children,
            ServerField::Free => self.free,
            ServerField::Used => self.used,
            ServerField::Started => self.started,
            ServerField::Closed => self.closed,
            ServerField::Crashed => self.crashed,
            ServerField::Closing => self.closing,
        }
    }

    pub fn set(&mut self, field: ServerField, value: u64) {
        let slot = match field {
            ServerField::Children => &mut self.children,
            ServerField::Free => &mut self.free,
            ServerField::Used => &mut self.used,
            ServerField::Started => &mut self.started,
            ServerField::Closed => &mut self.closed,
            ServerField::Crashed => &mut self.crashed,
            ServerField::Closing => &mut self.closing,
        };
        *slot = value;
    }
}

/// Workload counters for one ICAP service. Byte fields are plain bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadCounters {
    pub reqmods: u64,
    pub respmods: u64,
    pub options: u64,
    pub allow204: u64,
    pub requests_scanned: u64,
    pub rebuild_failures: u64,
    pub rebuild_errors: u64,
    pub scan_rebuilt: u64,
    pub unprocessed: u64,
    pub unprocessable: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub http_bytes_in: u64,
    pub http_bytes_out: u64,
    pub body_bytes_in: u64,
    pub body_bytes_out: u64,
    pub body_bytes_scanned: u64,
}

impl WorkloadCounters {
    pub fn get(&self, field: WorkloadField) -> u64 {
        match field {
            WorkloadField::Reqmods => self.reqmods,
            WorkloadField::Respmods => self.respmods,
            WorkloadField::Options => self.options,
            WorkloadField::Allow204 => self.allow204,
            WorkloadField::RequestsScanned => self.requests_scanned,
            WorkloadField::RebuildFailures => self.rebuild_failures,
            WorkloadField::RebuildErrors => self.rebuild_errors,
            WorkloadField::ScanRebuilt => self.scan_rebuilt,
            WorkloadField::Unprocessed => self.unprocessed,
            WorkloadField::Unprocessable => self.unprocessable,
            WorkloadField::BytesIn => self.bytes_in,
            WorkloadField::BytesOut => self.bytes_out,
            WorkloadField::HttpBytesIn => self.http_bytes_in,
            WorkloadField::HttpBytesOut => self.http_bytes_out,
            WorkloadField::BodyBytesIn => self.body_bytes_in,
            WorkloadField::BodyBytesOut => self.body_bytes_out,
            WorkloadField::BodyBytesScanned => self.body_bytes_scanned,
        }
    }

    pub fn set(&mut self, field: WorkloadField, value: u64) {
        let slot = match field {
            WorkloadField::Reqmods => &mut self.reqmods,
            WorkloadField::Respmods => &mut self.respmods,
            WorkloadField::Options => &mut self.options,
            WorkloadField::Allow204 => &mut self.allow204,
            WorkloadField::RequestsScanned => &mut self.requests_scanned,
            WorkloadField::RebuildFailures => &mut self.rebuild_failures,
            WorkloadField::RebuildErrors => &mut self.rebuild_errors,
            WorkloadField::ScanRebuilt => &mut self.scan_rebuilt,
            WorkloadField::Unprocessed => &mut self.unprocessed,
            WorkloadField::Unprocessable => &mut self.unprocessable,
            WorkloadField::BytesIn => &mut self.bytes_in,
            WorkloadField::BytesOut => &mut self.bytes_out,
            WorkloadField::HttpBytesIn => &mut self.http_bytes_in,
            WorkloadField::HttpBytesOut => &mut self.http_bytes_out,
            WorkloadField::BodyBytesIn => &mut self.body_bytes_in,
            WorkloadField::BodyBytesOut => &mut self.body_bytes_out,
            WorkloadField::BodyBytesScanned => &mut self.body_bytes_scanned,
        };
        *slot = value;
    }
}

/// Counters from one collection cycle. Immutable once built and never cached.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    server: ServerProcessCounters,
    workload: WorkloadCounters,
    collected_at: SystemTime,
}

impl MetricsSnapshot {
    /// Stamp the counters with the current time.
    pub fn new(server: ServerProcessCounters, workload: WorkloadCounters) -> Self {
        Self::at(server, workload, SystemTime::now())
    }

    pub fn at(
        server: ServerProcessCounters,
        workload: WorkloadCounters,
        collected_at: SystemTime,
    ) -> Self {
        Self {
            server,
            workload,
            collected_at,
        }
    }

    pub fn server(&self) -> &ServerProcessCounters {
        &self.server
    }

    pub fn workload(&self) -> &WorkloadCounters {
        &self.workload
    }

    pub fn collected_at(&self) -> SystemTime {
        self.collected_at
    }

    /// True if both counter groups match, ignoring the collection time.
    pub fn same_counters(&self, other: &MetricsSnapshot) -> bool {
        self.server == other.server && self.workload == other.workload
    }
}
