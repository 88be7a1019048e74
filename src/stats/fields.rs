//! Field table for the ICAP statistics page.
//!
//! Every counter is described by a label that precedes its value in the
//! response text, an extraction rule ([`Unit`]) and its exported metric name.
//! The table is built once from configuration and only read afterwards.

/// Multiplier applied to the kilobyte part of byte counters.
///
/// The statistics page prints `<N> Kbs <M> bytes`; `N` is taken as binary
/// kilobytes. The text alone does not say whether 1000 was meant.
pub const KILOBYTE: u64 = 1024;

/// How the value following a label is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// A single integer.
    Count,
    /// `<N> Kbs <M> bytes`, combined as `N * KILOBYTE + M`.
    KilobytesAndBytes,
}

/// Server-process (worker pool) counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerField {
    Children,
    Free,
    Used,
    Started,
    Closed,
    Crashed,
    Closing,
}

impl ServerField {
    pub const ALL: [ServerField; 7] = [
        ServerField::Children,
        ServerField::Free,
        ServerField::Used,
        ServerField::Started,
        ServerField::Closed,
        ServerField::Crashed,
        ServerField::Closing,
    ];

    /// Literal text preceding the value.
    pub fn label(self) -> &'static str {
        match self {
            ServerField::Children => "Children number:",
            ServerField::Free => "Free Servers:",
            ServerField::Used => "Used Servers:",
            ServerField::Started => "Started Processes:",
            ServerField::Closed => "Closed Processes:",
            ServerField::Crashed => "Crashed Processes:",
            ServerField::Closing => "Closing Processes:",
        }
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            ServerField::Children => "gw_icap_server_children_number",
            ServerField::Free => "gw_icap_server_free_servers",
            ServerField::Used => "gw_icap_server_used_servers",
            ServerField::Started => "gw_icap_server_started_processes",
            ServerField::Closed => "gw_icap_server_closed_processes",
            ServerField::Crashed => "gw_icap_server_crashed_processes",
            ServerField::Closing => "gw_icap_server_closing_processes",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            ServerField::Children => "ICAP Server Children Number",
            ServerField::Free => "ICAP Server Free Servers Number",
            ServerField::Used => "ICAP Server Used Servers Number",
            ServerField::Started => "ICAP Server Started Processes Number",
            ServerField::Closed => "ICAP Server Closed Processes Number",
            ServerField::Crashed => "ICAP Server Crashed Processes Number",
            ServerField::Closing => "ICAP Server Closing Processes Number",
        }
    }
}

/// Per-service workload counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadField {
    Reqmods,
    Respmods,
    Options,
    Allow204,
    RequestsScanned,
    RebuildFailures,
    RebuildErrors,
    ScanRebuilt,
    Unprocessed,
    Unprocessable,
    BytesIn,
    BytesOut,
    HttpBytesIn,
    HttpBytesOut,
    BodyBytesIn,
    BodyBytesOut,
    BodyBytesScanned,
}

impl WorkloadField {
    pub const ALL: [WorkloadField; 17] = [
        WorkloadField::Reqmods,
        WorkloadField::Respmods,
        WorkloadField::Options,
        WorkloadField::Allow204,
        WorkloadField::RequestsScanned,
        WorkloadField::RebuildFailures,
        WorkloadField::RebuildErrors,
        WorkloadField::ScanRebuilt,
        WorkloadField::Unprocessed,
        WorkloadField::Unprocessable,
        WorkloadField::BytesIn,
        WorkloadField::BytesOut,
        WorkloadField::HttpBytesIn,
        WorkloadField::HttpBytesOut,
        WorkloadField::BodyBytesIn,
        WorkloadField::BodyBytesOut,
        WorkloadField::BodyBytesScanned,
    ];

    /// Counter keyword as printed after `Service <name>`.
    pub fn keyword(self) -> &'static str {
        match self {
            WorkloadField::Reqmods => "REQMODS",
            WorkloadField::Respmods => "RESPMODS",
            WorkloadField::Options => "OPTIONS",
            WorkloadField::Allow204 => "ALLOW 204",
            WorkloadField::RequestsScanned => "REQUESTS SCANNED",
            WorkloadField::RebuildFailures => "REBUILD FAILURES",
            WorkloadField::RebuildErrors => "REBUILD ERRORS",
            WorkloadField::ScanRebuilt => "SCAN REBUILT",
            WorkloadField::Unprocessed => "UNPROCESSED",
            WorkloadField::Unprocessable => "UNPROCESSABLE",
            WorkloadField::BytesIn => "BYTES IN",
            WorkloadField::BytesOut => "BYTES OUT",
            WorkloadField::HttpBytesIn => "HTTP BYTES IN",
            WorkloadField::HttpBytesOut => "HTTP BYTES OUT",
            WorkloadField::BodyBytesIn => "BODY BYTES IN",
            WorkloadField::BodyBytesOut => "BODY BYTES OUT",
            WorkloadField::BodyBytesScanned => "BODY BYTES SCANNED",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            WorkloadField::BytesIn
            | WorkloadField::BytesOut
            | WorkloadField::HttpBytesIn
            | WorkloadField::HttpBytesOut
            | WorkloadField::BodyBytesIn
            | WorkloadField::BodyBytesOut
            | WorkloadField::BodyBytesScanned => Unit::KilobytesAndBytes,
            _ => Unit::Count,
        }
    }

    /// Literal text preceding the value for `service`,
    /// e.g. `Service gw_rebuild REQMODS :`.
    pub fn label(self, service: &str) -> String {
        format!("Service {} {} :", service, self.keyword())
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            WorkloadField::Reqmods => "gw_rebuild_reqmods",
            WorkloadField::Respmods => "gw_rebuild_respmods",
            WorkloadField::Options => "gw_rebuild_options",
            WorkloadField::Allow204 => "gw_rebuild_allow204",
            WorkloadField::RequestsScanned => "gw_rebuild_requests_scanned",
            WorkloadField::RebuildFailures => "gw_rebuild_rebuild_failures",
            WorkloadField::RebuildErrors => "gw_rebuild_rebuild_errors",
            WorkloadField::ScanRebuilt => "gw_rebuild_scan_rebuilt",
            WorkloadField::Unprocessed => "gw_rebuild_unprocessed",
            WorkloadField::Unprocessable => "gw_rebuild_unprocessable",
            WorkloadField::BytesIn => "gw_rebuild_bytes_in",
            WorkloadField::BytesOut => "gw_rebuild_bytes_out",
            WorkloadField::HttpBytesIn => "gw_rebuild_http_bytes_in",
            WorkloadField::HttpBytesOut => "gw_rebuild_http_bytes_out",
            WorkloadField::BodyBytesIn => "gw_rebuild_body_bytes_in",
            WorkloadField::BodyBytesOut => "gw_rebuild_body_bytes_out",
            WorkloadField::BodyBytesScanned => "gw_rebuild_body_bytes_scanned",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            WorkloadField::Reqmods => "GW Rebuild REQMODS Number",
            WorkloadField::Respmods => "GW Rebuild RESPMOD Number",
            WorkloadField::Options => "GW Rebuild OPTIONS Number",
            WorkloadField::Allow204 => "GW Rebuild ALLOW204 Number",
            WorkloadField::RequestsScanned => "GW Rebuild Requests Scanned Number",
            WorkloadField::RebuildFailures => "GW Rebuild Rebuilt Failures Number",
            WorkloadField::RebuildErrors => "GW Rebuild Rebuild Errors Number",
            WorkloadField::ScanRebuilt => "GW Rebuild Scan Rebuilt Number",
            WorkloadField::Unprocessed => "GW Rebuild Unprocessed Number",
            WorkloadField::Unprocessable => "GW Rebuild Unprocessable Number",
            WorkloadField::BytesIn => "GW Rebuild Bytes In Number",
            WorkloadField::BytesOut => "GW Rebuild Bytes Out Number",
            WorkloadField::HttpBytesIn => "GW Rebuild HTTP Bytes In Number",
            WorkloadField::HttpBytesOut => "GW Rebuild HTTP Bytes Out Number",
            WorkloadField::BodyBytesIn => "GW Rebuild Body Bytes In Number",
            WorkloadField::BodyBytesOut => "GW Rebuild Body Bytes Out Number",
            WorkloadField::BodyBytesScanned => "GW Rebuild Body Bytes Scanned Number",
        }
    }
}

/// One row of the field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule<F> {
    pub field: F,
    pub anchor: String,
    pub unit: Unit,
}

/// Complete, immutable field table for one statistics service name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    service: String,
    server: Vec<FieldRule<ServerField>>,
    workload: Vec<FieldRule<WorkloadField>>,
}

impl FieldTable {
    /// Build the table. `service` is the name printed in workload labels.
    pub fn new(service: &str) -> Self {
        let server = ServerField::ALL
            .iter()
            .map(|&field| FieldRule {
                field,
                anchor: field.label().to_string(),
                unit: Unit::Count,
            })
            .collect();

        let workload = WorkloadField::ALL
            .iter()
            .map(|&field| FieldRule {
                field,
                anchor: field.label(service),
                unit: field.unit(),
            })
            .collect();

        Self {
            service: service.to_string(),
            server,
            workload,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn server(&self) -> &[FieldRule<ServerField>] {
        &self.server
    }

    pub fn workload(&self) -> &[FieldRule<WorkloadField>] {
        &self.workload
    }
}
