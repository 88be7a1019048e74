//! Prometheus metrics for icap_exporter.
//!
//! ICAP counters are rebuilt from each [`MetricsSnapshot`] into a registry that
//! lives for one scrape only, so a failed collection exposes no ICAP gauges
//! at all. Exporter self-metrics live in a long-lived registry.

use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

use crate::stats::{MetricsSnapshot, ServerField, WorkloadField};

/// Scrape outcome label for a successful collection.
pub const RESULT_SUCCESS: &str = "success";

/// Long-lived exporter metrics.
pub struct ExporterMetrics {
    registry: Registry,

    /// Scrapes by result (`success` or the failure kind)
    pub scrapes_total: CounterVec,

    /// Collection duration in seconds
    pub scrape_duration_seconds: Histogram,

    /// 1 if the last collection produced a snapshot, 0 otherwise
    pub last_scrape_success: Gauge,
}

impl ExporterMetrics {
    /// Create the registry with all self-metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Probe latency buckets (in seconds), up to the default read deadline
        let scrape_buckets = vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

        let scrapes_total = CounterVec::new(
            Opts::new("icap_exporter_scrapes_total", "Total ICAP collection cycles"),
            &["result"],
        )?;
        registry.register(Box::new(scrapes_total.clone()))?;

        let scrape_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "icap_exporter_scrape_duration_seconds",
                "ICAP collection duration in seconds",
            )
            .buckets(scrape_buckets),
        )?;
        registry.register(Box::new(scrape_duration_seconds.clone()))?;

        let last_scrape_success = Gauge::new(
            "icap_exporter_last_scrape_success",
            "Whether the last ICAP collection succeeded",
        )?;
        registry.register(Box::new(last_scrape_success.clone()))?;

        Ok(Self {
            registry,
            scrapes_total,
            scrape_duration_seconds,
            last_scrape_success,
        })
    }

    /// Record one collection cycle. `result` is [`RESULT_SUCCESS`] or a
    /// failure kind.
    pub fn record_scrape(&self, result: &str, duration_secs: f64) {
        self.scrapes_total.with_label_values(&[result]).inc();
        self.scrape_duration_seconds.observe(duration_secs);
        self.last_scrape_success
            .set(if result == RESULT_SUCCESS { 1.0 } else { 0.0 });
    }

    /// Export metrics in Prometheus text format: snapshot gauges (if any)
    /// followed by self-metrics.
    pub fn render(&self, snapshot: Option<&MetricsSnapshot>) -> Result<String, prometheus::Error> {
        let mut families = match snapshot {
            Some(snapshot) => snapshot_registry(snapshot)?.gather(),
            None => Vec::new(),
        };
        families.extend(self.registry.gather());

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Build a one-shot registry holding the 24 ICAP gauges for `snapshot`.
pub fn snapshot_registry(snapshot: &MetricsSnapshot) -> Result<Registry, prometheus::Error> {
    let registry = Registry::new();

    for field in ServerField::ALL {
        let gauge = Gauge::new(field.metric_name(), field.help())?;
        gauge.set(snapshot.server().get(field) as f64);
        registry.register(Box::new(gauge))?;
    }

    for field in WorkloadField::ALL {
        let gauge = Gauge::new(field.metric_name(), field.help())?;
        gauge.set(snapshot.workload().get(field) as f64);
        registry.register(Box::new(gauge))?;
    }

    Ok(registry)
}
