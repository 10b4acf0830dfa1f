//! Minimal process-wide metrics registry.
//!
//! Grounded on `riptide-api/src/handlers.rs::metrics` (gather + `TextEncoder`
//! exposition) but deliberately small: request counts, fetch latency, items
//! stored — full OpenTelemetry export is out of scope, see SPEC_FULL.md §9.

use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub fetch_duration_seconds: HistogramVec,
    pub items_stored_total: IntCounter,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled by the management API"),
            &["method", "path", "status"],
        )
        .expect("valid metric definition");

        let fetch_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new("fetch_duration_seconds", "Fetcher round-trip latency per attempt"),
            &["outcome"],
        )
        .expect("valid metric definition");

        let items_stored_total =
            IntCounter::new("items_stored_total", "Total items newly written to the content store").expect("valid metric definition");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric registration");
        registry
            .register(Box::new(fetch_duration_seconds.clone()))
            .expect("metric registration");
        registry.register(Box::new(items_stored_total.clone())).expect("metric registration");

        Self {
            registry,
            http_requests_total,
            fetch_duration_seconds,
            items_stored_total,
        }
    }

    /// Renders the current registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// The process-wide metrics instance. Lives in `crawler-types` since it's
/// already a transitive dependency of every crate that needs to record or
/// expose metrics, avoiding an `Arc<Metrics>` threaded through constructors.
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
