//! Prometheus registry shared by the HTTP layer.
//!
//! Besides the request counters defined here, the registry carries the
//! standard `process_*` collector on Linux (CPU seconds, resident and virtual
//! memory, open file descriptors, start time).

use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TEXT_FORMAT, TextEncoder,
};

pub type MetricsError = prometheus::Error;

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Process-scoped metrics registry. Cloning shares the underlying collectors.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    requests: IntCounterVec,
    latency: HistogramVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled"),
            &["method", "route", "status"],
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["method", "route"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(latency.clone()))?;

        Ok(Self {
            registry,
            requests,
            latency,
        })
    }

    /// `route` must be a route template, not a raw path.
    pub fn observe_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        self.requests
            .with_label_values(&[method, route, status.as_str()])
            .inc();
        self.latency
            .with_label_values(&[method, route])
            .observe(elapsed.as_secs_f64());
    }

    pub fn content_type(&self) -> &'static str {
        TEXT_FORMAT
    }

    /// Encodes every registered collector in the text exposition format.
    pub fn render(&self) -> Result<Vec<u8>, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
