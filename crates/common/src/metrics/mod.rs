//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Guzellestir metrics
pub const METRICS_PREFIX: &str = "guzellestir";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Resolution metrics
    describe_counter!(
        format!("{}_hostname_classifications_total", METRICS_PREFIX),
        Unit::Count,
        "Hostname classifications by class"
    );

    describe_counter!(
        format!("{}_tenant_validations_total", METRICS_PREFIX),
        Unit::Count,
        "Tenant validations by source and outcome"
    );

    describe_histogram!(
        format!("{}_tenant_validation_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Tenant validation latency in seconds"
    );

    describe_counter!(
        format!("{}_route_decisions_total", METRICS_PREFIX),
        Unit::Count,
        "Route decisions by kind"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a hostname classification
pub fn record_classification(class: &str) {
    counter!(
        format!("{}_hostname_classifications_total", METRICS_PREFIX),
        "class" => class.to_string()
    )
    .increment(1);
}

/// Helper to record a tenant validation
pub fn record_validation(source: &str, outcome: &str, duration_secs: f64) {
    counter!(
        format!("{}_tenant_validations_total", METRICS_PREFIX),
        "source" => source.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_tenant_validation_duration_seconds", METRICS_PREFIX),
        "source" => source.to_string()
    )
    .record(duration_secs);
}

/// Helper to record a route decision
pub fn record_decision(kind: &str) {
    counter!(
        format!("{}_route_decisions_total", METRICS_PREFIX),
        "decision" => kind.to_string()
    )
    .increment(1);
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}
