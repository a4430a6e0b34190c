//! Prometheus metrics for request tracking and process monitoring.
//!
//! This module provides metrics for:
//! - HTTP request counts and latency
//! - Process resource usage sampled by the ops reporter

use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::error::ServerError;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Resident memory gauge metric name.
pub const METRIC_PROCESS_RSS: &str = "process_resident_memory_bytes";
/// Virtual memory gauge metric name.
pub const METRIC_PROCESS_VIRTUAL_MEMORY: &str = "process_virtual_memory_bytes";
/// CPU usage gauge metric name.
pub const METRIC_PROCESS_CPU: &str = "process_cpu_usage_percent";
/// Process uptime gauge metric name.
pub const METRIC_PROCESS_UPTIME: &str = "process_uptime_seconds";
/// System load average gauge metric name.
pub const METRIC_SYSTEM_LOAD: &str = "system_load_average_1m";

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, ServerError> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    describe_gauge!(METRIC_PROCESS_RSS, "Resident memory of the process in bytes");
    describe_gauge!(
        METRIC_PROCESS_VIRTUAL_MEMORY,
        "Virtual memory of the process in bytes"
    );
    describe_gauge!(METRIC_PROCESS_CPU, "CPU usage of the process in percent");
    describe_gauge!(METRIC_PROCESS_UPTIME, "Seconds since the process started");
    describe_gauge!(METRIC_SYSTEM_LOAD, "One-minute system load average");

    debug!("Metrics initialized");
}

/// Record one served HTTP request.
pub fn record_http_request(start: Instant, method: &str, route: &str, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!(METRIC_HTTP_REQUESTS, &labels).increment(1);
    histogram!(METRIC_HTTP_REQUEST_LATENCY, &labels).record(latency_ms);
}

/// Record process resource gauges.
pub fn record_process(rss_bytes: u64, virtual_bytes: u64, cpu_percent: f32, uptime_secs: u64) {
    gauge!(METRIC_PROCESS_RSS).set(rss_bytes as f64);
    gauge!(METRIC_PROCESS_VIRTUAL_MEMORY).set(virtual_bytes as f64);
    gauge!(METRIC_PROCESS_CPU).set(f64::from(cpu_percent));
    gauge!(METRIC_PROCESS_UPTIME).set(uptime_secs as f64);
}

/// Record the one-minute load average.
pub fn record_load_average(one_minute: f64) {
    gauge!(METRIC_SYSTEM_LOAD).set(one_minute);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_rendered_by_local_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_http_request(Instant::now(), "GET", "/status", 200);
        });

        let rendered = handle.render();
        assert!(rendered.contains(METRIC_HTTP_REQUESTS));
        assert!(rendered.contains("route=\"/status\""));
    }

    #[test]
    fn process_gauges_are_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_process(1024, 4096, 1.5, 10);
            record_load_average(0.25);
        });

        let rendered = handle.render();
        assert!(rendered.contains(METRIC_PROCESS_RSS));
        assert!(rendered.contains(METRIC_SYSTEM_LOAD));
    }
}
