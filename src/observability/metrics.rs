//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cep_requests_total` (counter): handled requests by service, status
//! - `cep_request_duration_seconds` (histogram): handler latency by service
//! - `cep_upstream_calls_total` (counter): outbound calls by upstream, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus endpoint is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{ServiceError, Upstream};

/// Install the Prometheus recorder with its own HTTP listener.
///
/// Must be called inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(service: &'static str, status: u16, start: Instant) {
    metrics::counter!("cep_requests_total", "service" => service, "status" => status.to_string()).increment(1);
    metrics::histogram!("cep_request_duration_seconds", "service" => service)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one upstream call.
pub fn record_upstream<T>(upstream: Upstream, result: &Result<T, ServiceError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(ServiceError::UpstreamNotFound(_)) => "not_found",
        Err(ServiceError::UpstreamUnavailable { .. }) => "unavailable",
        Err(ServiceError::UpstreamDataContractViolation { .. }) => "contract_violation",
        Err(_) => "error",
    };
    metrics::counter!("cep_upstream_calls_total", "upstream" => upstream.as_str(), "outcome" => outcome)
        .increment(1);
}
