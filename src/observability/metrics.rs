//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): forwarded requests by method, status, outcome
//! - `relay_request_duration_seconds` (histogram): latency by method, outcome
//!
//! # Design Decisions
//! - `outcome` is `upstream` when the upstream answered, else the failure kind
//! - Recording is a no-op until `init_metrics` installs the exporter

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::forward::ForwardOutcome;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one forwarded request.
pub fn record_forward(method: &Method, outcome: &ForwardOutcome, started: Instant) {
    let status = match outcome {
        ForwardOutcome::Success(response) => response.status.as_u16(),
        ForwardOutcome::Failure(_) => 502,
    };
    let outcome = outcome.label();

    ::metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    ::metrics::histogram!(
        "relay_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(started.elapsed().as_secs_f64());
}
