//! Metrics collection and exposition.
//!
//! # Metrics
//! - `header_to_query_requests_total` (counter): requests seen by the rewriter,
//!   labelled `outcome="rewritten"|"pass_through"`
//! - `header_to_query_missing_header_total` (counter): rewritten requests that
//!   carried no source header
//! - `header_to_query_upstream_errors_total` (counter): forwards that failed

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::rewrite::Outcome;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(outcome: Outcome) {
    metrics::counter!("header_to_query_requests_total", "outcome" => outcome.as_str()).increment(1);

    if let Outcome::Rewritten { header_present: false } = outcome {
        metrics::counter!("header_to_query_missing_header_total").increment(1);
    }
}

pub fn record_upstream_error() {
    metrics::counter!("header_to_query_upstream_errors_total").increment(1);
}
