//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_selections_total` (counter): route selections by route, outcome
//! - `router_dispatch_duration_seconds` (histogram): dispatch latency by status
//! - `router_reloads_total` (counter): route table reloads by result
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Outcome label is `matched`, `index` or `not_found`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::{RouteMatch, INDEX_ROUTE};

/// Start the Prometheus exporter on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// The outcome label for a selection.
pub fn outcome(route: &RouteMatch) -> &'static str {
    if route.is_not_found() {
        "not_found"
    } else if route.name() == Some(INDEX_ROUTE) || route.name().is_none() {
        "index"
    } else {
        "matched"
    }
}

pub fn record_selection(route: &RouteMatch) {
    let name = route.name().unwrap_or("-").to_string();
    metrics::counter!("router_selections_total", "route" => name, "outcome" => outcome(route))
        .increment(1);
}

pub fn record_dispatch(status: u16, start: Instant) {
    metrics::histogram!("router_dispatch_duration_seconds", "status" => status.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reload(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!("router_reloads_total", "result" => result).increment(1);
}
