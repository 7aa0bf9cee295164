//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lei_requests_total` (counter): requests by method, route, status
//! - `lei_request_duration_seconds` (histogram): latency by method, route
//! - `lei_redirects_total` (counter): redirect responses issued by controllers
//! - `lei_render_errors_total` (counter): failed template renders
//! - `lei_sessions_active` (gauge): sessions held by the store

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`. Needs a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "lei_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "lei_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_redirect() {
    counter!("lei_redirects_total").increment(1);
}

pub fn record_render_error() {
    counter!("lei_render_errors_total").increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("lei_sessions_active").set(count as f64);
}

/// Route-level middleware recording request count and latency.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
