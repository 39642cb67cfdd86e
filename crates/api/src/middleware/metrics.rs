//! Prometheus metrics.
//!
//! HTTP request metrics are recorded by [`metrics_middleware`]; the alert
//! and loyalty helpers below are called from services and handlers.

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Records `http_requests_total` and `http_request_duration_seconds`,
/// labelled by method and matched route.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// One poll of the subscription source.
pub fn record_alert_poll(source: &'static str, success: bool) {
    counter!(
        "subscription_alert_polls_total",
        "source" => source,
        "outcome" => if success { "success" } else { "failure" }
    )
    .increment(1);
}

/// Alert counts in the latest published snapshot.
pub fn record_active_alerts(critical: usize, warning: usize) {
    gauge!("subscription_alerts_active", "severity" => "critical").set(critical as f64);
    gauge!("subscription_alerts_active", "severity" => "warning").set(warning as f64);
}

/// A gate let sound or notifications through for a session.
pub fn record_gate_fired(sound: bool, notifications: usize) {
    if sound {
        counter!("alert_sounds_played_total").increment(1);
    }
    counter!("alert_notifications_fired_total").increment(notifications as u64);
}

pub fn record_loyalty_entry(transaction_type: &'static str) {
    counter!("loyalty_entries_total", "type" => transaction_type).increment(1);
}

pub fn record_redemption(success: bool) {
    counter!(
        "reward_redemptions_total",
        "outcome" => if success { "success" } else { "rejected" }
    )
    .increment(1);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Installs the global Prometheus recorder.
///
/// Must be called once during startup before any metrics are recorded.
/// A second call leaves the first recorder in place.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}
