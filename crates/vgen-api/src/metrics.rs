//! Prometheus metrics.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder; the handle renders `/metrics`.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Count every generation orchestration by terminal outcome.
pub fn record_generation_outcome(outcome: &'static str) {
    counter!("vgen_generation_outcomes_total", "outcome" => outcome).increment(1);
}

/// Count submissions to the external service by answered status class.
pub fn record_submission(status: u16) {
    let class = match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("vgen_submissions_total", "status" => class).increment(1);
}

/// HTTP request counting middleware.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let response = next.run(request).await;

    counter!(
        "vgen_http_requests_total",
        "method" => method,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    response
}
