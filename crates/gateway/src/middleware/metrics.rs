//! Per-request metrics
//!
//! Counts every request and samples its latency, labeled by method,
//! path, and response status.

use axum::{extract::Request, middleware::Next, response::Response};
use cinescope_common::metrics::RequestMetrics;

pub async fn track_requests(request: Request, next: Next) -> Response {
    let tracker = RequestMetrics::start(request.method().as_str(), request.uri().path());

    let response = next.run(request).await;

    tracker.finish(response.status().as_u16());
    response
}
