//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Cinescope metrics
pub const METRICS_PREFIX: &str = "cinescope";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
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

    // Catalog metrics
    describe_counter!(
        format!("{}_movies_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total movies created"
    );

    describe_counter!(
        format!("{}_movies_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Total movies deleted"
    );

    // Social metrics
    describe_counter!(
        format!("{}_movie_likes_total", METRICS_PREFIX),
        Unit::Count,
        "Total movie like submissions"
    );

    describe_counter!(
        format!("{}_favorites_added_total", METRICS_PREFIX),
        Unit::Count,
        "Total favorites added"
    );

    describe_counter!(
        format!("{}_ratings_recorded_total", METRICS_PREFIX),
        Unit::Count,
        "Total ratings recorded"
    );

    describe_counter!(
        format!("{}_comments_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total comments and replies created"
    );

    describe_counter!(
        format!("{}_comment_likes_total", METRICS_PREFIX),
        Unit::Count,
        "Total comment likes"
    );

    // Maintenance metrics
    describe_counter!(
        format!("{}_tokens_purged_total", METRICS_PREFIX),
        Unit::Count,
        "Total expired tokens deleted by the sweeper"
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

/// Record a created movie
pub fn record_movie_created() {
    counter!(format!("{}_movies_created_total", METRICS_PREFIX)).increment(1);
}

/// Record a deleted movie
pub fn record_movie_deleted() {
    counter!(format!("{}_movies_deleted_total", METRICS_PREFIX)).increment(1);
}

/// Record a like or dislike submission
pub fn record_movie_like(is_like: bool) {
    let kind = if is_like { "like" } else { "dislike" };

    counter!(
        format!("{}_movie_likes_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(1);
}

/// Record an added favorite
pub fn record_favorite_added() {
    counter!(format!("{}_favorites_added_total", METRICS_PREFIX)).increment(1);
}

/// Record a movie rating
pub fn record_rating() {
    counter!(format!("{}_ratings_recorded_total", METRICS_PREFIX)).increment(1);
}

/// Record a created comment or reply
pub fn record_comment(reply: bool) {
    let kind = if reply { "reply" } else { "comment" };

    counter!(
        format!("{}_comments_created_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(1);
}

/// Record a comment like
pub fn record_comment_like() {
    counter!(format!("{}_comment_likes_total", METRICS_PREFIX)).increment(1);
}

/// Record a sweep of expired tokens
pub fn record_token_sweep(deleted: u64) {
    counter!(format!("{}_tokens_purged_total", METRICS_PREFIX)).increment(deleted);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // P50 target (50ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.050));
        // P99 target (250ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.250));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/theater/movies/");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
