use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all party server metrics
const PREFIX: &str = "party";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Admin authentication
    pub static ref AUTH_LOGIN_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_auth_login_attempts_total"), "Total admin login attempts"),
        &["status"]
    ).expect("Failed to create auth_login_attempts_total metric");

    pub static ref AUTH_LOGIN_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_auth_login_duration_seconds"),
            "Login request duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0])
    ).expect("Failed to create auth_login_duration_seconds metric");

    // Video rotation
    pub static ref VIDEO_PLAYS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_video_plays_total"), "Accepted play reports per slide"),
        &["slide_id"]
    ).expect("Failed to create video_plays_total metric");

    pub static ref INVENTORY_ITEMS: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_inventory_items"), "Slides and local videos in the inventory"),
        &["type"]
    ).expect("Failed to create inventory_items metric");

    // Guest submissions
    pub static ref SUBMISSION_EVENTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_submission_events_total"), "Guest submission lifecycle events"),
        &["event"]
    ).expect("Failed to create submission_events_total metric");

    // Errors
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "API errors by type"),
        &["error_type"]
    ).expect("Failed to create errors_total metric");
}

/// Registers all metrics. Safe to call more than once.
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_LOGIN_ATTEMPTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_LOGIN_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(VIDEO_PLAYS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(INVENTORY_ITEMS.clone()));
    let _ = REGISTRY.register(Box::new(SUBMISSION_EVENTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));

    tracing::info!("Metrics system initialized");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_login_attempt(status: &str, duration: Duration) {
    AUTH_LOGIN_ATTEMPTS_TOTAL.with_label_values(&[status]).inc();
    AUTH_LOGIN_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn record_video_play(slide_id: &str) {
    VIDEO_PLAYS_TOTAL.with_label_values(&[slide_id]).inc();
}

pub fn set_inventory_size(total_slides: usize, total_videos: usize) {
    INVENTORY_ITEMS
        .with_label_values(&["slides"])
        .set(total_slides as f64);
    INVENTORY_ITEMS
        .with_label_values(&["videos"])
        .set(total_videos as f64);
}

/// `event` is one of created, approved, rejected, deleted.
pub fn record_submission_event(event: &str) {
    SUBMISSION_EVENTS_TOTAL.with_label_values(&[event]).inc();
}

pub fn record_error(error_type: &str) {
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gathered_names() -> Vec<String> {
        REGISTRY
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect()
    }

    #[test]
    fn test_metrics_initialization() {
        init_metrics();
        init_metrics();
        record_error("internal");
        assert!(gathered_names().contains(&"party_errors_total".to_string()));
    }

    #[test]
    fn test_record_video_play() {
        init_metrics();
        let before = VIDEO_PLAYS_TOTAL.with_label_values(&["metrics-test"]).get();
        record_video_play("metrics-test");
        record_video_play("metrics-test");
        let after = VIDEO_PLAYS_TOTAL.with_label_values(&["metrics-test"]).get();
        assert_eq!(after - before, 2.0);
    }

    #[test]
    fn test_inventory_gauges() {
        init_metrics();
        set_inventory_size(3, 11);
        assert_eq!(INVENTORY_ITEMS.with_label_values(&["slides"]).get(), 3.0);
        assert_eq!(INVENTORY_ITEMS.with_label_values(&["videos"]).get(), 11.0);
    }

    #[test]
    fn test_record_http_request() {
        init_metrics();
        record_http_request("GET", "/api/health", 200, Duration::from_millis(3));
        let count = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/api/health", "200"])
            .get();
        assert!(count >= 1.0);
    }
}
