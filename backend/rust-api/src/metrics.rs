use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref DRILL_SUBMISSIONS_TOTAL: IntCounter = register_int_counter!(
        "drill_submissions_total",
        "Total number of drill submissions recorded locally"
    )
    .unwrap();

    pub static ref STREAK_CURRENT: IntGauge = register_int_gauge!(
        "streak_current_days",
        "Current consecutive-day streak after the latest submission"
    )
    .unwrap();

    pub static ref FEEDBACK_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feedback_requests_total",
        "Total number of feedback requests by outcome",
        &["outcome"]
    )
    .unwrap();

    pub static ref MIGRATION_SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "migration_submissions_total",
        "Total number of submissions processed during migration",
        &["outcome"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_registration() {
        let _ = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/health", "200"])
            .get();
        let _ = FEEDBACK_REQUESTS_TOTAL.with_label_values(&["ai"]).get();
    }

    #[test]
    fn render_contains_registered_counters() {
        DRILL_SUBMISSIONS_TOTAL.inc();
        let output = render_metrics().expect("metrics render");
        assert!(output.contains("drill_submissions_total"));
    }
}
