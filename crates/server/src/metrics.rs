use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramTimer, HistogramVec, IntCounterVec,
    TextEncoder,
};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "disease_api_requests_total",
        "Total requests handled per endpoint operation",
        &["operation"]
    )
    .expect("register requests_total")
});

pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "disease_api_request_duration_seconds",
        "Handler duration in seconds per endpoint operation",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register request_duration")
});

/// Count the call and time it until the returned guard drops.
pub fn time(operation: &str) -> HistogramTimer {
    REQUESTS_TOTAL.with_label_values(&[operation]).inc();
    REQUEST_DURATION.with_label_values(&[operation]).start_timer()
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_operation_shows_up_in_export() {
        drop(time("unit_test_op"));
        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("disease_api_requests_total{operation=\"unit_test_op\"}"));
        assert!(body.contains("disease_api_request_duration_seconds"));
    }
}
