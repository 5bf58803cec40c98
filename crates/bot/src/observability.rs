use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static UPDATES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "city_guide_bot_updates_total",
        "Total updates handled by the bot"
    )
    .expect("register updates_total")
});

pub static CALLBACKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "city_guide_bot_callbacks_total",
        "Total callback queries handled"
    )
    .expect("register callbacks_total")
});

pub static SEARCHES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "city_guide_bot_searches_total",
        "Total search requests (text and voice)"
    )
    .expect("register searches_total")
});

pub static HANDLER_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "city_guide_bot_handler_errors_total",
        "Total updates that failed with an error"
    )
    .expect("register handler_errors_total")
});

pub static POLL_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "city_guide_bot_poll_errors_total",
        "Total failed getUpdates calls"
    )
    .expect("register poll_errors_total")
});

pub static UPDATE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "city_guide_bot_update_duration_seconds",
        "Update handling duration in seconds",
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("register update_duration")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_metrics_are_exported() {
        UPDATES_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("city_guide_bot_updates_total"));
    }
}
