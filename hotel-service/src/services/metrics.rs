//! Prometheus metrics for hotel-service.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, HistogramVec,
    IntCounter, TextEncoder,
};
use std::sync::OnceLock;

/// Renders the HTTP request metrics recorded by the shared middleware.
static HTTP_METRICS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "hotel_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Reservation lifecycle events (created, updated, canceled, finished, deleted).
pub static RESERVATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hotel_reservations_total",
        "Total number of reservation lifecycle events",
        &["event"]
    )
    .expect("Failed to register reservations_total")
});

/// Invoice transitions by target status.
pub static INVOICE_TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hotel_invoice_transitions_total",
        "Total number of invoice status transitions",
        &["status"] // paid, canceled
    )
    .expect("Failed to register invoice_transitions_total")
});

/// Collected amount by payment mode.
pub static PAYMENT_AMOUNT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hotel_payment_amount_total",
        "Total collected amount by payment mode",
        &["mode"]
    )
    .expect("Failed to register payment_amount_total")
});

/// Bookings rejected because the room was already taken.
pub static BOOKING_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "hotel_booking_conflicts_total",
        "Total number of bookings rejected for overlapping dates"
    )
    .expect("Failed to register booking_conflicts_total")
});

/// Installs the HTTP metrics recorder and forces the lazy registrations.
pub fn init_metrics() {
    if HTTP_METRICS.get().is_none() {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = HTTP_METRICS.set(handle);
            }
            Err(e) => tracing::warn!(error = %e, "HTTP metrics recorder not installed"),
        }
    }

    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&RESERVATIONS_TOTAL);
    Lazy::force(&INVOICE_TRANSITIONS_TOTAL);
    Lazy::force(&PAYMENT_AMOUNT_TOTAL);
    Lazy::force(&BOOKING_CONFLICTS_TOTAL);
}

/// Get metrics in Prometheus text format: HTTP metrics first, then the
/// domain counters from the default registry.
pub fn get_metrics() -> String {
    let mut output = HTTP_METRICS
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    if let Ok(domain) = encoder.encode_to_string(&metric_families) {
        output.push_str(&domain);
    }
    output
}
