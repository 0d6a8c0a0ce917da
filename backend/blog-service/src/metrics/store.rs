use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// Record store calls by operation and outcome (ok, not_found, transport, status, decode).
    pub static ref STORE_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_store_requests_total",
        "Record store requests segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register blog_store_requests_total");

    /// Round-trip time of record store calls, artificial latency included.
    pub static ref STORE_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_store_request_duration_seconds",
        "Record store request duration segmented by operation",
        &["operation"]
    )
    .expect("failed to register blog_store_request_duration_seconds");
}
