use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "cars_requests_total",
        "Total car requests by operation",
        &["op"]
    )
    .expect("register cars_requests_total")
});

pub static CARS_INSERTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "cars_inserted_total",
        "Total cars stored by insert"
    )
    .expect("register cars_inserted_total")
});

pub static NOT_FOUND_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "cars_not_found_total",
        "Total lookups of unknown car ids"
    )
    .expect("register cars_not_found_total")
});

pub fn record_request(op: &str) {
    REQUESTS_TOTAL.with_label_values(&[op]).inc();
}

pub fn encode_metrics() -> (u16, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (500, format!("metrics encode error: {e}"));
    }
    (200, String::from_utf8(buffer).unwrap_or_default())
}
