//! RPC metrics recording
//!
//! Thin helpers over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use contracts::{LoggingError, StatusCode};
use metrics::{counter, gauge, histogram};

/// Outcome label for a finished call
pub fn outcome_label<T>(result: &Result<T, LoggingError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.code().as_str(),
    }
}

/// Record one finished RPC
///
/// # Example
///
/// ```ignore
/// let result = transport.log(request).await;
/// observability::metrics::record_rpc("Log", &result, started.elapsed());
/// ```
pub fn record_rpc<T>(
    method: &'static str,
    result: &Result<T, LoggingError>,
    elapsed: std::time::Duration,
) {
    counter!(
        "structured_logging_rpc_total",
        "method" => method,
        "code" => outcome_label(result)
    )
    .increment(1);

    histogram!("structured_logging_rpc_latency_ms", "method" => method)
        .record(elapsed.as_secs_f64() * 1000.0);
}

/// Current number of outstanding async calls
pub fn record_async_in_flight(in_flight: usize) {
    gauge!("structured_logging_async_in_flight").set(in_flight as f64);
}

/// Async call refused by the admission limit
pub fn record_async_rejected() {
    counter!(
        "structured_logging_async_rejected_total",
        "code" => StatusCode::ResourceExhausted.as_str()
    )
    .increment(1);
}

/// Items delivered by one GetLogItems page
pub fn record_page_fetched(item_count: usize) {
    counter!("structured_logging_pages_total").increment(1);
    histogram!("structured_logging_page_items").record(item_count as f64);
}

/// Sources reported as rotated by one SyncAndRotateLogs call
pub fn record_rotation(synced_count: usize) {
    counter!("structured_logging_rotated_sources_total").increment(synced_count as u64);
}
