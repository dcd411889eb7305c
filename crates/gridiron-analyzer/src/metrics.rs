//! Analysis pipeline metrics.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const ANALYSES_TOTAL: &str = "gridiron_analyses_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "gridiron_analysis_duration_seconds";
    pub const ASSET_POLL_ATTEMPTS: &str = "gridiron_asset_poll_attempts";
    pub const RETRIES_TOTAL: &str = "gridiron_retries_total";
    pub const CLEANUP_FAILURES_TOTAL: &str = "gridiron_cleanup_failures_total";
}

/// Record a finished analysis and how long it took.
pub fn record_analysis(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::ANALYSES_TOTAL, &labels).increment(1);
    histogram!(names::ANALYSIS_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record how many state checks an asset needed before it became ready.
pub fn record_poll_attempts(attempts: u32) {
    histogram!(names::ASSET_POLL_ATTEMPTS).record(attempts as f64);
}

/// Record a retried operation.
pub fn record_retry(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::RETRIES_TOTAL, &labels).increment(1);
}

/// Record a cleanup step that failed (`remote_asset` or `local_file`).
pub fn record_cleanup_failure(resource: &str) {
    let labels = [("resource", resource.to_string())];
    counter!(names::CLEANUP_FAILURES_TOTAL, &labels).increment(1);
}
