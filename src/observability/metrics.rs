//! Prometheus metrics.
//!
//! Metrics are recorded through the `metrics` facade into a process-wide
//! Prometheus recorder. The recorder is installed at most once; later calls to
//! [`install_recorder`] hand back the same handle, so tests can build as many
//! routers as they like.
//!
//! # Metrics
//! - `passcode_requests_total` (counter): requests by method and endpoint
//! - `passcode_request_duration_seconds` (histogram): request latency
//! - `passcode_submissions_total` (counter): form submissions by outcome

use std::sync::Mutex;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const REQUESTS_TOTAL: &str = "passcode_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "passcode_request_duration_seconds";
pub const SUBMISSIONS_TOTAL: &str = "passcode_submissions_total";

/// Histogram buckets tuned for a page render plus one database round trip
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the global recorder (first call) and return its handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let mut slot = HANDLE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    ::metrics::describe_counter!(REQUESTS_TOTAL, "Total HTTP requests");
    ::metrics::describe_histogram!(
        REQUEST_DURATION_SECONDS,
        ::metrics::Unit::Seconds,
        "HTTP request duration"
    );
    ::metrics::describe_counter!(SUBMISSIONS_TOTAL, "Passcode form submissions by outcome");

    *slot = Some(handle.clone());
    Ok(handle)
}

/// Record one finished HTTP request.
pub fn record_request(method: &str, endpoint: &str, seconds: f64) {
    ::metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
    ::metrics::histogram!(REQUEST_DURATION_SECONDS).record(seconds);
}

/// Record the outcome of one form submission.
pub fn record_submission(outcome: &'static str) {
    ::metrics::counter!(SUBMISSIONS_TOTAL, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_is_idempotent() {
        let first = install_recorder().unwrap();
        let second = install_recorder().unwrap();

        record_request("GET", "/idempotent-check", 0.01);
        let rendered = second.render();
        assert!(rendered.contains(REQUESTS_TOTAL));
        assert!(first.render().contains(r#"endpoint="/idempotent-check""#));
    }

    #[test]
    fn test_duration_is_histogram() {
        let handle = install_recorder().unwrap();
        record_request("GET", "/histogram-check", 0.02);
        let rendered = handle.render();
        assert!(rendered.contains(&format!("{}_bucket", REQUEST_DURATION_SECONDS)));
        assert!(rendered.contains(&format!("# TYPE {} histogram", REQUEST_DURATION_SECONDS)));
    }
}
