//! Prometheus metrics for the oracle network.
//!
//! All metrics follow the naming convention: `fs_<thing>_total`. Failure
//! counters carry a `reason` label taken from the error's `reason()`.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Oracles confirmed by the ledger
    pub static ref ORACLES_REGISTERED: IntCounter = IntCounter::new(
        "fs_oracles_registered_total",
        "Oracle identities registered with the ledger"
    ).expect("metric creation failed");

    /// Oracle registrations that failed, by reason
    pub static ref ORACLE_REGISTRATION_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "fs_oracle_registration_failures_total",
            "Oracle registrations that failed"
        ),
        &["reason"]
    ).expect("metric creation failed");

    // =========================================================================
    // REQUESTS
    // =========================================================================

    /// OracleRequest events decoded
    pub static ref REQUESTS_DECODED: IntCounter = IntCounter::new(
        "fs_requests_decoded_total",
        "OracleRequest events decoded into status requests"
    ).expect("metric creation failed");

    /// Events dropped as malformed
    pub static ref REQUEST_DECODE_FAILURES: IntCounter = IntCounter::new(
        "fs_request_decode_failures_total",
        "Ledger events dropped because they could not be decoded"
    ).expect("metric creation failed");

    /// Re-delivered requests skipped by the dedup cache
    pub static ref DUPLICATE_REQUESTS: IntCounter = IntCounter::new(
        "fs_duplicate_requests_total",
        "Requests skipped as recent re-deliveries"
    ).expect("metric creation failed");

    // =========================================================================
    // RESPONSES
    // =========================================================================

    /// Responses accepted by the ledger
    pub static ref RESPONSES_SUBMITTED: IntCounter = IntCounter::new(
        "fs_responses_submitted_total",
        "Oracle responses accepted by the ledger"
    ).expect("metric creation failed");

    /// Responses that failed, by reason
    pub static ref RESPONSE_SUBMISSION_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "fs_response_submission_failures_total",
            "Oracle responses rejected or timed out"
        ),
        &["reason"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ORACLES_REGISTERED.clone()),
        Box::new(ORACLE_REGISTRATION_FAILURES.clone()),
        Box::new(REQUESTS_DECODED.clone()),
        Box::new(REQUEST_DECODE_FAILURES.clone()),
        Box::new(DUPLICATE_REQUESTS.clone()),
        Box::new(RESPONSES_SUBMITTED.clone()),
        Box::new(RESPONSE_SUBMISSION_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
