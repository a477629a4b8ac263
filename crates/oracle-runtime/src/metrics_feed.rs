//! Feeds oracle network outcomes into the Prometheus counters.
//!
//! The core crate returns plain values (`RegistrationSummary`,
//! `DispatchReport`, `ListenerStats`); this module turns them into metric
//! increments.

use fs_oracle_network::{DispatchReport, ListenerCounters, ListenerStats, RegistrationSummary};
use oracle_telemetry::{
    metric_inc, DUPLICATE_REQUESTS, ORACLES_REGISTERED, ORACLE_REGISTRATION_FAILURES,
    REQUESTS_DECODED, REQUEST_DECODE_FAILURES, RESPONSES_SUBMITTED, RESPONSE_SUBMISSION_FAILURES,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// How often listener counters are sampled.
pub const LISTENER_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Count registered and failed identities.
pub fn record_registration(summary: &RegistrationSummary) {
    ORACLES_REGISTERED.inc_by(summary.registered_count() as u64);
    for (_, error) in &summary.failed {
        metric_inc!(ORACLE_REGISTRATION_FAILURES, &[error.reason()]);
    }
}

/// Count one dispatch outcome.
pub fn record_dispatch(report: &DispatchReport) {
    if report.duplicate {
        metric_inc!(DUPLICATE_REQUESTS);
        return;
    }
    RESPONSES_SUBMITTED.inc_by(report.submitted.len() as u64);
    for (_, error) in &report.failed {
        metric_inc!(RESPONSE_SUBMISSION_FAILURES, &[error.reason()]);
    }
}

/// Add the growth between two listener snapshots.
pub fn record_listener_delta(previous: ListenerStats, current: ListenerStats) {
    REQUESTS_DECODED.inc_by(current.decoded.saturating_sub(previous.decoded));
    REQUEST_DECODE_FAILURES.inc_by(
        current
            .decode_failures
            .saturating_sub(previous.decode_failures),
    );
}

/// Forward dispatch reports and listener counters to the metrics until
/// shutdown.
pub async fn run_metrics_feed(
    mut reports: broadcast::Receiver<DispatchReport>,
    counters: Arc<ListenerCounters>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(LISTENER_SAMPLE_INTERVAL);
    let mut last = ListenerStats::default();

    loop {
        tokio::select! {
            report = reports.recv() => match report {
                Ok(report) => record_dispatch(&report),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Metrics feed lagged behind dispatch reports");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                let current = counters.snapshot();
                record_listener_delta(last, current);
                last = current;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    record_listener_delta(last, counters.snapshot());
    debug!("Metrics feed stopped");
}
