//! # Response Dispatcher
//!
//! For each decoded request, every registered oracle holding the request
//! index submits its own independently generated status code.
//!
//! Submissions run concurrently and fail independently. Nothing is
//! retried. A TTL cache of request keys keeps a re-delivered request from
//! fanning out twice.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::Address;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::algorithms::{RandomStatusCodes, RequestDedupCache};
use crate::application::context::OracleContext;
use crate::application::listener::shutdown_signal;
use crate::domain::{
    invariant_may_respond, DispatchReport, OracleIndex, StatusRequest, StatusResponse,
    SubmissionError,
};
use crate::ports::inbound::{OracleRegistryApi, ResponseDispatchApi};
use crate::ports::outbound::{LedgerGateway, StatusCodeSource};

/// Capacity of the report broadcast channel.
pub const REPORT_CHANNEL_CAPACITY: usize = 256;

/// Fans each request out to the matching oracles.
pub struct ResponseDispatcher {
    gateway: Arc<dyn LedgerGateway>,
    registry: Arc<dyn OracleRegistryApi>,
    codes: Arc<dyn StatusCodeSource>,
    dedup: Mutex<RequestDedupCache>,
    call_timeout: Duration,
    reports: broadcast::Sender<DispatchReport>,
}

impl ResponseDispatcher {
    /// Dispatcher over the context's gateway and registry, using random
    /// status codes.
    pub fn new(ctx: &OracleContext) -> Self {
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        Self {
            gateway: Arc::clone(&ctx.gateway),
            registry: ctx.registry.clone(),
            codes: Arc::new(RandomStatusCodes::new()),
            dedup: Mutex::new(RequestDedupCache::new(
                ctx.config.dedup_ttl(),
                ctx.config.dedup_capacity,
            )),
            call_timeout: ctx.config.ledger_call_timeout(),
            reports,
        }
    }

    /// Replace the status code source.
    #[must_use]
    pub fn with_status_codes(mut self, codes: Arc<dyn StatusCodeSource>) -> Self {
        self.codes = codes;
        self
    }

    /// Whether `oracle`'s confirmed index set contains `index`.
    fn may_respond(&self, oracle: &Address, index: OracleIndex) -> bool {
        let allowed = self
            .registry
            .identity(oracle)
            .and_then(|identity| identity.indexes)
            .is_some_and(|indexes| invariant_may_respond(&indexes, index));
        if !allowed {
            error!(
                oracle = %oracle,
                index = %index,
                "[fs-oracle] Bucket entry without a matching index set, skipped"
            );
        }
        allowed
    }

    /// Receive a copy of every report produced from now on.
    #[must_use]
    pub fn reports(&self) -> broadcast::Receiver<DispatchReport> {
        self.reports.subscribe()
    }

    /// Consume requests until the channel closes or shutdown is signalled.
    ///
    /// Each request is dispatched on its own task so the loop never waits
    /// for a fan-out to finish. On shutdown in-flight dispatches are
    /// abandoned; when the channel closes they are allowed to finish.
    pub async fn run(
        self: Arc<Self>,
        mut requests: mpsc::Receiver<StatusRequest>,
        shutdown: watch::Receiver<bool>,
    ) {
        let mut shutdown = Some(shutdown);
        let mut in_flight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown_signal(&mut shutdown) => {
                    if !in_flight.is_empty() {
                        info!(
                            abandoned = in_flight.len(),
                            "[fs-oracle] Abandoning in-flight dispatches"
                        );
                    }
                    in_flight.abort_all();
                    return;
                }
                maybe = requests.recv() => match maybe {
                    Some(request) => {
                        let dispatcher = Arc::clone(&self);
                        in_flight.spawn(async move {
                            dispatcher.dispatch(request).await;
                        });
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_join(joined);
                }
            }
        }

        debug!("[fs-oracle] Request channel closed, draining dispatches");
        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if !e.is_cancelled() {
            error!(error = %e, "[fs-oracle] Dispatch task failed");
        }
    }
}

async fn submit(
    gateway: Arc<dyn LedgerGateway>,
    response: StatusResponse,
    call_timeout: Duration,
) -> Result<StatusResponse, SubmissionError> {
    let oracle = response.oracle;
    match tokio::time::timeout(
        call_timeout,
        gateway.submit_oracle_response(oracle, &response),
    )
    .await
    {
        Ok(Ok(())) => Ok(response),
        Ok(Err(e)) => Err(SubmissionError::Gateway(e)),
        Err(_) => Err(SubmissionError::Timeout),
    }
}

#[async_trait]
impl ResponseDispatchApi for ResponseDispatcher {
    async fn dispatch(&self, request: StatusRequest) -> DispatchReport {
        let key = request.key();

        if !self.dedup.lock().check_and_insert(key.clone(), Instant::now()) {
            debug!(request = %key, "[fs-oracle] Duplicate request skipped");
            let report = DispatchReport::duplicate(key);
            let _ = self.reports.send(report.clone());
            return report;
        }

        let matched: Vec<_> = self
            .registry
            .get_matching(request.index)
            .into_iter()
            .filter(|oracle| self.may_respond(oracle, request.index))
            .collect();
        let mut tasks = JoinSet::new();
        for oracle in &matched {
            let response = StatusResponse {
                request: key.clone(),
                oracle: *oracle,
                status: self.codes.next(),
            };
            let oracle = *oracle;
            let gateway = Arc::clone(&self.gateway);
            let call_timeout = self.call_timeout;
            tasks.spawn(async move { (oracle, submit(gateway, response, call_timeout).await) });
        }

        let mut report = DispatchReport {
            request: key,
            matched,
            submitted: Vec::new(),
            failed: Vec::new(),
            duplicate: false,
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(response))) => {
                    debug!(
                        oracle = %response.oracle,
                        status = %response.status,
                        "[fs-oracle] Response submitted"
                    );
                    report.submitted.push(response);
                }
                Ok((oracle, Err(e))) => {
                    warn!(
                        oracle = %oracle,
                        request = %report.request,
                        reason = e.reason(),
                        error = %e,
                        "[fs-oracle] Response submission failed"
                    );
                    report.failed.push((oracle, e));
                }
                Err(e) => error!(error = %e, "[fs-oracle] Submission task failed"),
            }
        }
        report.submitted.sort_by_key(|response| response.oracle);
        report.failed.sort_by_key(|(oracle, _)| *oracle);

        info!(
            request = %report.request,
            block = request.block_number,
            matched = report.matched.len(),
            submitted = report.submitted.len(),
            failed = report.failed.len(),
            "[fs-oracle] Request dispatched"
        );

        let _ = self.reports.send(report.clone());
        report
    }
}
