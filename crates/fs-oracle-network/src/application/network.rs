//! # Oracle Network
//!
//! Start-up and shutdown of the whole pipeline:
//! register pool -> subscribe -> dispatch loop.

use shared_types::Address;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::algorithms::RandomStatusCodes;
use crate::application::context::OracleContext;
use crate::application::dispatcher::ResponseDispatcher;
use crate::application::listener::{ListenerCounters, ListenerStats, RequestListener};
use crate::application::registry::IdentityRegistry;
use crate::domain::{DispatchReport, OracleError, RegistrationSummary};
use crate::ports::outbound::StatusCodeSource;

/// Entry point for running an oracle pool.
pub struct OracleNetwork;

impl OracleNetwork {
    /// Register `accounts`, subscribe to requests and start dispatching.
    ///
    /// Individual registration failures are tolerated and listed in the
    /// summary. Failing to subscribe is fatal.
    pub async fn start(
        ctx: OracleContext,
        accounts: impl IntoIterator<Item = Address>,
    ) -> Result<OracleNetworkHandle, OracleError> {
        Self::start_with_codes(ctx, accounts, Arc::new(RandomStatusCodes::new())).await
    }

    /// Like [`OracleNetwork::start`] with a custom status code source.
    pub async fn start_with_codes(
        ctx: OracleContext,
        accounts: impl IntoIterator<Item = Address>,
        codes: Arc<dyn StatusCodeSource>,
    ) -> Result<OracleNetworkHandle, OracleError> {
        let summary = ctx.registry.register_all(accounts).await;
        if summary.registered_count() == 0 {
            warn!("[fs-oracle] No oracle registered; requests will go unanswered");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let listener = RequestListener::new(
            Arc::clone(&ctx.gateway),
            ctx.config.request_channel_capacity,
        )
        .with_shutdown(shutdown_rx.clone());
        let listening = listener.subscribe(ctx.config.from_block).await?;

        let dispatcher = Arc::new(ResponseDispatcher::new(&ctx).with_status_codes(codes));
        let dispatch_task = tokio::spawn(
            Arc::clone(&dispatcher).run(listening.requests, shutdown_rx),
        );

        info!(
            registered = summary.registered_count(),
            failed = summary.failed_count(),
            from_block = ctx.config.from_block,
            "[fs-oracle] Oracle network started"
        );

        Ok(OracleNetworkHandle {
            ctx,
            summary,
            dispatcher,
            counters: listening.counters,
            listener_task: Some(listening.task),
            dispatch_task: Some(dispatch_task),
            shutdown_tx,
        })
    }
}

/// A running oracle network.
pub struct OracleNetworkHandle {
    ctx: OracleContext,
    summary: RegistrationSummary,
    dispatcher: Arc<ResponseDispatcher>,
    counters: Arc<ListenerCounters>,
    listener_task: Option<JoinHandle<()>>,
    dispatch_task: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl OracleNetworkHandle {
    /// Outcome of pool registration.
    #[must_use]
    pub fn summary(&self) -> &RegistrationSummary {
        &self.summary
    }

    /// Every dispatch report produced from now on.
    #[must_use]
    pub fn reports(&self) -> broadcast::Receiver<DispatchReport> {
        self.dispatcher.reports()
    }

    /// Listener counters.
    #[must_use]
    pub fn listener_stats(&self) -> ListenerStats {
        self.counters.snapshot()
    }

    /// Shared listener counters, for sampling from another task.
    #[must_use]
    pub fn listener_counters(&self) -> Arc<ListenerCounters> {
        Arc::clone(&self.counters)
    }

    /// The identity registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<IdentityRegistry> {
        &self.ctx.registry
    }

    /// Resolves when the listener loop ends (subscription closed or
    /// shutdown). Resolves immediately if already awaited.
    pub async fn listener_closed(&mut self) {
        if let Some(task) = self.listener_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "[fs-oracle] Listener task failed");
            }
        }
    }

    /// Stop listening and dispatching. In-flight submissions are abandoned.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        self.listener_closed().await;
        if let Some(task) = self.dispatch_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "[fs-oracle] Dispatch task failed");
            }
        }
        info!("[fs-oracle] Oracle network stopped");
    }
}
