//! # Event Listener
//!
//! Long-lived subscription to `OracleRequest` events. Each event is
//! decoded and the resulting `StatusRequest` handed to the dispatcher over
//! a bounded channel. Malformed events are logged and dropped.

use serde::Serialize;
use shared_bus::Subscription;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::algorithms::decode_oracle_request;
use crate::domain::{OracleError, StatusRequest};
use crate::ports::outbound::LedgerGateway;

/// Point-in-time listener counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListenerStats {
    /// Raw events taken off the subscription.
    pub received: u64,
    /// Events decoded and forwarded.
    pub decoded: u64,
    /// Events dropped as malformed.
    pub decode_failures: u64,
}

/// Live counters shared with the listener task.
#[derive(Debug, Default)]
pub struct ListenerCounters {
    received: AtomicU64,
    decoded: AtomicU64,
    decode_failures: AtomicU64,
}

impl ListenerCounters {
    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> ListenerStats {
        ListenerStats {
            received: self.received.load(Ordering::Relaxed),
            decoded: self.decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

/// Running listener.
pub struct ListenerHandle {
    /// Decoded requests, in arrival order.
    pub requests: mpsc::Receiver<StatusRequest>,
    /// The subscription loop.
    pub task: JoinHandle<()>,
    /// Counters updated by the loop.
    pub counters: Arc<ListenerCounters>,
}

/// Subscribes to request events and decodes them.
pub struct RequestListener {
    gateway: Arc<dyn LedgerGateway>,
    channel_capacity: usize,
    shutdown: Option<watch::Receiver<bool>>,
}

impl RequestListener {
    /// Create a listener feeding a channel of `channel_capacity`.
    pub fn new(gateway: Arc<dyn LedgerGateway>, channel_capacity: usize) -> Self {
        Self {
            gateway,
            channel_capacity: channel_capacity.max(1),
            shutdown: None,
        }
    }

    /// Stop the loop when `shutdown` becomes `true` or its sender drops.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Open the subscription at `from_block` and start the loop.
    ///
    /// Failing to open the subscription is fatal for the network.
    pub async fn subscribe(&self, from_block: u64) -> Result<ListenerHandle, OracleError> {
        let subscription = self
            .gateway
            .subscribe_events(from_block)
            .await
            .map_err(OracleError::SubscriptionFailed)?;

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let counters = Arc::new(ListenerCounters::default());

        info!(from_block, "[fs-oracle] Listening for OracleRequest events");
        let task = tokio::spawn(listen(
            subscription,
            tx,
            Arc::clone(&counters),
            self.shutdown.clone(),
        ));

        Ok(ListenerHandle {
            requests: rx,
            task,
            counters,
        })
    }
}

async fn listen(
    mut subscription: Subscription,
    tx: mpsc::Sender<StatusRequest>,
    counters: Arc<ListenerCounters>,
    mut shutdown: Option<watch::Receiver<bool>>,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown_signal(&mut shutdown) => {
                debug!("[fs-oracle] Listener stopping on shutdown");
                break;
            }
            event = subscription.recv() => event,
        };

        let Some(event) = event else {
            warn!("[fs-oracle] Event subscription closed");
            break;
        };
        counters.received.fetch_add(1, Ordering::Relaxed);

        match decode_oracle_request(&event) {
            Ok(request) => {
                counters.decoded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    block = request.block_number,
                    index = %request.index,
                    flight = %request.flight,
                    "[fs-oracle] OracleRequest decoded"
                );
                if tx.send(request).await.is_err() {
                    debug!("[fs-oracle] Dispatcher gone, listener stopping");
                    break;
                }
            }
            Err(e) => {
                counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    block = event.block_number,
                    reason = e.reason(),
                    error = %e,
                    "[fs-oracle] Dropping malformed event"
                );
            }
        }
    }
}

/// Resolves once shutdown is requested; never resolves without a receiver.
pub(crate) async fn shutdown_signal(shutdown: &mut Option<watch::Receiver<bool>>) {
    match shutdown {
        Some(rx) => loop {
            let stop = *rx.borrow_and_update();
            if stop || rx.changed().await.is_err() {
                return;
            }
        },
        None => std::future::pending::<()>().await,
    }
}
