//! # Subscription Engine
//!
//! Edge detection over polled snapshots. Each subscription is one
//! independent cooperative task that diffs consecutive observations against
//! a baseline and fires its callback only on qualifying transitions.
//!
//! Loop contract:
//! - A failed fetch is "skip this tick": the baseline is untouched and
//!   nothing fires.
//! - The first successful observation only establishes the baseline and
//!   never fires.
//! - The liveness flag is re-checked after every await and before every
//!   callback, so no callback fires after cancellation even if a fetch was
//!   in flight when `cancel` was called.
//! - Callbacks are delivered through a per-subscription dispatch task in
//!   strict poll order; a slow or panicking callback cannot stall the poll
//!   loop or kill the subscription.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;
use vigil_core::{LifecycleSnapshot, SnapshotError, VaultRecord};

use crate::config::WatcherConfig;
use crate::errors::SubscribeError;
use crate::ports::SnapshotSource;

/// Cancellation token for one subscription.
///
/// `cancel` is idempotent. Dropping the handle does *not* cancel; a
/// subscription outlives its handle unless explicitly cancelled.
pub struct SubscriptionHandle {
    id: Uuid,
    kind: &'static str,
    live: Arc<AtomicBool>,
    poll_task: JoinHandle<()>,
    dispatch_task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Unique subscription id (appears in log lines).
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Subscription kind, e.g. `"heartbeat"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Cancel the subscription. No callback fires after this returns;
    /// calling it again is a no-op.
    pub fn cancel(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!(
                "[vigil-client] subscription {} ({}) cancelled",
                self.id, self.kind
            );
            self.poll_task.abort();
        }
    }

    /// Has this subscription been cancelled?
    pub fn is_cancelled(&self) -> bool {
        !self.live.load(Ordering::SeqCst)
    }

    /// Have both the poll loop and the dispatcher finished?
    pub fn is_finished(&self) -> bool {
        self.poll_task.is_finished() && self.dispatch_task.is_finished()
    }
}

/// Edge-triggered lifecycle watcher over a shared snapshot source.
///
/// The source is shared read-only; subscriptions hold no mutable state in
/// common and make independent forward progress.
pub struct LifecycleWatcher {
    source: Arc<dyn SnapshotSource>,
    config: WatcherConfig,
}

impl LifecycleWatcher {
    /// Create a watcher over a snapshot source.
    pub fn new(source: Arc<dyn SnapshotSource>, config: WatcherConfig) -> Self {
        Self { source, config }
    }

    /// Fire whenever the observed burn counter strictly increases.
    ///
    /// `interval` of `None` uses the configured default. The first observed
    /// value only establishes the baseline.
    pub fn on_heartbeat<F>(
        &self,
        interval: Option<Duration>,
        callback: F,
    ) -> Result<SubscriptionHandle, SubscribeError>
    where
        F: Fn(LifecycleSnapshot) + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        self.spawn_subscription(
            "heartbeat",
            interval,
            move || {
                let source = Arc::clone(&source);
                async move {
                    let snapshot = source.fetch_snapshot().await?;
                    Ok((snapshot.total_consumed, Some(snapshot)))
                }
            },
            |prev: &u64, next: &u64| next > prev,
            callback,
        )
    }

    /// Fire exactly once per incarnation, on the tick where observed
    /// liveness transitions from alive to dead.
    pub fn on_death<F>(
        &self,
        interval: Option<Duration>,
        callback: F,
    ) -> Result<SubscriptionHandle, SubscribeError>
    where
        F: Fn(LifecycleSnapshot) + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        self.spawn_subscription(
            "death",
            interval,
            move || {
                let source = Arc::clone(&source);
                async move {
                    let snapshot = source.fetch_snapshot().await?;
                    Ok((snapshot.effectively_alive(), Some(snapshot)))
                }
            },
            |prev: &bool, next: &bool| *prev && !*next,
            callback,
        )
    }

    /// Fire when the vault seal is observed transitioning from unsealed
    /// (or absent) to sealed - the resurrection edge.
    pub fn on_resurrection<F>(
        &self,
        interval: Option<Duration>,
        callback: F,
    ) -> Result<SubscriptionHandle, SubscribeError>
    where
        F: Fn(VaultRecord) + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        self.spawn_subscription(
            "resurrection",
            interval,
            move || {
                let source = Arc::clone(&source);
                async move {
                    let vault = source.fetch_vault().await?;
                    let sealed = vault.as_ref().map(|v| v.is_sealed).unwrap_or(false);
                    Ok((sealed, vault))
                }
            },
            |prev: &bool, next: &bool| !*prev && *next,
            callback,
        )
    }

    /// Shared subscription machinery.
    ///
    /// `observe` yields `(comparison value, payload)`; `edge` decides
    /// whether the transition from the baseline qualifies. The payload is
    /// delivered to the callback only when the edge fires.
    fn spawn_subscription<O, P, Obs, Fut, E, F>(
        &self,
        kind: &'static str,
        interval: Option<Duration>,
        observe: Obs,
        edge: E,
        callback: F,
    ) -> Result<SubscriptionHandle, SubscribeError>
    where
        O: Send + 'static,
        P: Send + 'static,
        Obs: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(O, Option<P>), SnapshotError>> + Send,
        E: Fn(&O, &O) -> bool + Send + 'static,
        F: Fn(P) + Send + 'static,
    {
        let interval = interval.unwrap_or_else(|| self.config.poll_interval());
        if interval.is_zero() {
            return Err(SubscribeError::InvalidInterval);
        }

        let id = Uuid::new_v4();
        let fetch_timeout = self.config.fetch_timeout();
        let live = Arc::new(AtomicBool::new(true));
        let (tx, mut rx) = mpsc::unbounded_channel::<P>();

        // Dispatcher: delivers payloads in strict poll order, re-checking
        // liveness before each invocation and isolating callback panics.
        let dispatch_live = Arc::clone(&live);
        let dispatch_task = tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                if !dispatch_live.load(Ordering::SeqCst) {
                    break;
                }
                let result =
                    std::panic::catch_unwind(AssertUnwindSafe(|| callback(payload)));
                if result.is_err() {
                    warn!("[vigil-client] subscription {id} ({kind}) callback panicked");
                }
            }
        });

        let poll_live = Arc::clone(&live);
        let poll_task = tokio::spawn(async move {
            debug!(
                "[vigil-client] subscription {id} ({kind}) polling every {:?}",
                interval
            );
            let mut baseline: Option<O> = None;

            loop {
                if !poll_live.load(Ordering::SeqCst) {
                    break;
                }

                let observed = match tokio::time::timeout(fetch_timeout, observe()).await {
                    Ok(result) => result,
                    Err(_) => Err(SnapshotError::Timeout),
                };

                // A fetch in flight at cancellation time may complete, but
                // must never reach the callback.
                if !poll_live.load(Ordering::SeqCst) {
                    break;
                }

                match observed {
                    Err(e) => {
                        warn!("[vigil-client] subscription {id} ({kind}) fetch failed: {e}");
                    }
                    Ok((value, payload)) => match baseline.take() {
                        None => {
                            debug!("[vigil-client] subscription {id} ({kind}) baseline set");
                            baseline = Some(value);
                        }
                        Some(prev) => {
                            if edge(&prev, &value) {
                                if let Some(p) = payload {
                                    let _ = tx.send(p);
                                }
                            }
                            baseline = Some(value);
                        }
                    },
                }

                tokio::time::sleep(interval).await;
            }
        });

        Ok(SubscriptionHandle {
            id,
            kind,
            live,
            poll_task,
            dispatch_task,
        })
    }
}
