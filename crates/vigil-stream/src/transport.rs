//! # Streaming Transport
//!
//! Connection state machine over a [`StreamChannel`]. A background task owns
//! the connection: it opens the channel, pumps frames through the
//! [`HandlerRegistry`], and on unexpected loss retries with a fixed delay up
//! to `max_reconnect_attempts` times before going quiet. The retry budget
//! resets on an explicit `connect()` or once a session delivers a frame;
//! merely opening does not count, so an endpoint that accepts and instantly
//! drops connections cannot keep the loop alive forever.
//!
//! Synthetic `connected` / `disconnected` / `error` envelopes are dispatched
//! locally so consumers observe transport transitions through the same
//! handler interface as server events.

use crate::channel::StreamChannel;
use crate::config::StreamConfig;
use crate::envelope::{EventEnvelope, EVENT_CONNECTED, EVENT_DISCONNECTED};
use crate::handlers::{HandlerId, HandlerRegistry};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Connection state of the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in flight.
    Disconnected,
    /// An open is in flight.
    Connecting,
    /// The channel is open and frames are being pumped.
    Connected,
    /// A deliberate shutdown is in progress.
    Closing,
}

impl ConnectionState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Closing,
            _ => Self::Disconnected,
        }
    }
}

struct TransportInner {
    channel: Arc<dyn StreamChannel>,
    config: StreamConfig,
    state: AtomicU8,
    /// Cleared by `disconnect()`; every loop iteration checks it.
    active: AtomicBool,
    attempts: AtomicU32,
    handlers: HandlerRegistry,
    shutdown: Notify,
}

impl TransportInner {
    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn handle_frame(&self, text: &str) {
        match EventEnvelope::parse(text) {
            Some(event) => self.handlers.dispatch(&event),
            None => debug!("[vigil-stream] dropping malformed frame"),
        }
    }

    async fn run_loop(self: Arc<Self>) {
        loop {
            if !self.active.load(Ordering::SeqCst) {
                break;
            }
            self.set_state(ConnectionState::Connecting);

            match self.channel.open().await {
                Ok(mut stream) => {
                    // A disconnect issued while the open was in flight wins:
                    // no connected envelope for a session nobody wants.
                    if !self.active.load(Ordering::SeqCst) {
                        stream.close().await;
                        break;
                    }
                    self.set_state(ConnectionState::Connected);
                    self.handlers
                        .dispatch(&EventEnvelope::synthetic(EVENT_CONNECTED));

                    loop {
                        tokio::select! {
                            _ = self.shutdown.notified() => {
                                // A permit left over from a shutdown of a
                                // previous session is drained and ignored.
                                if !self.active.load(Ordering::SeqCst) {
                                    stream.close().await;
                                    break;
                                }
                            }
                            frame = stream.recv() => match frame {
                                Some(Ok(text)) => {
                                    if !self.active.load(Ordering::SeqCst) {
                                        break;
                                    }
                                    // The budget resets only once a session
                                    // proves usable. An endpoint that accepts
                                    // and immediately drops connections still
                                    // exhausts it.
                                    self.attempts.store(0, Ordering::SeqCst);
                                    self.handle_frame(&text);
                                }
                                Some(Err(e)) => {
                                    warn!("[vigil-stream] channel error: {e}");
                                    self.handlers.dispatch(
                                        &EventEnvelope::synthetic_error(&e.to_string()),
                                    );
                                    break;
                                }
                                None => break,
                            },
                        }
                    }

                    self.set_state(ConnectionState::Disconnected);
                    self.handlers
                        .dispatch(&EventEnvelope::synthetic(EVENT_DISCONNECTED));
                }
                Err(e) => {
                    warn!("[vigil-stream] connect failed: {e}");
                    self.handlers
                        .dispatch(&EventEnvelope::synthetic_error(&e.to_string()));
                    self.set_state(ConnectionState::Disconnected);
                }
            }

            if !self.active.load(Ordering::SeqCst) || !self.config.auto_reconnect {
                break;
            }
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt > self.config.max_reconnect_attempts {
                // Budget exhausted. Go quiet until the next explicit connect.
                debug!(
                    "[vigil-stream] giving up after {} reconnect attempts",
                    self.config.max_reconnect_attempts
                );
                break;
            }
            debug!(
                "[vigil-stream] reconnect attempt {attempt}/{} in {:?}",
                self.config.max_reconnect_attempts,
                self.config.reconnect_delay()
            );
            tokio::select! {
                _ = self.shutdown.notified() => {
                    if !self.active.load(Ordering::SeqCst) {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.config.reconnect_delay()) => {}
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }
}

/// Push-based event transport with automatic reconnect.
pub struct StreamingTransport {
    inner: Arc<TransportInner>,
    run_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl StreamingTransport {
    /// Create a transport over `channel`. Nothing connects until
    /// [`connect`](Self::connect) is called.
    pub fn new(channel: Arc<dyn StreamChannel>, config: StreamConfig) -> Self {
        Self {
            inner: Arc::new(TransportInner {
                channel,
                config,
                state: AtomicU8::new(ConnectionState::Disconnected as u8),
                active: AtomicBool::new(false),
                attempts: AtomicU32::new(0),
                handlers: HandlerRegistry::new(),
                shutdown: Notify::new(),
            }),
            run_task: parking_lot::Mutex::new(None),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Register a handler for `event_type` (or [`crate::WILDCARD`]).
    pub fn on<F>(&self, event_type: &str, handler: F) -> HandlerId
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        self.inner.handlers.on(event_type, handler)
    }

    /// Remove a previously registered handler.
    pub fn off(&self, id: HandlerId) -> bool {
        self.inner.handlers.off(id)
    }

    /// Start (or restart) the connection loop. Resets the reconnect budget.
    /// Calling this while the loop is already running only resets the budget.
    pub fn connect(&self) {
        self.inner.active.store(true, Ordering::SeqCst);
        self.inner.attempts.store(0, Ordering::SeqCst);

        let mut guard = self.run_task.lock();
        let running = guard.as_ref().is_some_and(|t| !t.is_finished());
        if !running {
            let inner = Arc::clone(&self.inner);
            *guard = Some(tokio::spawn(inner.run_loop()));
        }
    }

    /// Stop the transport. Idempotent; no reconnect follows.
    pub fn disconnect(&self) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if self.inner.state() == ConnectionState::Connected {
            self.inner.set_state(ConnectionState::Closing);
        }
        // notify_one stores a permit, so a shutdown issued while the loop is
        // between awaits is not lost.
        self.inner.shutdown.notify_one();
    }

    /// Whether the background loop has exited.
    pub fn is_stopped(&self) -> bool {
        self.run_task
            .lock()
            .as_ref()
            .is_none_or(|t| t.is_finished())
    }
}
