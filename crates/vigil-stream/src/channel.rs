//! # Stream Channels
//!
//! The [`StreamChannel`] port abstracts the underlying socket so the
//! transport's state machine can be driven by a scripted mock in tests.
//! [`WsChannel`] is the production implementation over WebSocket.

use crate::error::StreamError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// A single open connection yielding text frames until it closes.
#[async_trait]
pub trait MessageStream: Send {
    /// Receive the next text frame. `None` means the stream closed cleanly;
    /// `Some(Err(_))` means it failed.
    async fn recv(&mut self) -> Option<Result<String, StreamError>>;

    /// Close the stream. Best effort; errors are ignored.
    async fn close(&mut self);
}

/// Factory for connections. Each `open` call establishes a fresh stream.
#[async_trait]
pub trait StreamChannel: Send + Sync + 'static {
    /// Establish a new connection.
    async fn open(&self) -> Result<Box<dyn MessageStream>, StreamError>;
}

// ============================================================================
// WebSocket implementation
// ============================================================================

/// WebSocket-backed [`StreamChannel`].
pub struct WsChannel {
    url: String,
}

impl WsChannel {
    /// Create a channel that connects to `url` (a `ws://` or `wss://` URL).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StreamChannel for WsChannel {
    async fn open(&self) -> Result<Box<dyn MessageStream>, StreamError> {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| StreamError::Connect(e.to_string()))?;
        debug!("[vigil-stream] websocket open: {}", self.url);
        Ok(Box::new(WsMessageStream { ws }))
    }
}

struct WsMessageStream {
    ws: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

#[async_trait]
impl MessageStream for WsMessageStream {
    async fn recv(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Ping(payload)) => {
                    // Answer keepalives inline; a failed pong surfaces on the
                    // next read anyway.
                    let _ = self.ws.send(Message::Pong(payload)).await;
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => {
                    // Binary and pong frames are not part of the protocol.
                    debug!("[vigil-stream] ignoring non-text frame");
                }
                Err(e) => return Some(Err(StreamError::Channel(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}

// ============================================================================
// Mock implementation for testing
// ============================================================================

/// One scripted connection for [`MockChannel`].
#[derive(Clone, Debug, Default)]
pub struct MockScript {
    /// Frames delivered in order before the connection ends.
    pub messages: Vec<String>,
    /// Keep the connection open (pending forever) after the last frame
    /// instead of closing it.
    pub hold_open: bool,
}

impl MockScript {
    /// A connection that delivers `messages` then closes.
    pub fn closing(messages: Vec<String>) -> Self {
        Self {
            messages,
            hold_open: false,
        }
    }

    /// A connection that delivers `messages` then stays open.
    pub fn holding(messages: Vec<String>) -> Self {
        Self {
            messages,
            hold_open: true,
        }
    }
}

/// Scripted [`StreamChannel`]: each `open` consumes the next script. When the
/// scripts run out, further opens yield empty closing connections.
#[derive(Default)]
pub struct MockChannel {
    scripts: Mutex<VecDeque<MockScript>>,
    opens: AtomicUsize,
}

impl MockChannel {
    /// Create a channel that plays `scripts` in order.
    pub fn new(scripts: Vec<MockScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            opens: AtomicUsize::new(0),
        }
    }

    /// How many times `open` has been called.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamChannel for MockChannel {
    async fn open(&self) -> Result<Box<dyn MessageStream>, StreamError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().pop_front().unwrap_or_default();
        Ok(Box::new(MockMessageStream {
            messages: script.messages.into(),
            hold_open: script.hold_open,
        }))
    }
}

struct MockMessageStream {
    messages: VecDeque<String>,
    hold_open: bool,
}

#[async_trait]
impl MessageStream for MockMessageStream {
    async fn recv(&mut self) -> Option<Result<String, StreamError>> {
        if let Some(text) = self.messages.pop_front() {
            return Some(Ok(text));
        }
        if self.hold_open {
            futures_util::future::pending::<()>().await;
        }
        None
    }

    async fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_channel_plays_scripts_in_order() {
        let channel = MockChannel::new(vec![
            MockScript::closing(vec!["a".into(), "b".into()]),
            MockScript::closing(vec!["c".into()]),
        ]);

        let mut stream = channel.open().await.unwrap();
        assert_eq!(stream.recv().await.unwrap().unwrap(), "a");
        assert_eq!(stream.recv().await.unwrap().unwrap(), "b");
        assert!(stream.recv().await.is_none());

        let mut stream = channel.open().await.unwrap();
        assert_eq!(stream.recv().await.unwrap().unwrap(), "c");
        assert!(stream.recv().await.is_none());

        assert_eq!(channel.open_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_channel_exhausted_scripts_close_immediately() {
        let channel = MockChannel::new(vec![]);
        let mut stream = channel.open().await.unwrap();
        assert!(stream.recv().await.is_none());
    }
}
