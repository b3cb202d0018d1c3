//! # Vigil Stream
//!
//! Push-based real-time transport mirroring the polling engine's event
//! vocabulary. The server pushes JSON event envelopes over a persistent
//! socket; this crate parses them, dispatches to registered handlers, and
//! reconnects with a fixed backoff when the connection drops.
//!
//! The transport never trusts the wire: malformed payloads are dropped
//! silently at the boundary and can neither crash the consumer nor reach a
//! handler.
//!
//! ## Module Structure
//!
//! ```text
//! vigil-stream/
//! ├── envelope.rs      # EventEnvelope + recognized event types
//! ├── handlers.rs      # HandlerRegistry (exact + wildcard dispatch)
//! ├── channel.rs       # StreamChannel port, WS + mock implementations
//! ├── transport.rs     # StreamingTransport state machine + reconnect
//! └── config.rs        # StreamConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod transport;

// Re-exports
pub use channel::{MessageStream, MockChannel, MockScript, StreamChannel, WsChannel};
pub use config::StreamConfig;
pub use envelope::{
    EventEnvelope, EVENT_CONNECTED, EVENT_DEATH, EVENT_DISCONNECTED, EVENT_ERROR,
    EVENT_HEARTBEAT, EVENT_SHUTDOWN, EVENT_STATUS, WILDCARD,
};
pub use error::StreamError;
pub use handlers::{HandlerId, HandlerRegistry};
pub use transport::{ConnectionState, StreamingTransport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
