//! # Event Envelope
//!
//! Wire shape of every streamed event: `{type, timestamp?, ...}`. Unknown
//! extra fields ride along in `payload` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status snapshot pushed on connect.
pub const EVENT_STATUS: &str = "status";
/// A heartbeat was burned.
pub const EVENT_HEARTBEAT: &str = "heartbeat";
/// The tracked entity died.
pub const EVENT_DEATH: &str = "death";
/// The server is shutting down.
pub const EVENT_SHUTDOWN: &str = "shutdown";
/// Synthetic: the transport connected.
pub const EVENT_CONNECTED: &str = "connected";
/// Synthetic: the transport disconnected.
pub const EVENT_DISCONNECTED: &str = "disconnected";
/// Synthetic: a transport-level error occurred.
pub const EVENT_ERROR: &str = "error";
/// Matches every event type when used as a handler registration key.
pub const WILDCARD: &str = "*";

/// One streamed event.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope {
    /// Event type discriminator.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Optional server-side timestamp (RFC 3339 string on the wire).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Remaining payload fields, passed through untouched.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl EventEnvelope {
    /// Build a synthetic (locally generated) envelope with no payload.
    pub fn synthetic(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            timestamp: None,
            payload: Map::new(),
        }
    }

    /// Build a synthetic error envelope carrying a message.
    pub fn synthetic_error(message: &str) -> Self {
        let mut payload = Map::new();
        payload.insert("message".to_string(), Value::String(message.to_string()));
        Self {
            event_type: EVENT_ERROR.to_string(),
            timestamp: None,
            payload,
        }
    }

    /// Parse a wire frame. `None` means malformed - the frame is dropped.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}
