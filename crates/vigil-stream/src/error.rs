//! # Stream Errors

use thiserror::Error;

/// Transport-level failure.
///
/// Malformed messages are deliberately *not* represented here: an
/// unparseable frame is dropped at the boundary, not surfaced as an error.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Could not establish the underlying channel.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The channel failed mid-stream.
    #[error("channel error: {0}")]
    Channel(String),
}
