//! # Snapshot Errors
//!
//! Typed failures for fetching authoritative state.
//!
//! All of these are *transient* from the subscription engine's point of
//! view: a failed fetch means "no new information this tick", never a
//! lifecycle transition.

use thiserror::Error;

/// Failure reading a lifecycle or vault snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Network-level failure reaching the source.
    #[error("network error: {0}")]
    Network(String),

    /// The fetch exceeded its deadline.
    #[error("fetch timed out")]
    Timeout,

    /// The source responded but the payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The queried account or document does not exist.
    ///
    /// Distinct from `fetch_vault` returning no vault: an absent vault
    /// before death is genuine absence-of-data, not a failure.
    #[error("account not found")]
    NotFound,
}

impl SnapshotError {
    /// All snapshot errors are recoverable by skip-and-retry.
    pub fn is_transient(&self) -> bool {
        true
    }
}
