//! # Client Errors
//!
//! Subscription construction and action dispatch failures.
//!
//! Propagation policy: snapshot fetch errors are absorbed inside the polling
//! loops (see `vigil_core::SnapshotError`); only the errors here reach the
//! caller, because they have caller-visible consequences.

use thiserror::Error;
use vigil_core::SnapshotError;

/// Invalid subscription parameters. Fails fast at construction, never
/// inside the loop.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// Poll interval must be strictly positive.
    #[error("poll interval must be greater than zero")]
    InvalidInterval,
}

/// Action dispatch could not complete. No partial state change is assumed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The signing credential refused or failed to sign.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The ledger rejected or never received the submission.
    #[error("submission failed: {0}")]
    Submission(String),

    /// The submission was sent but no confirmation identifier came back.
    #[error("confirmation failed: {0}")]
    Confirmation(String),

    /// A pre/post balance read around the transfer failed.
    #[error("balance read failed: {0}")]
    Balance(#[from] SnapshotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_error_display() {
        assert!(SubscribeError::InvalidInterval
            .to_string()
            .contains("greater than zero"));
    }

    #[test]
    fn test_dispatch_error_from_snapshot_error() {
        let err: DispatchError = SnapshotError::Timeout.into();
        assert!(matches!(err, DispatchError::Balance(_)));
        assert!(err.to_string().contains("balance read"));
    }
}
