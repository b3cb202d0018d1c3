//! # Ports
//!
//! Trait boundaries between the client and its external collaborators.

pub mod outbound;

pub use outbound::{
    LedgerWriter, MockLedgerWriter, MockSnapshotSource, ScriptStep, SnapshotSource,
    TransferSigner,
};
