//! # Vigil Client
//!
//! Polling client for the mortality lifecycle: snapshot sources, the
//! edge-triggered subscription engine, and the vault funding dispatcher.
//!
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! The authoritative lifecycle state lives in an external ledger polled at
//! coarse, irregular intervals. This crate infers *transitions* (edges) from
//! *levels* (snapshots):
//! - [`SnapshotSource`] abstracts "fetch current authoritative state" over
//!   either a binary on-ledger account read or a REST status document.
//! - [`LifecycleWatcher`] runs one independent cancellable polling task per
//!   subscription and fires callbacks only on qualifying transitions.
//! - [`VaultFunder`] constructs and submits vault funding transfers through
//!   an externally supplied signing credential.
//!
//! Transient fetch failures are absorbed as "skip this tick" - they are
//! never surfaced as lifecycle events.
//!
//! ## Module Structure
//!
//! ```text
//! vigil-client/
//! ├── ports/           # SnapshotSource, LedgerWriter, TransferSigner + mocks
//! ├── adapters/        # Chain JSON-RPC adapter, REST status adapter
//! ├── engine.rs        # LifecycleWatcher + SubscriptionHandle
//! ├── dispatcher.rs    # VaultFunder
//! └── config.rs        # WatcherConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod ports;

// Re-exports
pub use adapters::{ChainSnapshotSource, RestStatusSource, RpcLedgerWriter};
pub use config::WatcherConfig;
pub use dispatcher::{FundingReceipt, VaultFunder};
pub use engine::{LifecycleWatcher, SubscriptionHandle};
pub use errors::{DispatchError, SubscribeError};
pub use ports::{
    LedgerWriter, MockLedgerWriter, MockSnapshotSource, ScriptStep, SnapshotSource,
    TransferSigner,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
