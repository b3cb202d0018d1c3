//! # Adapters
//!
//! Concrete snapshot sources and the ledger write path. Both snapshot
//! adapters produce identical core types; the subscription engine is
//! agnostic to which transport backs it.

pub mod chain;
pub mod rest;
pub mod writer;

pub use chain::ChainSnapshotSource;
pub use rest::RestStatusSource;
pub use writer::RpcLedgerWriter;
