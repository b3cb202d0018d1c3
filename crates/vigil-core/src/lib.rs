//! # Vigil Core
//!
//! Domain core for the Vigil lifecycle client.
//!
//! **Architecture:** pure value types and total functions - no I/O, no async,
//! no shared state. Everything here is derived from externally fetched
//! snapshots; nothing here fetches.
//!
//! ## Purpose
//!
//! Model one "incarnation" of a mortal on-ledger entity:
//! - A [`LifecycleSnapshot`] is one immutable observation of authoritative
//!   state (a heartbeat counter burning down toward zero).
//! - A [`Phase`] is derived from the remaining/capacity ratio, never stored.
//! - A [`VaultRecord`] is the one-time sealed record created at death.
//!
//! ## Module Structure
//!
//! ```text
//! vigil-core/
//! ├── domain/          # Snapshot, Phase + classify, VaultRecord, errors, invariants
//! └── metrics.rs       # time_to_death, lifetime_progress
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod metrics;

// Re-exports
pub use domain::{
    classify, invariant_snapshot_consistent, invariant_vault_well_formed, LifecycleSnapshot,
    Phase, SnapshotError, VaultRecord, MAX_COHERENCE_SCORE, MAX_LAST_WORDS_LEN,
};
pub use metrics::{lifetime_progress, time_to_death, SECONDS_PER_HEARTBEAT};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
