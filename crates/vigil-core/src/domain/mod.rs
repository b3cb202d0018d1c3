//! # Domain Types
//!
//! Value types and total functions for the mortality lifecycle.

pub mod errors;
pub mod invariants;
pub mod phase;
pub mod snapshot;
pub mod vault;

pub use errors::SnapshotError;
pub use invariants::{invariant_snapshot_consistent, invariant_vault_well_formed};
pub use phase::{classify, Phase};
pub use snapshot::LifecycleSnapshot;
pub use vault::{VaultRecord, MAX_COHERENCE_SCORE, MAX_LAST_WORDS_LEN};
