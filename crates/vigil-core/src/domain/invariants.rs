//! # Domain Invariants
//!
//! Check helpers for properties every well-formed observation satisfies.
//! Adapters call these after decoding; tests call them on constructed
//! fixtures.

use super::snapshot::LifecycleSnapshot;
use super::vault::{VaultRecord, MAX_COHERENCE_SCORE, MAX_LAST_WORDS_LEN};

/// A snapshot is consistent when its counters fit the incarnation's
/// allotment: `remaining <= total_capacity` and
/// `total_consumed <= total_capacity`.
pub fn invariant_snapshot_consistent(s: &LifecycleSnapshot) -> bool {
    s.remaining <= s.total_capacity && s.total_consumed <= s.total_capacity
}

/// A vault record is well-formed when its bounded fields are in range.
pub fn invariant_vault_well_formed(v: &VaultRecord) -> bool {
    v.coherence_score <= MAX_COHERENCE_SCORE && v.last_words.len() <= MAX_LAST_WORDS_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(remaining: u64, consumed: u64) -> LifecycleSnapshot {
        LifecycleSnapshot {
            authority: [0u8; 32],
            mint: [0u8; 32],
            wallet: [0u8; 32],
            remaining,
            total_capacity: 86_400,
            is_alive: remaining > 0,
            birth_timestamp: 0,
            last_event_timestamp: 0,
            total_consumed: consumed,
        }
    }

    #[test]
    fn test_consistent_snapshot() {
        assert!(invariant_snapshot_consistent(&snapshot(86_400, 0)));
        assert!(invariant_snapshot_consistent(&snapshot(0, 86_400)));
    }

    #[test]
    fn test_inconsistent_snapshot() {
        assert!(!invariant_snapshot_consistent(&snapshot(86_401, 0)));
        assert!(!invariant_snapshot_consistent(&snapshot(0, 86_401)));
    }

    #[test]
    fn test_vault_bounds() {
        let mut v = VaultRecord::unsealed();
        assert!(invariant_vault_well_formed(&v));

        v.coherence_score = 101;
        assert!(!invariant_vault_well_formed(&v));

        v.coherence_score = 100;
        v.last_words = "x".repeat(MAX_LAST_WORDS_LEN + 1);
        assert!(!invariant_vault_well_formed(&v));
    }
}
