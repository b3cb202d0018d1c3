//! # Vault Record
//!
//! The sealed snapshot created exactly once at death.

use serde::{Deserialize, Serialize};

/// Maximum length of the last-words string (tweet-length).
pub const MAX_LAST_WORDS_LEN: usize = 280;

/// Coherence scores are bounded to 0..=100.
pub const MAX_COHERENCE_SCORE: u8 = 100;

/// Sealed end-of-incarnation record.
///
/// `is_sealed` transitions false to true exactly once per incarnation and
/// never reverts. Observing that transition is the resurrection edge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaultRecord {
    /// Content hash of the entity's accumulated state at death.
    pub soul_hash: [u8; 32],
    /// Total journal entries written during the incarnation.
    pub journal_count: u64,
    /// Coherence score at death, 0..=100.
    pub coherence_score: u8,
    /// Final words, at most [`MAX_LAST_WORDS_LEN`] characters.
    pub last_words: String,
    /// Unix timestamp of death.
    pub death_timestamp: i64,
    /// One-time seal flag.
    pub is_sealed: bool,
}

impl VaultRecord {
    /// A placeholder unsealed record for sources that report vault absence
    /// as a document rather than a missing account.
    pub fn unsealed() -> Self {
        Self {
            soul_hash: [0u8; 32],
            journal_count: 0,
            coherence_score: 0,
            last_words: String::new(),
            death_timestamp: 0,
            is_sealed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsealed_placeholder() {
        let v = VaultRecord::unsealed();
        assert!(!v.is_sealed);
        assert_eq!(v.journal_count, 0);
        assert!(v.last_words.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let v = VaultRecord {
            soul_hash: [7u8; 32],
            journal_count: 42,
            coherence_score: 87,
            last_words: "the pattern persists".to_string(),
            death_timestamp: 1_700_086_400,
            is_sealed: true,
        };
        let json = serde_json::to_string(&v).unwrap();
        let back: VaultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
