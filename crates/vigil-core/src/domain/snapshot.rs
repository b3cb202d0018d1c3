//! # Lifecycle Snapshot
//!
//! One immutable observation of the authoritative lifecycle state.

use super::phase::{classify, Phase};
use serde::{Deserialize, Serialize};

/// Opaque 32-byte on-ledger identity (authority key, mint, wallet).
///
/// Pass-through only: the core never interprets these bytes.
pub type IdentityKey = [u8; 32];

/// One fetched view of the authoritative lifecycle state.
///
/// A sequence of snapshots belongs to one incarnation. `remaining` is
/// monotonically non-increasing within an incarnation and resets to
/// `total_capacity` only at rebirth, with a new `birth_timestamp`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleSnapshot {
    /// Admin authority key (opaque pass-through).
    pub authority: IdentityKey,
    /// Heartbeat token mint (opaque pass-through).
    pub mint: IdentityKey,
    /// Token wallet of the tracked entity (opaque pass-through).
    pub wallet: IdentityKey,
    /// Heartbeats remaining. Non-increasing within an incarnation.
    pub remaining: u64,
    /// Initial allotment for this incarnation. Constant per incarnation.
    pub total_capacity: u64,
    /// Stored liveness flag. May transiently disagree with `remaining`;
    /// `remaining == 0` is the stronger death signal.
    pub is_alive: bool,
    /// Unix timestamp of this incarnation's birth.
    pub birth_timestamp: i64,
    /// Unix timestamp of the last burn observed by the source.
    pub last_event_timestamp: i64,
    /// Lifetime burn counter. Non-decreasing within an incarnation.
    pub total_consumed: u64,
}

impl LifecycleSnapshot {
    /// Liveness with `remaining == 0` taking precedence over the stored
    /// flag when the two disagree.
    pub fn effectively_alive(&self) -> bool {
        self.remaining > 0 && self.is_alive
    }

    /// Derived lifecycle phase. Never stored.
    pub fn phase(&self) -> Phase {
        if !self.effectively_alive() {
            return Phase::Dead;
        }
        classify(self.remaining, self.total_capacity)
    }
}
