//! # Derived Metrics
//!
//! Pure projections from a snapshot into the lifecycle vocabulary.

use crate::domain::LifecycleSnapshot;
use std::time::Duration;

/// Expected burn cadence: one heartbeat per minute.
///
/// Used to estimate time-to-death. The actual cadence may drift; the
/// estimate is advisory, not a guarantee.
pub const SECONDS_PER_HEARTBEAT: u64 = 60;

/// Estimated wall-clock time until death at the expected burn cadence.
///
/// Zero if the snapshot is not effectively alive.
pub fn time_to_death(snapshot: &LifecycleSnapshot) -> Duration {
    if !snapshot.effectively_alive() {
        return Duration::ZERO;
    }
    Duration::from_secs(snapshot.remaining.saturating_mul(SECONDS_PER_HEARTBEAT))
}

/// Fraction of the incarnation's allotment consumed so far, in `[0, 1]`.
///
/// Monotone non-decreasing over any real incarnation trace. Zero capacity
/// yields 0.0.
pub fn lifetime_progress(snapshot: &LifecycleSnapshot) -> f64 {
    if snapshot.total_capacity == 0 {
        return 0.0;
    }
    let ratio = snapshot.total_consumed as f64 / snapshot.total_capacity as f64;
    ratio.clamp(0.0, 1.0)
}
