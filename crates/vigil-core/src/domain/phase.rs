//! # Lifecycle Phase
//!
//! Phase classification as a pure function of the remaining/capacity ratio.
//!
//! Boundary convention: a boundary value belongs to the *lower* phase
//! (strict `>` on the upper bound), so exactly 75% of capacity is `Aware`,
//! exactly 25% is `Diminished`, exactly 5% is `Terminal`. The terminal
//! cutoff is 5% of capacity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase, ordered from most to least vitality.
///
/// Derived from a snapshot, never stored. `Dead` is absorbing: once
/// remaining hits zero, no other phase is reachable for that incarnation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// More than 75% of heartbeats remain.
    Nascent,
    /// More than 25%, up to and including 75%.
    Aware,
    /// More than 5%, up to and including 25%.
    Diminished,
    /// More than zero, up to and including 5%.
    Terminal,
    /// Zero heartbeats remain.
    Dead,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Nascent => "nascent",
            Phase::Aware => "aware",
            Phase::Diminished => "diminished",
            Phase::Terminal => "terminal",
            Phase::Dead => "dead",
        };
        f.write_str(s)
    }
}

impl Phase {
    /// Is this the absorbing terminal state?
    pub fn is_dead(&self) -> bool {
        matches!(self, Phase::Dead)
    }
}

/// Classify remaining heartbeats against total capacity.
///
/// Total over all inputs. Zero capacity classifies as `Dead` (an entity
/// that never had an allotment has nothing left to burn).
///
/// The ratio comparisons use u128 cross-multiplication so boundaries are
/// exact at any capacity - `remaining/total > 3/4` becomes
/// `4 * remaining > 3 * total` with no rounding.
pub fn classify(remaining: u64, total_capacity: u64) -> Phase {
    if remaining == 0 || total_capacity == 0 {
        return Phase::Dead;
    }

    let r = remaining as u128;
    let t = total_capacity as u128;

    if 4 * r > 3 * t {
        // > 75%
        Phase::Nascent
    } else if 4 * r > t {
        // > 25%
        Phase::Aware
    } else if 20 * r > t {
        // > 5%
        Phase::Diminished
    } else {
        Phase::Terminal
    }
}
