//! # Shared Event Queue
//!
//! One globally ordered store of pending events, shared by every kernel
//! instance in a co-simulation run.
//!
//! ## Philosophy
//!
//! - **One queue, N timelines**: instances never own queue structure. They
//!   see their own timeline only through the priority tags on the events
//!   they raise, and through the two range probes this crate exposes.
//! - **Determinism first**: ordering is total. Entries compare by
//!   `(time, band, native, seq)` where `seq` is assigned at insertion, so
//!   two runs with the same inserts drain in the same order.
//! - **Mechanism, not policy**: the queue does not know what a band is for.
//!   Band allocation and the wakeup search live in the kernel crate.

pub mod global;

pub use global::GlobalEventQueue;

use serde::{Deserialize, Serialize};
use sim_types::{PriorityTag, RtosEvent, SimTime};
use std::fmt;

/// Total-order key of one queue entry
///
/// `time` dominates, then the priority tag (band base, then native
/// priority), then the insertion sequence number as the final tie-break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct QueueKey {
    /// Occurrence time
    pub time: SimTime,
    /// Band-tagged priority
    pub tag: PriorityTag,
    /// Insertion sequence number, assigned by the queue
    pub seq: u64,
}

impl QueueKey {
    /// The smallest key at `(time, tag)`; inclusive probe bound
    pub fn probe_floor(time: SimTime, tag: PriorityTag) -> Self {
        Self { time, tag, seq: 0 }
    }

    /// The largest key at `(time, tag)`; exclusive probe bound
    ///
    /// Sequence numbers are allocated from zero and never reach `u64::MAX`,
    /// so no stored entry compares equal to this bound.
    pub fn probe_ceiling(time: SimTime, tag: PriorityTag) -> Self {
        Self {
            time,
            tag,
            seq: u64::MAX,
        }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, #{})", self.time, self.tag, self.seq)
    }
}

/// The queue contract consumed by kernel instances
///
/// All access is single-threaded: the outer driver serializes every call
/// (the co-simulation step protocol is cooperative, see the kernel crate).
pub trait SharedEventQueue {
    /// Inserts an event under a tagged priority and returns its key
    fn insert(&mut self, tag: PriorityTag, time: SimTime, event: RtosEvent) -> QueueKey;

    /// Returns the globally earliest entry without removing it
    fn peek_earliest(&self) -> Option<(QueueKey, &RtosEvent)>;

    /// Returns the first entry at or after `(time, tag)` in key order
    fn first_at_or_after(&self, time: SimTime, tag: PriorityTag) -> Option<(QueueKey, &RtosEvent)>;

    /// Returns the first entry strictly after `(time, tag)` in key order
    fn first_after(&self, time: SimTime, tag: PriorityTag) -> Option<(QueueKey, &RtosEvent)>;

    /// Removes and returns the globally earliest entry
    fn remove_earliest(&mut self) -> Option<(QueueKey, RtosEvent)>;

    /// Removes the entry with the given key, if present
    fn remove(&mut self, key: &QueueKey) -> Option<RtosEvent>;

    /// Discards every pending event
    fn clear(&mut self);

    /// Returns the number of pending events
    fn len(&self) -> usize;

    /// Returns whether no events are pending
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_types::NativePriority;

    fn tag(band: u32, native: u32) -> PriorityTag {
        PriorityTag::new(band, NativePriority::new(native))
    }

    #[test]
    fn test_key_order_time_dominates() {
        let early = QueueKey::probe_floor(SimTime::from_ticks(1), tag(100, 3));
        let late = QueueKey::probe_floor(SimTime::from_ticks(2), tag(0, 0));
        assert!(early < late);
    }

    #[test]
    fn test_key_order_band_breaks_time_ties() {
        let t = SimTime::from_ticks(5);
        let low_band = QueueKey::probe_floor(t, tag(0, 49));
        let high_band = QueueKey::probe_floor(t, tag(50, 0));
        assert!(low_band < high_band);
    }

    #[test]
    fn test_probe_bounds_bracket_sequence_numbers() {
        let t = SimTime::from_ticks(5);
        let stored = QueueKey {
            time: t,
            tag: tag(0, 0),
            seq: 12,
        };
        assert!(QueueKey::probe_floor(t, tag(0, 0)) <= stored);
        assert!(stored < QueueKey::probe_ceiling(t, tag(0, 0)));
    }
}
