//! In-memory realization of the shared event queue
//!
//! A `BTreeMap` keyed by [`QueueKey`] gives the total order and the two
//! range probes directly. Insertion stamps each entry with a monotonically
//! increasing sequence number so identical `(time, tag)` pairs stay
//! distinct and drain in arrival order.

use crate::{QueueKey, SharedEventQueue};
use sim_types::{PriorityTag, RtosEvent, SimTime};
use std::collections::BTreeMap;
use std::ops::Bound;

/// The one queue shared by every kernel instance of a run
///
/// Owned by the outer driver; instances receive it by reference on each
/// step. All state is inspectable, which the tests lean on heavily.
#[derive(Debug, Clone, Default)]
pub struct GlobalEventQueue {
    entries: BTreeMap<QueueKey, RtosEvent>,
    next_seq: u64,
}

impl GlobalEventQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over pending entries in key order (for inspection)
    pub fn iter(&self) -> impl Iterator<Item = (&QueueKey, &RtosEvent)> {
        self.entries.iter()
    }
}

impl SharedEventQueue for GlobalEventQueue {
    fn insert(&mut self, tag: PriorityTag, time: SimTime, event: RtosEvent) -> QueueKey {
        let key = QueueKey {
            time,
            tag,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(key, event);
        key
    }

    fn peek_earliest(&self) -> Option<(QueueKey, &RtosEvent)> {
        self.entries.iter().next().map(|(k, e)| (*k, e))
    }

    fn first_at_or_after(&self, time: SimTime, tag: PriorityTag) -> Option<(QueueKey, &RtosEvent)> {
        let floor = QueueKey::probe_floor(time, tag);
        self.entries
            .range((Bound::Included(floor), Bound::Unbounded))
            .next()
            .map(|(k, e)| (*k, e))
    }

    fn first_after(&self, time: SimTime, tag: PriorityTag) -> Option<(QueueKey, &RtosEvent)> {
        let ceiling = QueueKey::probe_ceiling(time, tag);
        self.entries
            .range((Bound::Included(ceiling), Bound::Unbounded))
            .next()
            .map(|(k, e)| (*k, e))
    }

    fn remove_earliest(&mut self) -> Option<(QueueKey, RtosEvent)> {
        let key = *self.entries.keys().next()?;
        let event = self.entries.remove(&key)?;
        Some((key, event))
    }

    fn remove(&mut self, key: &QueueKey) -> Option<RtosEvent> {
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_types::{NativePriority, RtosEventKind, TaskName};

    fn tag(band: u32, native: u32) -> PriorityTag {
        PriorityTag::new(band, NativePriority::new(native))
    }

    fn evt(task: &str, ticks: u64) -> RtosEvent {
        RtosEvent::new(
            RtosEventKind::InstructionEnd,
            TaskName::new(task),
            SimTime::from_ticks(ticks),
        )
    }

    fn at(ticks: u64) -> SimTime {
        SimTime::from_ticks(ticks)
    }

    #[test]
    fn test_empty_queue() {
        let queue = GlobalEventQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.peek_earliest().is_none());
        assert!(queue.first_at_or_after(at(0), tag(0, 0)).is_none());
    }

    #[test]
    fn test_peek_earliest_orders_by_time_first() {
        let mut queue = GlobalEventQueue::new();
        queue.insert(tag(0, 0), at(9), evt("a", 9));
        queue.insert(tag(50, 0), at(5), evt("b", 5));
        queue.insert(tag(0, 0), at(7), evt("c", 7));

        let (key, event) = queue.peek_earliest().unwrap();
        assert_eq!(key.time, at(5));
        assert_eq!(event.task, TaskName::new("b"));
        // Peek does not remove
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_band_breaks_same_tick_ties() {
        let mut queue = GlobalEventQueue::new();
        queue.insert(tag(50, 0), at(5), evt("high", 5));
        queue.insert(tag(0, 3), at(5), evt("low", 5));

        let (key, event) = queue.peek_earliest().unwrap();
        assert_eq!(key.tag.band_base(), 0);
        assert_eq!(event.task, TaskName::new("low"));
    }

    #[test]
    fn test_sequence_preserves_arrival_order() {
        let mut queue = GlobalEventQueue::new();
        queue.insert(tag(0, 0), at(5), evt("first", 5));
        queue.insert(tag(0, 0), at(5), evt("second", 5));

        let (_, e1) = queue.remove_earliest().unwrap();
        let (_, e2) = queue.remove_earliest().unwrap();
        assert_eq!(e1.task, TaskName::new("first"));
        assert_eq!(e2.task, TaskName::new("second"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_first_at_or_after_is_inclusive() {
        let mut queue = GlobalEventQueue::new();
        let key = queue.insert(tag(50, 0), at(5), evt("mine", 5));

        let (found, _) = queue.first_at_or_after(at(5), tag(50, 0)).unwrap();
        assert_eq!(found, key);
    }

    #[test]
    fn test_first_after_is_exclusive() {
        let mut queue = GlobalEventQueue::new();
        queue.insert(tag(50, 0), at(5), evt("same_slot", 5));
        let later = queue.insert(tag(0, 0), at(6), evt("later", 6));

        // Everything at (5, band 50) is skipped, including seq ties.
        let (found, _) = queue.first_after(at(5), tag(50, 0)).unwrap();
        assert_eq!(found, later);
    }

    #[test]
    fn test_probe_skips_lower_bands_at_same_tick() {
        let mut queue = GlobalEventQueue::new();
        queue.insert(tag(0, 2), at(5), evt("other", 5));
        let mine = queue.insert(tag(50, 1), at(5), evt("mine", 5));

        let (found, _) = queue.first_at_or_after(at(5), tag(50, 0)).unwrap();
        assert_eq!(found, mine);
    }

    #[test]
    fn test_remove_by_key() {
        let mut queue = GlobalEventQueue::new();
        let key = queue.insert(tag(0, 0), at(5), evt("a", 5));
        queue.insert(tag(0, 0), at(6), evt("b", 6));

        let removed = queue.remove(&key).unwrap();
        assert_eq!(removed.task, TaskName::new("a"));
        assert_eq!(queue.len(), 1);
        assert!(queue.remove(&key).is_none());
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut queue = GlobalEventQueue::new();
        queue.insert(tag(0, 0), at(5), evt("a", 5));
        queue.insert(tag(50, 0), at(6), evt("b", 6));

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.remove_earliest().is_none());
    }

    #[test]
    fn test_sequence_numbers_survive_clear() {
        // Keys issued after a clear never collide with keys issued before.
        let mut queue = GlobalEventQueue::new();
        let before = queue.insert(tag(0, 0), at(5), evt("a", 5));
        queue.clear();
        let after = queue.insert(tag(0, 0), at(5), evt("b", 5));
        assert_ne!(before, after);
    }

    #[test]
    fn test_deterministic_drain_order() {
        let build = || {
            let mut queue = GlobalEventQueue::new();
            queue.insert(tag(50, 1), at(9), evt("a", 9));
            queue.insert(tag(0, 0), at(9), evt("b", 9));
            queue.insert(tag(0, 3), at(2), evt("c", 2));
            queue
        };
        let mut q1 = build();
        let mut q2 = build();
        while let Some((k1, _)) = q1.remove_earliest() {
            let (k2, _) = q2.remove_earliest().unwrap();
            assert_eq!(k1, k2);
        }
        assert!(q2.is_empty());
    }
}
