//! Cancellable timer queue
//!
//! Delayed and periodic work is queued as [`Effect`] messages and handed back
//! in due-time order (ties broken by scheduling order) so the session can
//! apply each one through its single update path.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::state::EntityId;

/// Work a timer performs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Random-walk every patroller (periodic)
    PatrolTick,
    /// Random-walk every hazard (periodic)
    HazardTick,
    /// Drop an exploded bomb from the registry
    RemoveBomb(EntityId),
    /// Put the player back on the respawn tile
    RespawnPlayer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    effect: Effect,
}

impl Ord for Scheduled {
    // Reversed so the BinaryHeap pops the earliest entry first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    now_ms: u64,
    next_seq: u64,
    queue: BinaryHeap<Scheduled>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock (ms since session start)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queue `effect` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, effect: Effect) {
        self.schedule_at(self.now_ms.saturating_add(delay_ms), effect);
    }

    pub fn schedule_at(&mut self, due_ms: u64, effect: Effect) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due_ms,
            seq,
            effect,
        });
    }

    /// Pop the next effect due at or before `until_ms`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(u64, Effect)> {
        if self.queue.peek()?.due_ms > until_ms {
            return None;
        }
        let next = self.queue.pop()?;
        self.now_ms = self.now_ms.max(next.due_ms);
        Some((next.due_ms, next.effect))
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, effect: Effect) -> bool {
        self.queue.iter().any(|s| s.effect == effect)
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_due_order() {
        let mut timers = Timers::new();
        timers.schedule(2000, Effect::HazardTick);
        timers.schedule(1500, Effect::PatrolTick);
        timers.schedule(200, Effect::RespawnPlayer);

        assert_eq!(timers.pop_due(5000), Some((200, Effect::RespawnPlayer)));
        assert_eq!(timers.now_ms(), 200);
        assert_eq!(timers.pop_due(5000), Some((1500, Effect::PatrolTick)));
        assert_eq!(timers.pop_due(5000), Some((2000, Effect::HazardTick)));
        assert_eq!(timers.pop_due(5000), None);
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut timers = Timers::new();
        timers.schedule(1000, Effect::RemoveBomb(3));
        timers.schedule(1000, Effect::RemoveBomb(1));

        assert_eq!(timers.pop_due(1000), Some((1000, Effect::RemoveBomb(3))));
        assert_eq!(timers.pop_due(1000), Some((1000, Effect::RemoveBomb(1))));
    }

    #[test]
    fn test_not_yet_due() {
        let mut timers = Timers::new();
        timers.schedule(200, Effect::RespawnPlayer);
        assert_eq!(timers.pop_due(199), None);
        assert_eq!(timers.pending(), 1);
        assert!(timers.is_pending(Effect::RespawnPlayer));
    }

    #[test]
    fn test_clear_cancels() {
        let mut timers = Timers::new();
        timers.schedule(10, Effect::PatrolTick);
        timers.schedule(20, Effect::RemoveBomb(1));
        timers.clear();
        assert_eq!(timers.pending(), 0);
        assert_eq!(timers.pop_due(u64::MAX), None);
    }
}
