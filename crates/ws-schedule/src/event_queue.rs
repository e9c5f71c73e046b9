//! `EventQueue`: time-ordered queue for the asynchronous driver.
//!
//! # Ordering
//!
//! Entries are keyed by `(fire_time, seq)` where `seq` is a per-queue
//! insertion counter.  Two events at the same time therefore fire in the
//! order they were inserted, which makes a replay with the same seed
//! reproduce the same interleaving.
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log n) insert and O(log n) pop-first.  Cancelled timers
//! are not removed from the queue (see [`TimerHandle`][crate::TimerHandle]);
//! they are popped like any other event and skipped by the driver.

use std::collections::BTreeMap;

use ws_core::SimTime;

use crate::{ScheduleError, ScheduleResult};

/// Insertion sequence number of an event.  Unique per queue.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EventId(pub u64);

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct EventKey {
    time: SimTime,
    seq:  u64,
}

/// An event popped from the queue.
#[derive(Debug)]
pub struct Event<E> {
    pub id:      EventId,
    pub time:    SimTime,
    pub payload: E,
}

/// A priority queue of future events.
pub struct EventQueue<E> {
    inner:    BTreeMap<EventKey, E>,
    next_seq: u64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { inner: BTreeMap::new(), next_seq: 0 }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire at `time`.
    ///
    /// Fails if `time` is not strictly after `now`; the queue never holds an
    /// event the clock has already passed.
    pub fn insert(&mut self, now: SimTime, time: SimTime, payload: E) -> ScheduleResult<EventId> {
        if !time.is_after(now) || time.as_f64().is_nan() {
            return Err(ScheduleError::NotInFuture { time, now });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.inner.insert(EventKey { time, seq }, payload);
        Ok(EventId(seq))
    }

    /// Remove and return the earliest event.
    pub fn extract_next(&mut self) -> Option<Event<E>> {
        let (key, payload) = self.inner.pop_first()?;
        Some(Event { id: EventId(key.seq), time: key.time, payload })
    }

    /// Fire time of the earliest event, or `None` if empty.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.inner.keys().next().map(|k| k.time)
    }

    pub fn has_next(&self) -> bool {
        !self.inner.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Drop every event whose payload fails `keep`.
    ///
    /// Used when a node is removed from the simulation: events targeting it
    /// must never fire.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&E) -> bool,
    {
        self.inner.retain(|_, e| keep(e));
    }

    /// Iterate pending payloads in firing order.
    pub fn iter(&self) -> impl Iterator<Item = (SimTime, &E)> + '_ {
        self.inner.iter().map(|(k, e)| (k.time, e))
    }
}
