//! Timer bookkeeping shared by both execution modes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ws_core::SimTime;

use crate::{ScheduleError, ScheduleResult};

// ── Fire-time validation ──────────────────────────────────────────────────────

/// Fire time of a timer started `delay` after `now`.
///
/// A zero, negative or NaN delay is a configuration error, not something to
/// clamp.
pub fn relative_fire_time(now: SimTime, delay: f64) -> ScheduleResult<SimTime> {
    if !(delay > 0.0) {
        return Err(ScheduleError::NonPositiveDelay(delay));
    }
    Ok(now + delay)
}

/// Validate an absolute fire time against `now`.
pub fn absolute_fire_time(now: SimTime, time: SimTime) -> ScheduleResult<SimTime> {
    if !time.is_after(now) || time.as_f64().is_nan() {
        return Err(ScheduleError::NotInFuture { time, now });
    }
    Ok(time)
}

// ── TimerHandle ───────────────────────────────────────────────────────────────

/// Cancellation flag of a started timer.
///
/// Cloning shares the flag.  `deactivate` is O(1): the timer stays in its
/// queue or bag and is dropped unfired when it comes due.
#[derive(Clone, Debug)]
pub struct TimerHandle(Arc<AtomicBool>);

impl TimerHandle {
    /// A fresh, active handle.
    pub fn new() -> Self {
        TimerHandle(Arc::new(AtomicBool::new(true)))
    }

    pub fn deactivate(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

// ── TimerBag ──────────────────────────────────────────────────────────────────

/// Unsorted per-owner timer storage for the synchronous driver.
///
/// Pushing is O(1).  Once per round the driver takes everything due by the
/// end of that round with [`drain_due`](Self::drain_due).
pub struct TimerBag<T> {
    items:    Vec<(SimTime, u64, T)>,
    next_seq: u64,
}

impl<T> Default for TimerBag<T> {
    fn default() -> Self {
        Self { items: Vec::new(), next_seq: 0 }
    }
}

impl<T> TimerBag<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: SimTime, item: T) {
        self.items.push((time, self.next_seq, item));
        self.next_seq += 1;
    }

    /// Remove every item with `time <= now`, ordered by `(time, insertion)`.
    pub fn drain_due(&mut self, now: SimTime) -> Vec<(SimTime, T)> {
        if self.items.iter().all(|(t, _, _)| *t > now) {
            return Vec::new();
        }
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.items).into_iter().partition(|(t, _, _)| *t <= now);
        self.items = rest;
        due.sort_by_key(|(t, seq, _)| (*t, *seq));
        due.into_iter().map(|(t, _, item)| (t, item)).collect()
    }

    /// Earliest pending fire time.
    pub fn next_time(&self) -> Option<SimTime> {
        self.items.iter().map(|(t, _, _)| *t).min()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
