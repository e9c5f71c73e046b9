//! Simulation time model.
//!
//! # Design
//!
//! Time is a continuous `SimTime` (an `f64` with a total order) shared by
//! both execution modes:
//!
//! - **Synchronous**: the clock advances by exactly `1.0` per round, so
//!   `time == round` at every round boundary.  Messages and timers may carry
//!   fractional times; they take effect in the first round at or after them.
//! - **Asynchronous**: the clock jumps to the fire time of each event popped
//!   from the event queue.  `round` stays at zero.
//!
//! `SimClock` is owned by the simulation and handed out by shared reference;
//! nothing outside the drivers mutates it.

use std::cmp::Ordering;
use std::fmt;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute point in simulated time.
///
/// Equality and ordering use `f64::total_cmp`, so `SimTime` can key a
/// priority queue.  Constructors never produce NaN in practice; a NaN would
/// sort after every finite time.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// `true` if `self` lies strictly after `now`.
    #[inline]
    pub fn is_after(self, now: SimTime) -> bool {
        self > now
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.4}", self.0)
    }
}

// ── Round ─────────────────────────────────────────────────────────────────────

/// Synchronous-mode round counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round(pub u64);

impl Round {
    pub const ZERO: Round = Round(0);

    #[inline]
    pub fn next(self) -> Round {
        Round(self.0 + 1)
    }

    /// The simulated time at the end of this round.
    #[inline]
    pub fn as_time(self) -> SimTime {
        SimTime(self.0 as f64)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

// ── ExecutionMode ─────────────────────────────────────────────────────────────

/// Which driver runs the simulation.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExecutionMode {
    /// Round-based: every node steps once per round.
    #[default]
    Synchronous,
    /// Event-driven: the clock jumps from event to event.
    Asynchronous,
}

impl ExecutionMode {
    #[inline]
    pub fn is_async(self) -> bool {
        matches!(self, ExecutionMode::Asynchronous)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The read-only view of "now" shared with models and node callbacks.
#[derive(Clone, Debug)]
pub struct SimClock {
    pub mode:  ExecutionMode,
    pub time:  SimTime,
    /// Completed-round counter.  Always zero in asynchronous mode.
    pub round: Round,
}

impl SimClock {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode, time: SimTime::ZERO, round: Round::ZERO }
    }

    /// Advance by one synchronous round.
    #[inline]
    pub fn advance_round(&mut self) {
        self.round = self.round.next();
        self.time = self.round.as_time();
    }

    /// Jump to the fire time of an asynchronous event.
    ///
    /// # Panics
    /// Panics in debug mode if `time` lies in the past.
    #[inline]
    pub fn advance_to(&mut self, time: SimTime) {
        debug_assert!(time >= self.time, "clock moved backwards: {} -> {}", self.time, time);
        self.time = time;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ExecutionMode::Synchronous  => write!(f, "{} ({})", self.round, self.time),
            ExecutionMode::Asynchronous => write!(f, "{}", self.time),
        }
    }
}
