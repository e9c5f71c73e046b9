//! `ws-schedule`: when things happen.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`event_queue`] | `EventQueue<E>` (`BTreeMap<(SimTime, seq), E>`), `Event` |
//! | [`timer`]       | `TimerHandle`, `TimerBag<T>`, fire-time validation       |
//! | [`error`]       | `ScheduleError`, `ScheduleResult<T>`                     |
//!
//! # Two scheduling modes
//!
//! ```text
//! asynchronous:  EventQueue:   pop earliest (time, seq), advance clock, fire
//! synchronous:   TimerBag:     unsorted per-node / global bags, drained once
//!                               per round for everything due by round end
//! ```
//!
//! Both reject fire times that are not strictly in the future.  Cancelling a
//! timer flips the flag behind its `TimerHandle`; the entry stays queued and
//! is discarded when it comes due.

pub mod error;
pub mod event_queue;
pub mod timer;


pub use error::{ScheduleError, ScheduleResult};
pub use event_queue::{Event, EventId, EventQueue};
pub use timer::{TimerBag, TimerHandle, absolute_fire_time, relative_fire_time};
