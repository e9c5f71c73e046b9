//! `ws-node`: the user-facing node API.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`message`]  | `Message` trait, `Received<M>` (header + shared payload)          |
//! | [`inbox`]    | `Inbox<M>`: packets handed to `handle_messages` / `handle_nacks` |
//! | [`behavior`] | `NodeBehavior` trait                                              |
//! | [`timer`]    | `Timer<N>`, `GlobalTimer<N>`                                      |
//! | [`context`]  | `NodeCtx`, `GlobalCtx`, and the `Action` / `GlobalAction` they record |
//! | [`noop`]     | `NoopNode`: consumes every message, never sends                  |
//!
//! # Design notes
//!
//! Callbacks never touch the simulation directly.  Every send and timer
//! start is recorded as an [`Action`] in the context's outbox; `ws-sim`
//! applies the outbox after the callback returns.  Fire-time validation
//! happens eagerly, so a bad delay surfaces as an `Err` at the call site
//! and the returned [`TimerHandle`][ws_schedule::TimerHandle] is live
//! immediately.

pub mod behavior;
pub mod context;
pub mod inbox;
pub mod message;
pub mod noop;
pub mod timer;


pub use behavior::NodeBehavior;
pub use context::{Action, GlobalAction, GlobalCtx, NodeCtx};
pub use inbox::Inbox;
pub use message::{Message, Received};
pub use noop::NoopNode;
pub use timer::{GlobalTimer, Timer};
