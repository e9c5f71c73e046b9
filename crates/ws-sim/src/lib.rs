//! `ws-sim`: drivers and delivery pipeline for the `wsim` simulator.
//!
//! # Synchronous round
//!
//! ```text
//! for round in 1..=config.max_rounds:
//!   ① Interference: retest every packet in the air (if enabled).
//!   ② Arrivals:     resolve packets whose arrival time is ≤ round.
//!   ③ Step:         for each live node, ascending NodeId:
//!                      pre_step → handle_nacks → handle_messages → post_step
//!   ④ Timers:       due node timers, then due global timers.
//!   ⑤ Topology:     mobility, then the connectivity pass.
//! ```
//!
//! # Asynchronous events
//!
//! Events are totally ordered by `(time, insertion sequence)`.  The run ends
//! when the queue empties, the next event lies past `max_time`, or a global
//! timer requests a stop.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | FxHash for the edge lookup and in-flight packet maps.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ws_core::{ModelParams, SimConfig};
//! use ws_sim::{NoopObserver, SimBuilder};
//!
//! let nodes = (0..100).map(|_| Flood::default()).collect();
//! let mut sim = SimBuilder::new(SimConfig::default(), ModelParams::default(), nodes)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
mod delivery;
pub mod error;
pub mod graph;
pub mod observer;
pub mod sim;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use graph::{ConnectivityChange, Edge, Graph};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Simulation;
pub use stats::RoundStats;
