//! `ws-mobility`: where nodes start and how they move.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                     |
//! |------------------|--------------------------------------------------------------|
//! | [`distribution`] | `DistributionModel`, `RandomDistribution`, `GridDistribution`, `LineDistribution` |
//! | [`model`]        | `MobilityModel`, `NoMobility`, `RandomWaypoint`              |
//! | [`state`]        | `WaypointState`: per-node leg of a random waypoint walk     |
//! | [`error`]        | `MobilityError`, `MobilityResult<T>`                         |
//!
//! # Movement model
//!
//! Mobility is applied by `ws-sim` to every node at once: after each round
//! in synchronous mode, and every `mobility_interval` time units in
//! asynchronous mode.  A model maps `(node, current position, elapsed time)`
//! to the next position; the spatial index and the connectivity graph are
//! refreshed afterwards.

pub mod distribution;
pub mod error;
pub mod model;
pub mod state;


pub use distribution::{DistributionModel, GridDistribution, LineDistribution, RandomDistribution};
pub use error::{MobilityError, MobilityResult};
pub use model::{MobilityModel, NoMobility, RandomWaypoint};
pub use state::WaypointState;
