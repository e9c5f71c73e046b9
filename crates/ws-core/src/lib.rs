//! `ws-core`: foundational types for the `wsim` wireless network simulator.
//!
//! This crate is a dependency of every other `ws-*` crate.  It intentionally
//! has no `ws-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `PacketId`                        |
//! | [`geo`]         | `Position`, `Area`, Euclidean distances               |
//! | [`time`]        | `SimTime`, `Round`, `SimClock`, `ExecutionMode`       |
//! | [`rng`]         | `NodeRng` (per-node), `SimRng` (global)               |
//! | [`config`]      | `SimConfig`, `ModelParams`, `TransmissionParams`, model selection |
//! | [`error`]       | `WsError`, `WsResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to load `SimConfig` from JSON/TOML files.         |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ConnectivityKind, MobilityParams, ModelParams, SimConfig, TransmissionParams};
pub use error::{WsError, WsResult};
pub use geo::{Area, Position};
pub use ids::{EdgeId, NodeId, PacketId};
pub use rng::{NodeRng, SimRng};
pub use time::{ExecutionMode, Round, SimClock, SimTime};
