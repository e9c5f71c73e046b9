//! `ws-radio`: everything that decides whether and when a packet arrives.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`packet`]       | `PacketHeader`, `PacketKind`, `DeliveryOutcome`, `Endpoint`, `Positions` |
//! | [`connectivity`] | `ConnectivityModel`, `UnitDiskGraph`, `QuasiUnitDiskGraph`  |
//! | [`transmission`] | `TransmissionModel`, `ConstantTime`, `RandomTime`          |
//! | [`reliability`]  | `ReliabilityModel`, `ReliableDelivery`, `LossyDelivery`    |
//! | [`interference`] | `InterferenceModel`, `NoInterference`, `Sinr`              |
//! | [`air`]          | `PacketsInTheAir` (active / passive partitions)            |
//! | [`error`]        | `RadioError`, `RadioResult<T>`                             |
//!
//! # Delivery pipeline (summary)
//!
//! ```text
//! send ─▶ connectivity (edge exists?) ─▶ transmission (arrival time)
//!      ─▶ reliability (drop?)         ─▶ air buffer (interference until arrival)
//! ```
//!
//! Each stage can only turn a packet from "will arrive" to "will not
//! arrive"; nothing turns it back.

pub mod air;
pub mod connectivity;
pub mod error;
pub mod interference;
pub mod packet;
pub mod reliability;
pub mod transmission;


pub use air::{AirMode, PacketsInTheAir};
pub use connectivity::{ConnectivityModel, QuasiUnitDiskGraph, UnitDiskGraph};
pub use error::{RadioError, RadioResult};
pub use interference::{InterferenceModel, NoInterference, Sinr};
pub use packet::{DeliveryFailure, DeliveryOutcome, Endpoint, PacketHeader, PacketKind, Positions};
pub use reliability::{LossyDelivery, ReliabilityModel, ReliableDelivery};
pub use transmission::{ConstantTime, MIN_TRANSMISSION_TIME, RandomTime, TransmissionModel};
