//! Simulation observer trait for progress reporting and data collection.

use ws_core::{Round, SimTime};
use ws_radio::{DeliveryOutcome, PacketHeader};

use crate::{Edge, RoundStats};

/// Callbacks invoked by the drivers at key points of a run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// Edges created while the simulation is built are not reported; the first
/// `on_edge_added` calls come from the first connectivity pass of a run.
///
/// # Example: delivery ratio printer
///
/// ```rust,ignore
/// struct Ratio;
///
/// impl SimObserver for Ratio {
///     fn on_round_end(&mut self, round: Round, stats: &RoundStats) {
///         let total = stats.resolved().max(1);
///         println!("{round}: {:.2}", stats.delivered as f64 / total as f64);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Synchronous mode: before any node steps.
    fn on_round_start(&mut self, _round: Round) {}

    /// Synchronous mode: after timers, mobility and the connectivity pass.
    fn on_round_end(&mut self, _round: Round, _stats: &RoundStats) {}

    /// Asynchronous mode: the clock advanced to `time` for the next event.
    fn on_event(&mut self, _time: SimTime) {}

    /// A packet reached its arrival time; `outcome` is final.
    fn on_packet_resolved(&mut self, _packet: &PacketHeader, _outcome: DeliveryOutcome) {}

    fn on_edge_added(&mut self, _edge: &Edge) {}

    fn on_edge_removed(&mut self, _edge: &Edge) {}

    /// Once, after the run ends.  `totals` covers the whole run.
    fn on_sim_end(&mut self, _time: SimTime, _totals: &RoundStats) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
