//! Per-round delivery counters.

use ws_core::{Round, SimTime};
use ws_radio::DeliveryOutcome;

/// Packet outcomes and graph size over one round (synchronous mode) or the
/// whole run (totals, and asynchronous mode).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoundStats {
    pub round:          Round,
    pub time:           SimTime,
    pub delivered:      u64,
    pub dropped:        u64,
    pub disturbed:      u64,
    pub not_connected:  u64,
    /// Edge count at the end of the period.
    pub edges:          usize,
    /// Packets still in flight at the end of the period.
    pub packets_in_air: usize,
}

impl RoundStats {
    pub fn new(round: Round, time: SimTime) -> Self {
        Self { round, time, ..Self::default() }
    }

    pub fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered    => self.delivered += 1,
            DeliveryOutcome::Dropped      => self.dropped += 1,
            DeliveryOutcome::Disturbed    => self.disturbed += 1,
            DeliveryOutcome::NotConnected => self.not_connected += 1,
        }
    }

    /// Every packet resolved in the period.
    pub fn resolved(&self) -> u64 {
        self.delivered + self.dropped + self.disturbed + self.not_connected
    }

    /// Fold a finished round into running totals.
    pub fn accumulate(&mut self, round: &RoundStats) {
        self.round = round.round;
        self.time = round.time;
        self.delivered += round.delivered;
        self.dropped += round.dropped;
        self.disturbed += round.disturbed;
        self.not_connected += round.not_connected;
        self.edges = round.edges;
        self.packets_in_air = round.packets_in_air;
    }
}
