//! Plain data row types written by output backends.

use ws_radio::{PacketHeader, PacketKind};
use ws_sim::RoundStats;

/// Outcome counters for one round (or the whole run, in asynchronous mode).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSummaryRow {
    pub round:          u64,
    pub time:           f64,
    pub delivered:      u64,
    pub dropped:        u64,
    pub disturbed:      u64,
    pub not_connected:  u64,
    pub edges:          u64,
    pub packets_in_air: u64,
}

impl From<&RoundStats> for RoundSummaryRow {
    fn from(stats: &RoundStats) -> Self {
        Self {
            round:          stats.round.0,
            time:           stats.time.as_f64(),
            delivered:      stats.delivered,
            dropped:        stats.dropped,
            disturbed:      stats.disturbed,
            not_connected:  stats.not_connected,
            edges:          stats.edges as u64,
            packets_in_air: stats.packets_in_air as u64,
        }
    }
}

/// One resolved packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryRow {
    pub packet:      u64,
    pub origin:      u32,
    pub destination: u32,
    pub kind:        &'static str,
    pub sent:        f64,
    pub arrived:     f64,
    pub outcome:     &'static str,
}

impl From<&PacketHeader> for DeliveryRow {
    fn from(header: &PacketHeader) -> Self {
        Self {
            packet:      header.id.0,
            origin:      header.origin.0,
            destination: header.destination.0,
            kind:        match header.kind {
                PacketKind::Unicast   => "unicast",
                PacketKind::Multicast => "multicast",
                PacketKind::Direct    => "direct",
            },
            sent:        header.sending_time.as_f64(),
            arrived:     header.arrival_time.as_f64(),
            outcome:     header.outcome().as_str(),
        }
    }
}
