//! Packet headers and delivery outcomes.
//!
//! The radio models never see message payloads.  They work on a
//! [`PacketHeader`]: who sent it, to whom, how loud, and when it lands.  The
//! simulation keeps the payload next to the header and only looks at it when
//! the packet is resolved.

use std::fmt;

use ws_core::{EdgeId, NodeId, PacketId, Position, SimTime};

// ── Positions ─────────────────────────────────────────────────────────────────

/// Current position lookup by node handle.
pub trait Positions {
    fn position(&self, node: NodeId) -> Position;
}

impl Positions for [Position] {
    #[inline]
    fn position(&self, node: NodeId) -> Position {
        self[node.index()]
    }
}

impl Positions for Vec<Position> {
    #[inline]
    fn position(&self, node: NodeId) -> Position {
        self[node.index()]
    }
}

/// A node as seen by a model: its handle and where it currently is.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub id:       NodeId,
    pub position: Position,
}

impl Endpoint {
    pub fn new(id: NodeId, position: Position) -> Self {
        Self { id, position }
    }
}

// ── Packet kinds and outcomes ─────────────────────────────────────────────────

/// How a packet was sent.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum PacketKind {
    /// `send` to one neighbor over an edge.
    Unicast,
    /// One copy of a `broadcast` to every neighbor.
    Multicast,
    /// `send_direct`: no edge, no reliability or interference check.
    Direct,
}

/// Why a packet will not arrive.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum DeliveryFailure {
    /// Dropped by the reliability model at send time.
    Dropped,
    /// Overwhelmed by interference while in the air.
    Disturbed,
    /// No edge from the sender to the destination at send time.
    NotConnected,
}

/// Final fate of a packet, reported when it is resolved.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum DeliveryOutcome {
    Delivered,
    Dropped,
    Disturbed,
    NotConnected,
}

impl DeliveryOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered    => "delivered",
            DeliveryOutcome::Dropped      => "dropped",
            DeliveryOutcome::Disturbed    => "disturbed",
            DeliveryOutcome::NotConnected => "not_connected",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PacketHeader ──────────────────────────────────────────────────────────────

/// Everything the radio models need to know about one packet.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketHeader {
    pub id:           PacketId,
    pub origin:       NodeId,
    pub destination:  NodeId,
    /// The edge the packet was sent over; `None` for direct sends and sends
    /// to non-neighbors.
    pub edge:         Option<EdgeId>,
    pub kind:         PacketKind,
    /// Transmit signal intensity.
    pub intensity:    f64,
    pub sending_time: SimTime,
    pub arrival_time: SimTime,
    positive_delivery: bool,
    failure:           Option<DeliveryFailure>,
}

impl PacketHeader {
    /// A header that, so far, will be delivered.
    pub fn new(
        id:           PacketId,
        origin:       NodeId,
        destination:  NodeId,
        edge:         Option<EdgeId>,
        kind:         PacketKind,
        intensity:    f64,
        sending_time: SimTime,
        arrival_time: SimTime,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            edge,
            kind,
            intensity,
            sending_time,
            arrival_time,
            positive_delivery: true,
            failure: None,
        }
    }

    /// `true` while no stage has condemned the packet.
    #[inline]
    pub fn positive_delivery(&self) -> bool {
        self.positive_delivery
    }

    /// Condemn the packet.  The first reason sticks; a failed packet never
    /// becomes deliverable again.
    pub fn mark_failed(&mut self, reason: DeliveryFailure) {
        if self.positive_delivery {
            self.positive_delivery = false;
            self.failure = Some(reason);
        }
    }

    pub fn failure(&self) -> Option<DeliveryFailure> {
        self.failure
    }

    pub fn outcome(&self) -> DeliveryOutcome {
        match self.failure {
            None                                => DeliveryOutcome::Delivered,
            Some(DeliveryFailure::Dropped)      => DeliveryOutcome::Dropped,
            Some(DeliveryFailure::Disturbed)    => DeliveryOutcome::Disturbed,
            Some(DeliveryFailure::NotConnected) => DeliveryOutcome::NotConnected,
        }
    }

    /// Simulated time spent in the air.
    #[inline]
    pub fn transmission_time(&self) -> f64 {
        self.arrival_time - self.sending_time
    }
}
