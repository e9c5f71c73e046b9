//! The send side and the receive side of the delivery pipeline.
//!
//! ```text
//! send ─▶ edge? ─▶ transmission time ─▶ reliability ─▶ air buffer ─▶ arrival event
//!                                                                        │
//!            inbox of the receiver ◀── delivered ◀── resolve ◀───────────┘
//!            NACK inbox of the sender ◀── failed (if NACKs are on)
//! ```
//!
//! A failed packet still travels: it is queued for its arrival time and,
//! with interference on, sits in the air like any other.  Only its outcome
//! differs.

use std::sync::Arc;

use tracing::trace;

use ws_core::{NodeId, PacketId, WsError};
use ws_node::{Message, NodeBehavior, Received};
use ws_radio::{DeliveryFailure, Endpoint, PacketHeader, PacketKind};

use crate::sim::{InFlight, SimEvent};
use crate::{SimObserver, SimResult, Simulation};

/// Where a resolved packet ended up.
pub(crate) enum Resolution {
    /// Pushed into the destination's inbox.
    Inbox(NodeId),
    /// Pushed into the sender's NACK inbox.
    Nack(NodeId),
    /// Counted and dropped.
    Discarded,
}

impl<N: NodeBehavior> Simulation<N> {
    fn next_packet_id(&mut self) -> PacketId {
        let id = PacketId(self.next_packet);
        self.next_packet += 1;
        id
    }

    fn endpoint(&self, node: NodeId) -> SimResult<Endpoint> {
        self.position(node)
            .map(|p| Endpoint::new(node, p))
            .ok_or_else(|| WsError::NodeNotFound(node).into())
    }

    /// The receiving end of a send.  A target that is not live resolves
    /// as not connected, so it is placed on top of the sender.
    fn target(&self, origin: Endpoint, to: NodeId) -> (Endpoint, bool) {
        match self.position(to) {
            Some(p) => (Endpoint::new(to, p), true),
            None => {
                trace!(from = %origin.id, %to, "send to a node that is not live");
                (Endpoint::new(to, origin.position), false)
            }
        }
    }

    /// Unicast over the edge `from → to`.  Without that edge, or when `to`
    /// is not a live node, the packet is sent anyway and resolves as not
    /// connected.
    pub(crate) fn send(
        &mut self,
        from:      NodeId,
        to:        NodeId,
        message:   N::Msg,
        intensity: Option<f64>,
    ) -> SimResult<()> {
        let origin = self.endpoint(from)?;
        let (destination, live) = self.target(origin, to);
        let now = self.clock.time;
        let edge = self.graph.edge_between(from, to).filter(|_| live);
        let delay = self.models.transmission.time_to_reach(origin, destination, message.size());

        let mut header = PacketHeader::new(
            self.next_packet_id(),
            from,
            to,
            edge,
            PacketKind::Unicast,
            intensity.unwrap_or(self.params.default_intensity),
            now,
            now + delay,
        );
        if edge.is_none() {
            header.mark_failed(DeliveryFailure::NotConnected);
        } else if !self.models.reliability.reaches_destination(&header) {
            header.mark_failed(DeliveryFailure::Dropped);
        }

        let in_air = self.config.interference;
        if in_air {
            self.air.add(header.clone());
        }
        self.launch(header, Arc::new(message), in_air)
    }

    /// One packet per outgoing edge.  Only the copy that stays in the air
    /// longest interferes with other traffic.
    pub(crate) fn broadcast(&mut self, from: NodeId, message: N::Msg, intensity: Option<f64>) -> SimResult<()> {
        let origin = self.endpoint(from)?;
        let targets: Vec<_> = self.graph.out_edges(from).map(|e| (e.id, e.end)).collect();
        if targets.is_empty() {
            trace!(node = %from, "broadcast without neighbors");
            return Ok(());
        }

        let now = self.clock.time;
        let intensity = intensity.unwrap_or(self.params.default_intensity);
        let size = message.size();
        let shared = N::Msg::READ_ONLY.then(|| Arc::new(message.clone()));

        let mut longest: Option<(f64, PacketId)> = None;
        let mut copies = Vec::with_capacity(targets.len());
        for (edge, to) in targets {
            let destination = self.endpoint(to)?;
            let delay = self.models.transmission.time_to_reach(origin, destination, size);
            let mut header = PacketHeader::new(
                self.next_packet_id(),
                from,
                to,
                Some(edge),
                PacketKind::Multicast,
                intensity,
                now,
                now + delay,
            );
            if !self.models.reliability.reaches_destination(&header) {
                header.mark_failed(DeliveryFailure::Dropped);
            }
            if longest.is_none_or(|(d, _)| delay > d) {
                longest = Some((delay, header.id));
            }
            let payload = match &shared {
                Some(arc) => Arc::clone(arc),
                None => Arc::new(message.clone()),
            };
            copies.push((header, payload));
        }

        let in_air = self.config.interference;
        if in_air {
            for (header, _) in &copies {
                self.air.add_passive_packet(header.clone());
            }
            if let Some((_, id)) = longest {
                self.air.upgrade_to_active_packet(id);
            }
        }
        for (header, payload) in copies {
            self.launch(header, payload, in_air)?;
        }
        Ok(())
    }

    /// Out-of-band delivery: no edge, reliability or interference check.
    /// Only a target that is not live makes it fail.
    pub(crate) fn send_direct(&mut self, from: NodeId, to: NodeId, message: Arc<N::Msg>) -> SimResult<()> {
        let origin = self.endpoint(from)?;
        let (destination, live) = self.target(origin, to);
        let now = self.clock.time;
        let delay = self.models.transmission.time_to_reach(origin, destination, message.size());
        let mut header = PacketHeader::new(
            self.next_packet_id(),
            from,
            to,
            None,
            PacketKind::Direct,
            self.params.default_intensity,
            now,
            now + delay,
        );
        if !live {
            header.mark_failed(DeliveryFailure::NotConnected);
        }
        self.launch(header, message, false)
    }

    fn launch(&mut self, header: PacketHeader, message: Arc<N::Msg>, in_air: bool) -> SimResult<()> {
        trace!(
            packet  = %header.id,
            from    = %header.origin,
            to      = %header.destination,
            kind    = ?header.kind,
            arrival = %header.arrival_time,
            "packet sent"
        );
        self.queue
            .insert(header.sending_time, header.arrival_time, SimEvent::PacketArrival(header.id))?;
        self.packets.insert(header.id, InFlight { header, message, in_air });
        Ok(())
    }

    /// Settle a packet at its arrival time: final interference check,
    /// observer notification, then hand-off to an inbox.
    pub(crate) fn resolve_packet<O: SimObserver>(&mut self, id: PacketId, observer: &mut O) -> Resolution {
        let Some(flight) = self.packets.remove(&id) else {
            return Resolution::Discarded;
        };
        let header = if flight.in_air {
            self.air.perform_interference_test_before_remove(&self.positions);
            self.air.remove(id, &self.positions).unwrap_or(flight.header)
        } else {
            flight.header
        };

        let outcome = header.outcome();
        trace!(packet = %id, %outcome, "packet resolved");
        observer.on_packet_resolved(&header, outcome);
        self.round_stats.record(outcome);

        if header.positive_delivery() {
            let node = header.destination;
            if let Some(slot) = self.slot_mut(node) {
                slot.inbox.push(Received::new(header, flight.message));
                return Resolution::Inbox(node);
            }
        } else if self.config.generate_nacks {
            let node = header.origin;
            if let Some(slot) = self.slot_mut(node) {
                slot.nacks.push(Received::new(header, flight.message));
                return Resolution::Nack(node);
            }
        }
        Resolution::Discarded
    }
}
