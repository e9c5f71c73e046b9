//! `PacketsInTheAir`: every packet between send and resolution.
//!
//! # Active and passive packets
//!
//! A broadcast is one physical transmission but k packets, one per neighbor.
//! Counting all k copies as interference would multiply the sender's power by
//! k, so only one copy (the one that stays in the air longest) is *active*;
//! the others are *passive*.  Passive packets are still tested for their own
//! disturbance, they just never contribute to anyone else's noise.
//!
//! # When interference is tested
//!
//! | Situation                          | Test                                       |
//! |------------------------------------|--------------------------------------------|
//! | synchronous mode                   | once per round, by the driver              |
//! | additive, any insert since last test | just before the next removal             |
//! | non-additive                       | before every removal                       |
//! | additive + asynchronous            | again after every removal                  |
//!
//! A test only ever flips packets from "will arrive" to "will not arrive".

use tracing::trace;

use ws_core::PacketId;

use crate::{DeliveryFailure, InterferenceModel, NoInterference, PacketHeader, Positions};

/// Scheduling facts the buffer needs to decide when to retest.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AirMode {
    /// Interference testing is enabled at all.
    pub interference: bool,
    /// Interference only grows while a packet is in the air.
    pub additive:     bool,
    /// The event-driven driver is running.
    pub asynchronous: bool,
}

impl Default for AirMode {
    fn default() -> Self {
        Self { interference: false, additive: true, asynchronous: false }
    }
}

/// The in-flight packet buffer.
pub struct PacketsInTheAir {
    active:  Vec<PacketHeader>,
    passive: Vec<PacketHeader>,
    model:   Box<dyn InterferenceModel>,
    mode:    AirMode,
    /// A packet was inserted since the last full test.
    dirty:   bool,
}

impl Default for PacketsInTheAir {
    fn default() -> Self {
        Self::new(Box::new(NoInterference), AirMode::default())
    }
}

impl PacketsInTheAir {
    pub fn new(model: Box<dyn InterferenceModel>, mode: AirMode) -> Self {
        Self { active: Vec::new(), passive: Vec::new(), model, mode, dirty: false }
    }

    pub fn mode(&self) -> AirMode {
        self.mode
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Add a packet that contributes to interference.
    pub fn add(&mut self, packet: PacketHeader) {
        self.active.push(packet);
        self.dirty = true;
    }

    /// Add a packet that is tested but never interferes with others.
    pub fn add_passive_packet(&mut self, packet: PacketHeader) {
        self.passive.push(packet);
        self.dirty = true;
    }

    /// Move a passive packet to the active list.  Returns `false` if `id` is
    /// not a passive packet.
    pub fn upgrade_to_active_packet(&mut self, id: PacketId) -> bool {
        match self.passive.iter().position(|p| p.id == id) {
            Some(i) => {
                let packet = self.passive.swap_remove(i);
                self.active.push(packet);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Take a packet out of the air, returning its header with the final
    /// delivery flag.
    pub fn remove(&mut self, id: PacketId, positions: &dyn Positions) -> Option<PacketHeader> {
        let removed = if let Some(i) = self.active.iter().position(|p| p.id == id) {
            self.active.remove(i)
        } else {
            let i = self.passive.iter().position(|p| p.id == id)?;
            self.passive.remove(i)
        };
        if self.mode.interference && self.mode.additive && self.mode.asynchronous {
            self.test_for_interference(positions);
        }
        Some(removed)
    }

    /// Retest before a packet leaves the air, if anything could have changed.
    ///
    /// Under additive interference a test is only owed when a packet was
    /// inserted since the last one; non-additive models are always retested.
    pub fn perform_interference_test_before_remove(&mut self, positions: &dyn Positions) {
        if !self.mode.interference {
            return;
        }
        if self.dirty || !self.mode.additive {
            self.test_for_interference(positions);
        }
    }

    // ── Testing ───────────────────────────────────────────────────────────

    /// Re-evaluate every packet that is still expected to arrive.
    ///
    /// All packets are judged against the same snapshot of the active list;
    /// flags are flipped afterwards.
    pub fn test_for_interference(&mut self, positions: &dyn Positions) {
        self.dirty = false;
        let model = self.model.as_ref();
        let active = self.active.as_slice();
        let hit = |p: &PacketHeader| p.positive_delivery() && model.is_disturbed(p, active, positions);

        let disturbed_active: Vec<usize> =
            active.iter().enumerate().filter(|(_, p)| hit(p)).map(|(i, _)| i).collect();
        let disturbed_passive: Vec<usize> =
            self.passive.iter().enumerate().filter(|(_, p)| hit(p)).map(|(i, _)| i).collect();

        for i in disturbed_active {
            trace!(packet = %self.active[i].id, "packet disturbed");
            self.active[i].mark_failed(DeliveryFailure::Disturbed);
        }
        for i in disturbed_passive {
            trace!(packet = %self.passive[i].id, "passive packet disturbed");
            self.passive[i].mark_failed(DeliveryFailure::Disturbed);
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn get(&self, id: PacketId) -> Option<&PacketHeader> {
        self.active.iter().chain(self.passive.iter()).find(|p| p.id == id)
    }

    pub fn contains(&self, id: PacketId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_active(&self, id: PacketId) -> bool {
        self.active.iter().any(|p| p.id == id)
    }

    pub fn active_packets(&self) -> &[PacketHeader] {
        &self.active
    }

    pub fn passive_packets(&self) -> &[PacketHeader] {
        &self.passive
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn passive_count(&self) -> usize {
        self.passive.len()
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.passive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.passive.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PacketHeader> + '_ {
        self.active.iter().chain(self.passive.iter())
    }
}
