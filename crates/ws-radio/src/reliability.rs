//! Reliability models: is a packet lost regardless of interference?

use ws_core::{SimRng, WsError};

use crate::{PacketHeader, RadioResult};

/// Evaluated once per packet, at send time.
pub trait ReliabilityModel {
    fn reaches_destination(&mut self, packet: &PacketHeader) -> bool;
}

/// Never drops anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReliableDelivery;

impl ReliabilityModel for ReliableDelivery {
    #[inline]
    fn reaches_destination(&mut self, _packet: &PacketHeader) -> bool {
        true
    }
}

/// Drops each packet independently with probability `drop_rate`.
pub struct LossyDelivery {
    drop_rate: f64,
    rng:       SimRng,
}

impl LossyDelivery {
    pub fn new(drop_rate: f64, rng: SimRng) -> RadioResult<Self> {
        if !(0.0..=1.0).contains(&drop_rate) {
            return Err(WsError::invalid_param("drop_rate", drop_rate, "a value in [0, 1]").into());
        }
        Ok(Self { drop_rate, rng })
    }

    pub fn drop_rate(&self) -> f64 {
        self.drop_rate
    }
}

impl ReliabilityModel for LossyDelivery {
    fn reaches_destination(&mut self, _packet: &PacketHeader) -> bool {
        // random() is in [0, 1): a rate of 0 never drops, a rate of 1 always does.
        self.rng.random::<f64>() >= self.drop_rate
    }
}
