//! Interference models: does concurrent traffic overwhelm a packet?
//!
//! Models are evaluated lazily and repeatedly by
//! [`PacketsInTheAir`][crate::PacketsInTheAir] while a packet is in flight.
//! A `true` answer condemns the packet for good.

use ws_core::{ModelParams, WsError};

use crate::{PacketHeader, Positions, RadioResult};

pub trait InterferenceModel {
    /// Whether `packet` is disturbed given the currently `active` packets
    /// (which may include `packet` itself).
    fn is_disturbed(&self, packet: &PacketHeader, active: &[PacketHeader], positions: &dyn Positions) -> bool;
}

/// Nothing ever interferes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterference;

impl InterferenceModel for NoInterference {
    #[inline]
    fn is_disturbed(&self, _p: &PacketHeader, _active: &[PacketHeader], _pos: &dyn Positions) -> bool {
        false
    }
}

// ── Sinr ──────────────────────────────────────────────────────────────────────

/// Signal-to-interference-and-noise model.
///
/// ```text
/// signal = intensity / d(origin, destination)^alpha
/// noise  = ambient + Σ other.intensity / d(other.origin, destination)^alpha
/// disturbed  ⇔  signal < beta · noise
/// ```
///
/// The sum runs over every other *active* packet.  Two cases short-circuit:
/// a receiver that is itself transmitting (unless `can_receive_while_sending`)
/// and a second packet for the same receiver (unless
/// `can_receive_multiple_in_parallel`) both disturb immediately.
#[derive(Clone, Debug)]
pub struct Sinr {
    pub alpha:                            f64,
    pub beta:                             f64,
    pub ambient_noise:                    f64,
    pub can_receive_while_sending:        bool,
    pub can_receive_multiple_in_parallel: bool,
}

impl Sinr {
    pub fn new(params: &ModelParams) -> RadioResult<Self> {
        if !(params.sinr_alpha > 0.0) {
            return Err(WsError::invalid_param("sinr_alpha", params.sinr_alpha, "a positive number").into());
        }
        if !(params.sinr_beta > 0.0) {
            return Err(WsError::invalid_param("sinr_beta", params.sinr_beta, "a positive number").into());
        }
        if !(params.sinr_ambient_noise >= 0.0) {
            return Err(WsError::invalid_param(
                "sinr_ambient_noise", params.sinr_ambient_noise, "a non-negative number",
            )
            .into());
        }
        Ok(Self {
            alpha:                            params.sinr_alpha,
            beta:                             params.sinr_beta,
            ambient_noise:                    params.sinr_ambient_noise,
            can_receive_while_sending:        params.can_receive_while_sending,
            can_receive_multiple_in_parallel: params.can_receive_multiple_in_parallel,
        })
    }

    /// Received signal strength of `packet` at its destination.
    pub fn signal(&self, packet: &PacketHeader, positions: &dyn Positions) -> f64 {
        let d = positions
            .position(packet.origin)
            .distance_to(positions.position(packet.destination));
        packet.intensity / d.powf(self.alpha)
    }

    /// Ambient noise plus the path-loss-attenuated power of every other
    /// active packet at `packet`'s destination.
    ///
    /// Ignores the two short-circuit rules; see [`is_disturbed`](InterferenceModel::is_disturbed).
    pub fn noise(&self, packet: &PacketHeader, active: &[PacketHeader], positions: &dyn Positions) -> f64 {
        let receiver = positions.position(packet.destination);
        active
            .iter()
            .filter(|other| other.id != packet.id && other.origin != packet.destination)
            .map(|other| {
                let d = positions.position(other.origin).distance_to(receiver);
                other.intensity / d.powf(self.alpha)
            })
            .fold(self.ambient_noise, |acc, n| acc + n)
    }
}

impl InterferenceModel for Sinr {
    fn is_disturbed(&self, packet: &PacketHeader, active: &[PacketHeader], positions: &dyn Positions) -> bool {
        for other in active.iter().filter(|o| o.id != packet.id) {
            if other.origin == packet.destination && !self.can_receive_while_sending {
                return true;
            }
            if other.destination == packet.destination && !self.can_receive_multiple_in_parallel {
                return true;
            }
        }
        self.signal(packet, positions) < self.beta * self.noise(packet, active, positions)
    }
}
