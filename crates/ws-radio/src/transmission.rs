//! Message transmission models: how long a packet spends in the air.

use rand::distributions::{Distribution, Uniform};
use rand_distr::{Exp, Normal};

use ws_core::{SimRng, TransmissionParams};

use crate::{Endpoint, RadioError, RadioResult};

/// Smallest transmission time any model returns.  Keeps arrival times
/// strictly in the future even when a distribution samples zero or less.
pub const MIN_TRANSMISSION_TIME: f64 = 1e-9;

pub trait TransmissionModel {
    /// Time from sending to arrival.  Always `>= MIN_TRANSMISSION_TIME`.
    fn time_to_reach(&mut self, origin: Endpoint, destination: Endpoint, message_size: usize) -> f64;
}

/// Build the model described by `params`.
pub fn from_params(params: &TransmissionParams, rng: SimRng) -> RadioResult<Box<dyn TransmissionModel>> {
    params.validate()?;
    Ok(match *params {
        TransmissionParams::Constant { time } => Box::new(ConstantTime::new(time)),
        _ => Box::new(RandomTime::new(params, rng)?),
    })
}

// ── ConstantTime ──────────────────────────────────────────────────────────────

/// Every packet takes the same time.
#[derive(Clone, Debug)]
pub struct ConstantTime {
    time: f64,
}

impl ConstantTime {
    pub fn new(time: f64) -> Self {
        Self { time: clamp(time) }
    }
}

impl TransmissionModel for ConstantTime {
    #[inline]
    fn time_to_reach(&mut self, _origin: Endpoint, _destination: Endpoint, _size: usize) -> f64 {
        self.time
    }
}

// ── RandomTime ────────────────────────────────────────────────────────────────

enum Sampler {
    Constant(f64),
    Uniform(Uniform<f64>),
    Gaussian(Normal<f64>),
    Exponential(Exp<f64>),
}

/// Transmission time drawn from a distribution, independently per packet.
pub struct RandomTime {
    sampler: Sampler,
    rng:     SimRng,
}

impl RandomTime {
    pub fn new(params: &TransmissionParams, rng: SimRng) -> RadioResult<Self> {
        params.validate()?;
        let sampler = match *params {
            TransmissionParams::Constant { time } => Sampler::Constant(time),
            TransmissionParams::Uniform { min, max } => Sampler::Uniform(Uniform::new_inclusive(min, max)),
            TransmissionParams::Gaussian { mean, std_dev } => Sampler::Gaussian(
                Normal::new(mean, std_dev).map_err(|e| RadioError::Distribution(e.to_string()))?,
            ),
            TransmissionParams::Exponential { lambda } => Sampler::Exponential(
                Exp::new(lambda).map_err(|e| RadioError::Distribution(e.to_string()))?,
            ),
        };
        Ok(Self { sampler, rng })
    }
}

impl TransmissionModel for RandomTime {
    fn time_to_reach(&mut self, _origin: Endpoint, _destination: Endpoint, _size: usize) -> f64 {
        let rng = self.rng.inner();
        let t = match &self.sampler {
            Sampler::Constant(t)    => *t,
            Sampler::Uniform(d)     => d.sample(rng),
            Sampler::Gaussian(d)    => d.sample(rng),
            Sampler::Exponential(d) => d.sample(rng),
        };
        clamp(t)
    }
}

#[inline]
fn clamp(t: f64) -> f64 {
    if t > MIN_TRANSMISSION_TIME { t } else { MIN_TRANSMISSION_TIME }
}
