//! Top-level simulation configuration.
//!
//! Both structs are plain values resolved once at simulation setup (typically
//! deserialized from a JSON/TOML file by the application with the `serde`
//! feature) and passed by reference into every model constructor.  Nothing in
//! the framework caches configuration in statics.

use crate::{Area, ExecutionMode, WsError, WsResult};

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Scheduling and mode flags for one run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Round-based or event-driven execution.
    pub mode: ExecutionMode,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Synchronous mode: stop after this many rounds.
    pub max_rounds: u64,

    /// Asynchronous mode: stop once the clock passes this time.
    pub max_time: f64,

    /// Evaluate the interference model for in-flight packets.
    pub interference: bool,

    /// Interference only grows while a packet is in the air, so tests may be
    /// deferred until just before a packet leaves the air.
    pub interference_is_additive: bool,

    /// Hand undelivered packets back to their sender's NACK inbox.
    pub generate_nacks: bool,

    /// Apply the mobility model (once per round / every `mobility_interval`).
    pub mobility: bool,

    /// Asynchronous mode: simulated time between two mobility steps.
    pub mobility_interval: f64,

    /// Recompute the connectivity graph (once per round / every
    /// `connectivity_interval`).  When `false` edges are built once at start.
    pub connectivity: bool,

    /// Asynchronous mode: simulated time between two connectivity passes.
    pub connectivity_interval: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode:                     ExecutionMode::Synchronous,
            seed:                     0,
            max_rounds:               100,
            max_time:                 100.0,
            interference:             false,
            interference_is_additive: true,
            generate_nacks:           false,
            mobility:                 false,
            mobility_interval:        1.0,
            connectivity:             true,
            connectivity_interval:    1.0,
        }
    }
}

impl SimConfig {
    /// Reject values no run can proceed with.
    pub fn validate(&self) -> WsResult<()> {
        if self.mode.is_async() {
            if !(self.max_time > 0.0) {
                return Err(WsError::invalid_param("max_time", self.max_time, "a positive number"));
            }
            if self.mobility && !(self.mobility_interval > 0.0) {
                return Err(WsError::invalid_param(
                    "mobility_interval", self.mobility_interval, "a positive number",
                ));
            }
            if self.connectivity && !(self.connectivity_interval > 0.0) {
                return Err(WsError::invalid_param(
                    "connectivity_interval", self.connectivity_interval, "a positive number",
                ));
            }
        }
        Ok(())
    }
}

// ── TransmissionParams ────────────────────────────────────────────────────────

/// Distribution of the time a message spends in the air.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum TransmissionParams {
    Constant { time: f64 },
    Uniform { min: f64, max: f64 },
    Gaussian { mean: f64, std_dev: f64 },
    Exponential { lambda: f64 },
}

impl Default for TransmissionParams {
    fn default() -> Self {
        TransmissionParams::Constant { time: 1.0 }
    }
}

impl TransmissionParams {
    pub fn validate(&self) -> WsResult<()> {
        match *self {
            TransmissionParams::Constant { time } if !(time > 0.0) => {
                Err(WsError::invalid_param("transmission.time", time, "a positive number"))
            }
            TransmissionParams::Uniform { min, max } if !(min <= max) => Err(WsError::Config(
                format!("transmission range [{min}, {max}] is empty"),
            )),
            TransmissionParams::Gaussian { std_dev, .. } if !(std_dev >= 0.0) => Err(
                WsError::invalid_param("transmission.std_dev", std_dev, "a non-negative number"),
            ),
            TransmissionParams::Exponential { lambda } if !(lambda > 0.0) => {
                Err(WsError::invalid_param("transmission.lambda", lambda, "a positive number"))
            }
            _ => Ok(()),
        }
    }
}

// ── Model selection ───────────────────────────────────────────────────────────

/// Which connectivity model decides edge existence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectivityKind {
    /// Distance threshold (`udg_radius`).
    #[default]
    UnitDisk,
    /// Probabilistic grey zone between `qudg_r_min` and `qudg_r_max`.
    QuasiUnitDisk,
}

/// How nodes move when `SimConfig::mobility` is on.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MobilityParams {
    #[default]
    None,
    RandomWaypoint { speed_min: f64, speed_max: f64, pause: f64 },
}

// ── ModelParams ───────────────────────────────────────────────────────────────

/// Numeric parameters consumed by the connectivity, transmission, reliability
/// and interference model constructors.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelParams {
    /// Deployment area for random placement and random waypoint mobility.
    pub area: Area,

    pub connectivity_model: ConnectivityKind,

    /// Unit-disk-graph radius.  `None` falls back to `index_radius`.
    pub udg_radius: Option<f64>,

    /// Largest radius the spatial index is asked to cover.
    pub index_radius: f64,

    /// Quasi-UDG: always connected below this distance.
    pub qudg_r_min: f64,
    /// Quasi-UDG: never connected above this distance.
    pub qudg_r_max: f64,
    /// Quasi-UDG: connection probability between `r_min` and `r_max`.
    pub qudg_probability: f64,

    /// SINR path-loss exponent.
    pub sinr_alpha: f64,
    /// SINR detection threshold.
    pub sinr_beta: f64,
    /// SINR ambient noise floor.
    pub sinr_ambient_noise: f64,

    pub can_receive_while_sending: bool,
    pub can_receive_multiple_in_parallel: bool,

    /// Probability that the reliability model drops a packet.
    pub drop_rate: f64,

    /// Transmit intensity of packets whose sender sets none.
    pub default_intensity: f64,

    pub transmission: TransmissionParams,

    pub mobility: MobilityParams,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            area:                             Area::default(),
            connectivity_model:               ConnectivityKind::UnitDisk,
            udg_radius:                       None,
            index_radius:                     100.0,
            qudg_r_min:                       30.0,
            qudg_r_max:                       50.0,
            qudg_probability:                 0.5,
            sinr_alpha:                       2.0,
            sinr_beta:                        0.7,
            sinr_ambient_noise:               0.0,
            can_receive_while_sending:        true,
            can_receive_multiple_in_parallel: true,
            drop_rate:                        0.0,
            default_intensity:                1.0,
            transmission:                     TransmissionParams::default(),
            mobility:                         MobilityParams::None,
        }
    }
}

impl ModelParams {
    /// Reject parameters that would make a model meaningless.
    pub fn validate(&self) -> WsResult<()> {
        if !(self.area.width >= 0.0 && self.area.height >= 0.0 && self.area.depth >= 0.0) {
            return Err(WsError::Config(format!(
                "area dimensions must be non-negative, got {} x {} x {}",
                self.area.width, self.area.height, self.area.depth,
            )));
        }
        if !(self.index_radius > 0.0) {
            return Err(WsError::invalid_param("index_radius", self.index_radius, "a positive number"));
        }
        if let Some(r) = self.udg_radius {
            if !(r > 0.0) {
                return Err(WsError::invalid_param("udg_radius", r, "a positive number"));
            }
        }
        if !(0.0 <= self.qudg_r_min && self.qudg_r_min <= self.qudg_r_max) {
            return Err(WsError::Config(format!(
                "quasi-UDG radii must satisfy 0 <= r_min <= r_max, got [{}, {}]",
                self.qudg_r_min, self.qudg_r_max,
            )));
        }
        if !(0.0..=1.0).contains(&self.qudg_probability) {
            return Err(WsError::invalid_param("qudg_probability", self.qudg_probability, "a value in [0, 1]"));
        }
        if !(self.sinr_alpha > 0.0) {
            return Err(WsError::invalid_param("sinr_alpha", self.sinr_alpha, "a positive number"));
        }
        if !(self.sinr_beta > 0.0) {
            return Err(WsError::invalid_param("sinr_beta", self.sinr_beta, "a positive number"));
        }
        if !(self.sinr_ambient_noise >= 0.0) {
            return Err(WsError::invalid_param(
                "sinr_ambient_noise", self.sinr_ambient_noise, "a non-negative number",
            ));
        }
        if !(0.0..=1.0).contains(&self.drop_rate) {
            return Err(WsError::invalid_param("drop_rate", self.drop_rate, "a value in [0, 1]"));
        }
        if !(self.default_intensity > 0.0) {
            return Err(WsError::invalid_param(
                "default_intensity", self.default_intensity, "a positive number",
            ));
        }
        if let MobilityParams::RandomWaypoint { speed_min, speed_max, pause } = self.mobility {
            if !(speed_min > 0.0 && speed_min <= speed_max) {
                return Err(WsError::Config(format!(
                    "waypoint speeds must satisfy 0 < speed_min <= speed_max, got [{speed_min}, {speed_max}]"
                )));
            }
            if !(pause >= 0.0) {
                return Err(WsError::invalid_param("pause", pause, "a non-negative number"));
            }
        }
        self.transmission.validate()
    }

    /// The unit-disk radius after falling back to the index-wide default.
    #[inline]
    pub fn resolved_udg_radius(&self) -> f64 {
        self.udg_radius.unwrap_or(self.index_radius)
    }
}
