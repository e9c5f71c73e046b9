//! Connectivity models: is there a directed link from one node to another?
//!
//! A model is only asked about pairs the spatial index reports as candidates,
//! i.e. pairs within the index's bound.  The pass that turns these answers
//! into edges (adding new ones, removing dying links) lives with the edge
//! arena in `ws-sim`.

use tracing::warn;

use ws_core::{ModelParams, SimRng, WsError};
use ws_spatial::SpatialIndex;

use crate::{Endpoint, RadioResult};

/// Decides the existence of the directed link `from → to`.
pub trait ConnectivityModel {
    /// Directional link predicate.  Called once per candidate pair per pass.
    fn is_connected(&mut self, from: Endpoint, to: Endpoint) -> bool;

    /// The largest distance at which this model ever connects two nodes.
    fn max_radius(&self) -> f64;
}

/// Warn when a model reaches farther than the index reports candidates.
fn check_against_index(model: &str, radius: f64, index: &SpatialIndex) {
    if radius > index.max_radius() {
        warn!(
            model,
            radius,
            index_radius = index.max_radius(),
            "connectivity radius exceeds the spatial index radius; links beyond the index radius will be missed"
        );
    }
}

// ── UnitDiskGraph ─────────────────────────────────────────────────────────────

/// Distance-threshold connectivity: `from → to` iff their squared distance
/// is below `radius²`.
#[derive(Clone, Debug)]
pub struct UnitDiskGraph {
    radius:         f64,
    squared_radius: f64,
}

impl UnitDiskGraph {
    /// Resolve the radius from `params` (falling back to the index radius)
    /// and cache it for the lifetime of the model.
    pub fn new(params: &ModelParams, index: &SpatialIndex) -> RadioResult<Self> {
        let radius = params.udg_radius.unwrap_or(index.max_radius());
        Self::with_radius(radius, index)
    }

    pub fn with_radius(radius: f64, index: &SpatialIndex) -> RadioResult<Self> {
        if !(radius > 0.0) {
            return Err(WsError::invalid_param("udg_radius", radius, "a positive number").into());
        }
        check_against_index("unit disk graph", radius, index);
        Ok(Self { radius, squared_radius: radius * radius })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl ConnectivityModel for UnitDiskGraph {
    #[inline]
    fn is_connected(&mut self, from: Endpoint, to: Endpoint) -> bool {
        from.position.squared_distance_to(to.position) < self.squared_radius
    }

    fn max_radius(&self) -> f64 {
        self.radius
    }
}

// ── QuasiUnitDiskGraph ────────────────────────────────────────────────────────

/// Quasi unit disk graph: always connected up to `r_min`, never beyond
/// `r_max`, and connected with probability `p` in between.  The random draw
/// is repeated on every pass, so links in the grey zone flicker.
pub struct QuasiUnitDiskGraph {
    r_min_sq:    f64,
    r_max:       f64,
    r_max_sq:    f64,
    probability: f64,
    rng:         SimRng,
}

impl QuasiUnitDiskGraph {
    pub fn new(params: &ModelParams, index: &SpatialIndex, rng: SimRng) -> RadioResult<Self> {
        let (r_min, r_max, p) = (params.qudg_r_min, params.qudg_r_max, params.qudg_probability);
        if !(0.0 <= r_min && r_min <= r_max) {
            return Err(WsError::Config(format!(
                "quasi-UDG radii must satisfy 0 <= r_min <= r_max, got [{r_min}, {r_max}]"
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(WsError::invalid_param("qudg_probability", p, "a value in [0, 1]").into());
        }
        check_against_index("quasi unit disk graph", r_max, index);
        Ok(Self {
            r_min_sq:    r_min * r_min,
            r_max,
            r_max_sq:    r_max * r_max,
            probability: p,
            rng,
        })
    }
}

impl ConnectivityModel for QuasiUnitDiskGraph {
    fn is_connected(&mut self, from: Endpoint, to: Endpoint) -> bool {
        let d2 = from.position.squared_distance_to(to.position);
        if d2 <= self.r_min_sq {
            true
        } else if d2 > self.r_max_sq {
            false
        } else {
            self.rng.gen_bool(self.probability)
        }
    }

    fn max_radius(&self) -> f64 {
        self.r_max
    }
}
