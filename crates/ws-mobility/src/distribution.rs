//! Initial node placement.

use ws_core::{Area, Position, SimRng};

use crate::{MobilityError, MobilityResult};

/// Produces the starting positions of a fresh deployment.
pub trait DistributionModel {
    fn positions(&mut self, count: usize, area: Area) -> MobilityResult<Vec<Position>>;
}

/// Uniform point in `area`.
pub(crate) fn random_point(area: Area, rng: &mut SimRng) -> Position {
    Position::new(
        rng.random::<f64>() * area.width,
        rng.random::<f64>() * area.height,
        rng.random::<f64>() * area.depth,
    )
}

/// Independent uniform positions.
pub struct RandomDistribution {
    rng: SimRng,
}

impl RandomDistribution {
    pub fn new(rng: SimRng) -> Self {
        Self { rng }
    }
}

impl DistributionModel for RandomDistribution {
    fn positions(&mut self, count: usize, area: Area) -> MobilityResult<Vec<Position>> {
        Ok((0..count).map(|_| random_point(area, &mut self.rng)).collect())
    }
}

/// Row-major square grid in the `z = 0` plane, one node per cell centre.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridDistribution;

impl DistributionModel for GridDistribution {
    fn positions(&mut self, count: usize, area: Area) -> MobilityResult<Vec<Position>> {
        if !(area.width > 0.0 && area.height > 0.0) {
            return Err(MobilityError::EmptyArea { width: area.width, height: area.height });
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        let side = (count as f64).sqrt().ceil() as usize;
        let dx = area.width / side as f64;
        let dy = area.height / side as f64;
        Ok((0..count)
            .map(|i| {
                let (row, col) = (i / side, i % side);
                Position::planar((col as f64 + 0.5) * dx, (row as f64 + 0.5) * dy)
            })
            .collect())
    }
}

/// Evenly spaced points on the segment `from → to`, both ends included.
#[derive(Clone, Copy, Debug)]
pub struct LineDistribution {
    pub from: Position,
    pub to:   Position,
}

impl LineDistribution {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

impl DistributionModel for LineDistribution {
    fn positions(&mut self, count: usize, _area: Area) -> MobilityResult<Vec<Position>> {
        let step = if count > 1 { 1.0 / (count - 1) as f64 } else { 0.0 };
        Ok((0..count)
            .map(|i| {
                let f = i as f64 * step;
                Position::new(
                    self.from.x + (self.to.x - self.from.x) * f,
                    self.from.y + (self.to.y - self.from.y) * f,
                    self.from.z + (self.to.z - self.from.z) * f,
                )
            })
            .collect())
    }
}
