//! Cartesian positions and the deployment area.
//!
//! Positions are three-dimensional; 2D simulations leave `z` at zero.  All
//! connectivity and interference math works on squared distances where it
//! can, so the square root is only paid by the SINR path-loss term.

/// A point in the simulated deployment area.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A point in the `z = 0` plane.
    #[inline]
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[inline]
    pub fn squared_distance_to(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[inline]
    pub fn distance_to(self, other: Position) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    /// Move `step` units from `self` towards `target`, stopping on it.
    pub fn step_towards(self, target: Position, step: f64) -> Position {
        let dist = self.distance_to(target);
        if dist <= step || dist == 0.0 {
            return target;
        }
        let f = step / dist;
        Position {
            x: self.x + (target.x - self.x) * f,
            y: self.y + (target.y - self.y) * f,
            z: self.z + (target.z - self.z) * f,
        }
    }

    /// As an `[x, y, z]` array (the R-tree point type).
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// The axis-aligned box nodes are placed in and move within, anchored at the
/// origin.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    pub width:  f64,
    pub height: f64,
    /// Zero for planar deployments.
    pub depth:  f64,
}

impl Area {
    pub fn planar(width: f64, height: f64) -> Self {
        Self { width, height, depth: 0.0 }
    }

    pub fn contains(&self, p: Position) -> bool {
        (0.0..=self.width).contains(&p.x)
            && (0.0..=self.height).contains(&p.y)
            && (0.0..=self.depth).contains(&p.z)
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::planar(1_000.0, 1_000.0)
    }
}
