//! Per-node random waypoint state.

use ws_core::Position;

/// The leg a node is currently walking.
///
/// A node either pauses at its last waypoint (`pause_remaining > 0`) or
/// moves towards `target` at `speed` units per time unit.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointState {
    pub target:          Position,
    pub speed:           f64,
    pub pause_remaining: f64,
}

impl WaypointState {
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.pause_remaining > 0.0
    }

    /// Advance `current` by `elapsed` time units along this leg.
    ///
    /// Returns the new position and whether the target was reached.
    pub fn advance(&mut self, current: Position, elapsed: f64) -> (Position, bool) {
        let mut elapsed = elapsed;
        if self.is_paused() {
            if self.pause_remaining >= elapsed {
                self.pause_remaining -= elapsed;
                return (current, false);
            }
            elapsed -= self.pause_remaining;
            self.pause_remaining = 0.0;
        }
        let next = current.step_towards(self.target, self.speed * elapsed);
        (next, next == self.target)
    }
}
