//! Mobility models.

use ws_core::{Area, NodeId, Position, SimRng, WsError};

use crate::{MobilityResult, WaypointState, distribution::random_point};

/// Moves nodes between connectivity passes.
pub trait MobilityModel {
    /// Position of `node` after `elapsed` time units, starting at `current`.
    fn next_position(&mut self, node: NodeId, current: Position, elapsed: f64) -> Position;
}

/// Nodes never move.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMobility;

impl MobilityModel for NoMobility {
    #[inline]
    fn next_position(&mut self, _node: NodeId, current: Position, _elapsed: f64) -> Position {
        current
    }
}

// ── RandomWaypoint ────────────────────────────────────────────────────────────

/// Random waypoint walk inside `area`.
///
/// Each node picks a uniformly random waypoint and a speed in
/// `[speed_min, speed_max]`, walks there in a straight line, pauses for
/// `pause` time units, and repeats.  Legs are created lazily on a node's
/// first step.
pub struct RandomWaypoint {
    area:      Area,
    speed_min: f64,
    speed_max: f64,
    pause:     f64,
    rng:       SimRng,
    states:    Vec<Option<WaypointState>>,
}

impl RandomWaypoint {
    pub fn new(area: Area, speed_min: f64, speed_max: f64, pause: f64, rng: SimRng) -> MobilityResult<Self> {
        if !(speed_min > 0.0) {
            return Err(WsError::invalid_param("speed_min", speed_min, "a positive number").into());
        }
        if !(speed_max >= speed_min) {
            return Err(WsError::Config(format!(
                "waypoint speed range [{speed_min}, {speed_max}] is empty"
            ))
            .into());
        }
        if !(pause >= 0.0) {
            return Err(WsError::invalid_param("pause", pause, "a non-negative number").into());
        }
        Ok(Self { area, speed_min, speed_max, pause, rng, states: Vec::new() })
    }

    pub fn area(&self) -> Area {
        self.area
    }

    /// The leg `node` is on, if it has moved yet.
    pub fn state(&self, node: NodeId) -> Option<&WaypointState> {
        self.states.get(node.index()).and_then(Option::as_ref)
    }

    fn new_leg(&mut self, pause: f64) -> WaypointState {
        let target = random_point(self.area, &mut self.rng);
        let speed = if self.speed_max > self.speed_min {
            self.rng.gen_range(self.speed_min..=self.speed_max)
        } else {
            self.speed_min
        };
        WaypointState { target, speed, pause_remaining: pause }
    }
}

impl MobilityModel for RandomWaypoint {
    fn next_position(&mut self, node: NodeId, current: Position, elapsed: f64) -> Position {
        let i = node.index();
        if self.states.len() <= i {
            self.states.resize(i + 1, None);
        }
        let mut leg = match self.states[i].take() {
            Some(leg) => leg,
            None => self.new_leg(0.0),
        };
        let (next, arrived) = leg.advance(current, elapsed);
        if arrived {
            leg = self.new_leg(self.pause);
        }
        self.states[i] = Some(leg);
        next
    }
}
