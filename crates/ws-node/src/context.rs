//! Callback contexts and the actions they record.
//!
//! A context is built by `ws-sim` for a single callback and dropped right
//! after it.  Reads (clock, identity, neighborhood) go straight to borrowed
//! simulation state; writes are recorded as [`Action`]s and applied by the
//! driver once the callback returns, in the order they were recorded.
//!
//! A rejected timer start is returned to the caller and also recorded as a
//! failure; the driver aborts the run with it once the callback returns.

use ws_core::{NodeId, NodeRng, Position, Round, SimRng, SimTime};
use ws_schedule::{ScheduleError, ScheduleResult, TimerHandle, absolute_fire_time, relative_fire_time};

use crate::{GlobalTimer, NodeBehavior, Timer};

// ── Actions ───────────────────────────────────────────────────────────────────

/// Something a node asked the simulation to do.
pub enum Action<N: NodeBehavior> {
    /// Unicast over the edge to `to`.  `intensity: None` uses the configured
    /// default.
    Send { to: NodeId, message: N::Msg, intensity: Option<f64> },
    /// One multicast copy per outgoing edge.
    Broadcast { message: N::Msg, intensity: Option<f64> },
    /// Out-of-band delivery: no edge, no loss, no interference.
    SendDirect { to: NodeId, message: N::Msg },
    /// A validated node timer.
    StartTimer { time: SimTime, handle: TimerHandle, timer: Box<dyn Timer<N>> },
    /// A timer start was rejected; fatal for the run.
    Fail(ScheduleError),
}

/// Something a global timer asked the simulation to do.
pub enum GlobalAction<N: NodeBehavior> {
    StartTimer { time: SimTime, handle: TimerHandle, timer: Box<dyn GlobalTimer<N>> },
    StartNodeTimer { node: NodeId, time: SimTime, handle: TimerHandle, timer: Box<dyn Timer<N>> },
    SendDirect { from: NodeId, to: NodeId, message: N::Msg },
    /// End the run after the current round / event.
    Stop,
    /// A timer start was rejected; fatal for the run.
    Fail(ScheduleError),
}

// ── NodeCtx ───────────────────────────────────────────────────────────────────

/// What a node sees and can do during one callback.
pub struct NodeCtx<'a, N: NodeBehavior> {
    id:        NodeId,
    position:  Position,
    now:       SimTime,
    round:     Round,
    neighbors: &'a [NodeId],
    rng:       &'a mut NodeRng,
    actions:   &'a mut Vec<Action<N>>,
}

impl<'a, N: NodeBehavior> NodeCtx<'a, N> {
    pub fn new(
        id:        NodeId,
        position:  Position,
        now:       SimTime,
        round:     Round,
        neighbors: &'a [NodeId],
        rng:       &'a mut NodeRng,
        actions:   &'a mut Vec<Action<N>>,
    ) -> Self {
        Self { id, position, now, round, neighbors, rng, actions }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Current round (always zero in asynchronous mode).
    #[inline]
    pub fn round(&self) -> Round {
        self.round
    }

    /// End nodes of this node's outgoing edges, ascending.
    #[inline]
    pub fn neighbors(&self) -> &[NodeId] {
        self.neighbors
    }

    pub fn is_neighbor(&self, node: NodeId) -> bool {
        self.neighbors.binary_search(&node).is_ok()
    }

    #[inline]
    pub fn rng(&mut self) -> &mut NodeRng {
        &mut *self.rng
    }

    // ── Sending ───────────────────────────────────────────────────────────

    pub fn send(&mut self, to: NodeId, message: N::Msg) {
        self.actions.push(Action::Send { to, message, intensity: None });
    }

    pub fn send_with_intensity(&mut self, to: NodeId, message: N::Msg, intensity: f64) {
        self.actions.push(Action::Send { to, message, intensity: Some(intensity) });
    }

    pub fn broadcast(&mut self, message: N::Msg) {
        self.actions.push(Action::Broadcast { message, intensity: None });
    }

    pub fn broadcast_with_intensity(&mut self, message: N::Msg, intensity: f64) {
        self.actions.push(Action::Broadcast { message, intensity: Some(intensity) });
    }

    pub fn send_direct(&mut self, to: NodeId, message: N::Msg) {
        self.actions.push(Action::SendDirect { to, message });
    }

    // ── Timers ────────────────────────────────────────────────────────────

    /// Start `timer` to fire `delay` after now.  `delay` must be positive.
    pub fn start_timer_relative<T: Timer<N>>(&mut self, delay: f64, timer: T) -> ScheduleResult<TimerHandle> {
        let time = self.checked(relative_fire_time(self.now, delay))?;
        Ok(self.push_timer(time, Box::new(timer)))
    }

    /// Start `timer` to fire at `time`, which must lie after now.
    pub fn start_timer_absolute<T: Timer<N>>(&mut self, time: SimTime, timer: T) -> ScheduleResult<TimerHandle> {
        let time = self.checked(absolute_fire_time(self.now, time))?;
        Ok(self.push_timer(time, Box::new(timer)))
    }

    fn checked(&mut self, time: ScheduleResult<SimTime>) -> ScheduleResult<SimTime> {
        if let Err(e) = &time {
            self.actions.push(Action::Fail(e.clone()));
        }
        time
    }

    fn push_timer(&mut self, time: SimTime, timer: Box<dyn Timer<N>>) -> TimerHandle {
        let handle = TimerHandle::new();
        self.actions.push(Action::StartTimer { time, handle: handle.clone(), timer });
        handle
    }
}

// ── GlobalCtx ─────────────────────────────────────────────────────────────────

/// What a global timer sees and can do.
pub struct GlobalCtx<'a, N: NodeBehavior> {
    now:       SimTime,
    round:     Round,
    nodes:     &'a [NodeId],
    positions: &'a [Position],
    rng:       &'a mut SimRng,
    actions:   &'a mut Vec<GlobalAction<N>>,
}

impl<'a, N: NodeBehavior> GlobalCtx<'a, N> {
    pub fn new(
        now:       SimTime,
        round:     Round,
        nodes:     &'a [NodeId],
        positions: &'a [Position],
        rng:       &'a mut SimRng,
        actions:   &'a mut Vec<GlobalAction<N>>,
    ) -> Self {
        Self { now, round, nodes, positions, rng, actions }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[inline]
    pub fn round(&self) -> Round {
        self.round
    }

    /// Every live node, ascending.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        self.nodes
    }

    pub fn position(&self, node: NodeId) -> Option<Position> {
        if self.nodes.binary_search(&node).is_err() {
            return None;
        }
        self.positions.get(node.index()).copied()
    }

    #[inline]
    pub fn rng(&mut self) -> &mut SimRng {
        &mut *self.rng
    }

    /// Ask the driver to end the run once this timer returns.
    pub fn stop(&mut self) {
        self.actions.push(GlobalAction::Stop);
    }

    /// Inject a message as if `from` had sent it directly to `to`.
    pub fn send_direct(&mut self, from: NodeId, to: NodeId, message: N::Msg) {
        self.actions.push(GlobalAction::SendDirect { from, to, message });
    }

    pub fn start_global_timer_relative<T: GlobalTimer<N>>(
        &mut self,
        delay: f64,
        timer: T,
    ) -> ScheduleResult<TimerHandle> {
        let time = self.checked(relative_fire_time(self.now, delay))?;
        let handle = TimerHandle::new();
        self.actions.push(GlobalAction::StartTimer { time, handle: handle.clone(), timer: Box::new(timer) });
        Ok(handle)
    }

    pub fn start_global_timer_absolute<T: GlobalTimer<N>>(
        &mut self,
        time: SimTime,
        timer: T,
    ) -> ScheduleResult<TimerHandle> {
        let time = self.checked(absolute_fire_time(self.now, time))?;
        let handle = TimerHandle::new();
        self.actions.push(GlobalAction::StartTimer { time, handle: handle.clone(), timer: Box::new(timer) });
        Ok(handle)
    }

    /// Start a timer on `node` from outside it.
    pub fn start_node_timer_relative<T: Timer<N>>(
        &mut self,
        node:  NodeId,
        delay: f64,
        timer: T,
    ) -> ScheduleResult<TimerHandle> {
        let time = self.checked(relative_fire_time(self.now, delay))?;
        let handle = TimerHandle::new();
        self.actions.push(GlobalAction::StartNodeTimer {
            node,
            time,
            handle: handle.clone(),
            timer: Box::new(timer),
        });
        Ok(handle)
    }

    fn checked(&mut self, time: ScheduleResult<SimTime>) -> ScheduleResult<SimTime> {
        if let Err(e) = &time {
            self.actions.push(GlobalAction::Fail(e.clone()));
        }
        time
    }
}
