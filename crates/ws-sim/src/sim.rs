//! The `Simulation` struct and its two drivers.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use ws_core::{
    ExecutionMode, ModelParams, NodeId, NodeRng, PacketId, Position, SimClock, SimConfig, SimRng,
    SimTime, WsError,
};
use ws_mobility::MobilityModel;
use ws_node::{
    Action, GlobalAction, GlobalCtx, GlobalTimer, Inbox, NodeBehavior, NodeCtx, Timer,
};
use ws_radio::{
    ConnectivityModel, PacketHeader, PacketsInTheAir, ReliabilityModel, TransmissionModel,
};
use ws_schedule::{EventQueue, ScheduleResult, TimerBag, TimerHandle, absolute_fire_time, relative_fire_time};
use ws_spatial::SpatialIndex;

use crate::delivery::Resolution;
use crate::{Graph, RoundStats, SimError, SimObserver, SimResult};

#[cfg(feature = "fx-hash")]
pub(crate) type PacketMap<V> = rustc_hash::FxHashMap<PacketId, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type PacketMap<V> = std::collections::HashMap<PacketId, V>;

// ── Internal state ────────────────────────────────────────────────────────────

/// A started timer waiting for its fire time.
pub(crate) struct Pending<T: ?Sized> {
    pub(crate) handle: TimerHandle,
    pub(crate) timer:  Box<T>,
}

/// Everything the simulation keeps per node.
pub(crate) struct NodeSlot<N: NodeBehavior> {
    pub(crate) behavior:  N,
    pub(crate) rng:       NodeRng,
    /// Cached end nodes of the outgoing edges, ascending.
    pub(crate) neighbors: Vec<NodeId>,
    pub(crate) inbox:     Inbox<N::Msg>,
    pub(crate) nacks:     Inbox<N::Msg>,
    /// Synchronous mode only; asynchronous timers live in the event queue.
    pub(crate) timers:    TimerBag<Pending<dyn Timer<N>>>,
}

impl<N: NodeBehavior> NodeSlot<N> {
    pub(crate) fn new(behavior: N, rng: NodeRng) -> Self {
        Self {
            behavior,
            rng,
            neighbors: Vec::new(),
            inbox:     Inbox::new(),
            nacks:     Inbox::new(),
            timers:    TimerBag::new(),
        }
    }
}

/// Payload of the event queue.  In synchronous mode only packet arrivals
/// are queued.
pub(crate) enum SimEvent<N: NodeBehavior> {
    NodeTimer { node: NodeId, pending: Pending<dyn Timer<N>> },
    GlobalTimer(Pending<dyn GlobalTimer<N>>),
    PacketArrival(PacketId),
    Mobility,
    Connectivity,
}

impl<N: NodeBehavior> SimEvent<N> {
    /// Self-rescheduling system events.
    fn is_periodic(&self) -> bool {
        matches!(self, SimEvent::Mobility | SimEvent::Connectivity)
    }
}

/// A packet between send and resolution.
pub(crate) struct InFlight<M> {
    /// Authoritative unless `in_air`, in which case the air buffer holds
    /// the live copy.
    pub(crate) header:  PacketHeader,
    pub(crate) message: Arc<M>,
    pub(crate) in_air:  bool,
}

/// The per-run model instances.  The interference model lives inside the
/// air buffer.
pub(crate) struct Models {
    pub(crate) connectivity: Box<dyn ConnectivityModel>,
    pub(crate) transmission: Box<dyn TransmissionModel>,
    pub(crate) reliability:  Box<dyn ReliabilityModel>,
    pub(crate) mobility:     Box<dyn MobilityModel>,
}

/// Which node callback to run.
enum Hook<N: NodeBehavior> {
    Init,
    PreStep,
    Messages,
    Nacks,
    PostStep,
    NeighborhoodChange,
    Timer(Box<dyn Timer<N>>),
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// A wireless network simulation over nodes running `N`.
///
/// Create via [`SimBuilder`][crate::SimBuilder], then drive it with
/// [`run`](Self::run), or step by step with [`step_round`](Self::step_round)
/// (synchronous) or [`step_event`](Self::step_event) (asynchronous).
///
/// # Synchronous round
///
/// ```text
/// ① interference retest of every packet in the air (if enabled)
/// ② resolve every packet whose arrival time has come
/// ③ for each node, ascending NodeId:
///      pre_step → handle_nacks → handle_messages → post_step
/// ④ fire due node timers (node order), then due global timers
/// ⑤ mobility, then the connectivity pass
/// ```
///
/// # Asynchronous event
///
/// Pop the earliest `(time, seq)` event, advance the clock, and fire it:
/// a timer, a packet arrival (`handle_messages` on the receiver or
/// `handle_nacks` on the sender), or a periodic mobility / connectivity
/// step.
pub struct Simulation<N: NodeBehavior> {
    pub(crate) config:         SimConfig,
    pub(crate) params:         ModelParams,
    pub(crate) clock:          SimClock,
    pub(crate) nodes:          Vec<Option<NodeSlot<N>>>,
    /// Live nodes, ascending.
    pub(crate) live:           Vec<NodeId>,
    pub(crate) positions:      Vec<Position>,
    pub(crate) index:          SpatialIndex,
    pub(crate) graph:          Graph,
    pub(crate) models:         Models,
    pub(crate) air:            PacketsInTheAir,
    pub(crate) packets:        PacketMap<InFlight<N::Msg>>,
    pub(crate) queue:          EventQueue<SimEvent<N>>,
    pub(crate) global_timers:  TimerBag<Pending<dyn GlobalTimer<N>>>,
    pub(crate) rng:            SimRng,
    pub(crate) next_packet:    u64,
    pub(crate) round_stats:    RoundStats,
    pub(crate) totals:         RoundStats,
    pub(crate) stop_requested: bool,
}

impl<N: NodeBehavior> Simulation<N> {
    // ── Running ───────────────────────────────────────────────────────────

    /// Run until the configured limit (`max_rounds` or `max_time`), an
    /// empty event queue (asynchronous), or a stop request.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        debug!(mode = ?self.config.mode, nodes = self.live.len(), "run started");
        match self.config.mode {
            ExecutionMode::Synchronous => {
                while self.clock.round.0 < self.config.max_rounds && !self.stop_requested {
                    self.step_round(observer)?;
                }
            }
            ExecutionMode::Asynchronous => while self.step_event(observer)? {},
        }
        self.finish(observer);
        Ok(())
    }

    /// Run exactly `n` synchronous rounds, ignoring `max_rounds`.
    pub fn run_rounds<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step_round(observer)?;
        }
        Ok(())
    }

    /// Execute one synchronous round.
    pub fn step_round<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.require_mode(ExecutionMode::Synchronous, "step_round")?;
        self.clock.advance_round();
        let (round, now) = (self.clock.round, self.clock.time);
        observer.on_round_start(round);
        self.round_stats = RoundStats::new(round, now);

        if self.config.interference {
            self.air.test_for_interference(&self.positions);
        }

        while self.queue.peek_time().is_some_and(|t| t <= now) {
            let Some(event) = self.queue.extract_next() else { break };
            if let SimEvent::PacketArrival(id) = event.payload {
                self.resolve_packet(id, observer);
            }
        }

        for id in self.live.clone() {
            if !self.is_live(id) {
                continue;
            }
            self.invoke(id, Hook::PreStep)?;
            if self.config.generate_nacks {
                self.invoke(id, Hook::Nacks)?;
            }
            self.invoke(id, Hook::Messages)?;
            self.invoke(id, Hook::PostStep)?;
        }

        self.fire_due_timers(now)?;

        if self.config.mobility {
            self.move_nodes(1.0)?;
        }
        if self.config.connectivity {
            self.connectivity_pass(observer)?;
        }

        self.round_stats.edges = self.graph.edge_count();
        self.round_stats.packets_in_air = self.packets.len();
        observer.on_round_end(round, &self.round_stats);
        self.totals.accumulate(&self.round_stats);
        trace!(%round, resolved = self.round_stats.resolved(), "round finished");
        Ok(())
    }

    /// Process the next asynchronous event.
    ///
    /// Returns `false` once the queue is empty, the next event lies past
    /// `max_time`, or a stop was requested.
    pub fn step_event<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        self.require_mode(ExecutionMode::Asynchronous, "step_event")?;
        if self.stop_requested {
            return Ok(false);
        }
        match self.queue.peek_time() {
            Some(t) if t.as_f64() <= self.config.max_time => {}
            _ => return Ok(false),
        }
        let Some(event) = self.queue.extract_next() else { return Ok(false) };
        self.clock.advance_to(event.time);
        observer.on_event(event.time);

        match event.payload {
            SimEvent::NodeTimer { node, pending } => {
                if pending.handle.is_active() && self.is_live(node) {
                    self.invoke(node, Hook::Timer(pending.timer))?;
                } else {
                    trace!(%node, "inactive timer discarded");
                }
            }
            SimEvent::GlobalTimer(pending) => {
                if pending.handle.is_active() {
                    self.fire_global(pending.timer)?;
                }
            }
            SimEvent::PacketArrival(id) => match self.resolve_packet(id, observer) {
                Resolution::Inbox(node) => self.invoke(node, Hook::Messages)?,
                Resolution::Nack(node) => self.invoke(node, Hook::Nacks)?,
                Resolution::Discarded => {}
            },
            SimEvent::Mobility => {
                self.move_nodes(self.config.mobility_interval)?;
                self.reschedule_periodic(self.config.mobility_interval, SimEvent::Mobility)?;
            }
            SimEvent::Connectivity => {
                self.connectivity_pass(observer)?;
                self.reschedule_periodic(self.config.connectivity_interval, SimEvent::Connectivity)?;
            }
        }
        Ok(!self.stop_requested)
    }

    /// End the run after the current round or event.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Live nodes, ascending.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.live
    }

    pub fn node_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.nodes.get(node.index()).is_some_and(Option::is_some)
    }

    pub fn node(&self, node: NodeId) -> Option<&N> {
        self.slot(node).map(|s| &s.behavior)
    }

    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut N> {
        self.slot_mut(node).map(|s| &mut s.behavior)
    }

    /// Iterate `(id, behavior)` over live nodes, ascending.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.live.iter().filter_map(move |&id| self.node(id).map(|n| (id, n)))
    }

    pub fn position(&self, node: NodeId) -> Option<Position> {
        self.is_live(node).then(|| self.positions[node.index()])
    }

    /// Positions of the live nodes, ascending by id.
    pub fn positions(&self) -> Vec<Position> {
        self.live.iter().map(|n| self.positions[n.index()]).collect()
    }

    pub fn neighbors(&self, node: NodeId) -> Option<&[NodeId]> {
        self.slot(node).map(|s| s.neighbors.as_slice())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn air(&self) -> &PacketsInTheAir {
        &self.air
    }

    /// Packets sent but not yet resolved.
    pub fn packets_in_flight(&self) -> usize {
        self.packets.len()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Outcome counters accumulated over completed rounds.
    pub fn totals(&self) -> &RoundStats {
        &self.totals
    }

    // ── External mutation ─────────────────────────────────────────────────

    /// Move a node.  The graph follows at the next connectivity pass.
    pub fn set_position(&mut self, node: NodeId, position: Position) -> SimResult<()> {
        if !self.is_live(node) {
            return Err(WsError::NodeNotFound(node).into());
        }
        self.positions[node.index()] = position;
        self.index.update(node, position)?;
        Ok(())
    }

    /// Start a global timer from outside the run.
    pub fn start_global_timer_relative<T: GlobalTimer<N>>(&mut self, delay: f64, timer: T) -> SimResult<TimerHandle> {
        let time = relative_fire_time(self.clock.time, delay)?;
        self.start_global_at(time, timer)
    }

    pub fn start_global_timer_absolute<T: GlobalTimer<N>>(
        &mut self,
        time:  SimTime,
        timer: T,
    ) -> SimResult<TimerHandle> {
        let time = absolute_fire_time(self.clock.time, time)?;
        self.start_global_at(time, timer)
    }

    fn start_global_at<T: GlobalTimer<N>>(&mut self, time: SimTime, timer: T) -> SimResult<TimerHandle> {
        let handle = TimerHandle::new();
        self.schedule_global_timer(time, Pending { handle: handle.clone(), timer: Box::new(timer) })?;
        Ok(handle)
    }

    /// Remove a node, every edge touching it, its pending timers, and every
    /// packet it sent or was sent.  Returns its behavior state.
    ///
    /// Removed edges are not reported to observers; nodes that lost an
    /// outgoing edge get `neighborhood_change`.
    pub fn remove_node(&mut self, node: NodeId) -> SimResult<N> {
        let slot = self
            .nodes
            .get_mut(node.index())
            .and_then(Option::take)
            .ok_or(WsError::NodeNotFound(node))?;
        self.live.retain(|&n| n != node);
        self.index.remove(node)?;

        let doomed: Vec<PacketId> = self
            .packets
            .iter()
            .filter(|(_, p)| p.header.origin == node || p.header.destination == node)
            .map(|(&id, _)| id)
            .collect();
        for id in &doomed {
            if let Some(flight) = self.packets.remove(id) {
                if flight.in_air {
                    self.air.remove(*id, &self.positions);
                }
            }
        }
        let packets = &self.packets;
        self.queue.retain(|event| match event {
            SimEvent::NodeTimer { node: n, .. } => *n != node,
            SimEvent::PacketArrival(id) => packets.contains_key(id),
            _ => true,
        });

        let removed = self.graph.remove_node(node);
        let mut touched: Vec<NodeId> = removed.iter().map(|e| e.start).filter(|&n| n != node).collect();
        touched.sort_unstable();
        touched.dedup();
        self.refresh_neighbors(&touched);
        for n in touched {
            self.invoke(n, Hook::NeighborhoodChange)?;
        }

        debug!(%node, edges = removed.len(), packets = doomed.len(), "node removed");
        Ok(slot.behavior)
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    /// Build the initial graph, run every node's `init`, and queue the
    /// periodic asynchronous events.
    pub(crate) fn initialize(&mut self) -> SimResult<()> {
        self.graph.update_connections(
            self.models.connectivity.as_mut(),
            &self.index,
            &self.positions,
            &self.live,
        )?;
        let all = self.live.clone();
        self.refresh_neighbors(&all);

        for id in all {
            self.invoke(id, Hook::Init)?;
        }

        if self.config.mode.is_async() {
            let now = self.clock.time;
            if self.config.mobility {
                self.queue.insert(now, now + self.config.mobility_interval, SimEvent::Mobility)?;
            }
            if self.config.connectivity {
                self.queue.insert(now, now + self.config.connectivity_interval, SimEvent::Connectivity)?;
            }
        }
        debug!(
            nodes = self.live.len(),
            edges = self.graph.edge_count(),
            mode  = ?self.config.mode,
            "simulation initialized"
        );
        Ok(())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn require_mode(&self, mode: ExecutionMode, operation: &'static str) -> SimResult<()> {
        if self.config.mode != mode {
            return Err(SimError::WrongMode { operation, mode: self.config.mode });
        }
        Ok(())
    }

    pub(crate) fn slot(&self, node: NodeId) -> Option<&NodeSlot<N>> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    pub(crate) fn slot_mut(&mut self, node: NodeId) -> Option<&mut NodeSlot<N>> {
        self.nodes.get_mut(node.index()).and_then(Option::as_mut)
    }

    fn finish<O: SimObserver>(&mut self, observer: &mut O) {
        if self.config.mode.is_async() {
            self.round_stats.time = self.clock.time;
            self.round_stats.edges = self.graph.edge_count();
            self.round_stats.packets_in_air = self.packets.len();
            self.totals.accumulate(&self.round_stats);
            self.round_stats = RoundStats::new(self.clock.round, self.clock.time);
        }
        observer.on_sim_end(self.clock.time, &self.totals);
        debug!(
            time      = %self.clock.time,
            delivered = self.totals.delivered,
            resolved  = self.totals.resolved(),
            "run finished"
        );
    }

    /// Run one callback on `node` and apply what it recorded.
    fn invoke(&mut self, node: NodeId, hook: Hook<N>) -> SimResult<()> {
        let (now, round) = (self.clock.time, self.clock.round);
        let nacks_enabled = self.config.generate_nacks;
        let position = self.positions.get(node.index()).copied().unwrap_or_default();
        let slot = self
            .nodes
            .get_mut(node.index())
            .and_then(Option::as_mut)
            .ok_or(WsError::NodeNotFound(node))?;

        let mut actions = Vec::new();
        {
            let NodeSlot { behavior, rng, neighbors, inbox, nacks, .. } = slot;
            let mut ctx = NodeCtx::new(node, position, now, round, neighbors, rng, &mut actions);
            match hook {
                Hook::Init => behavior.init(&mut ctx),
                Hook::PreStep => behavior.pre_step(&mut ctx),
                Hook::Messages => {
                    behavior.handle_messages(inbox, &mut ctx);
                    inbox.clear();
                }
                Hook::Nacks => {
                    if nacks_enabled && !nacks.is_empty() {
                        behavior.handle_nacks(nacks, &mut ctx);
                    }
                    nacks.clear();
                }
                Hook::PostStep => behavior.post_step(&mut ctx),
                Hook::NeighborhoodChange => behavior.neighborhood_change(&mut ctx),
                Hook::Timer(timer) => timer.fire(behavior, &mut ctx),
            }
        }
        self.apply_actions(node, actions)
    }

    fn apply_actions(&mut self, node: NodeId, actions: Vec<Action<N>>) -> SimResult<()> {
        for action in actions {
            match action {
                Action::Send { to, message, intensity } => self.send(node, to, message, intensity)?,
                Action::Broadcast { message, intensity } => self.broadcast(node, message, intensity)?,
                Action::SendDirect { to, message } => self.send_direct(node, to, Arc::new(message))?,
                Action::StartTimer { time, handle, timer } => {
                    self.schedule_node_timer(node, time, Pending { handle, timer })?
                }
                Action::Fail(e) => {
                    warn!(%node, error = %e, "timer rejected, aborting run");
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn fire_global(&mut self, timer: Box<dyn GlobalTimer<N>>) -> SimResult<()> {
        let mut actions = Vec::new();
        {
            let mut ctx = GlobalCtx::new(
                self.clock.time,
                self.clock.round,
                &self.live,
                &self.positions,
                &mut self.rng,
                &mut actions,
            );
            timer.fire(&mut ctx);
        }
        for action in actions {
            match action {
                GlobalAction::StartTimer { time, handle, timer } => {
                    self.schedule_global_timer(time, Pending { handle, timer })?
                }
                GlobalAction::StartNodeTimer { node, time, handle, timer } => {
                    if !self.is_live(node) {
                        return Err(WsError::NodeNotFound(node).into());
                    }
                    self.schedule_node_timer(node, time, Pending { handle, timer })?
                }
                GlobalAction::SendDirect { from, to, message } => self.send_direct(from, to, Arc::new(message))?,
                GlobalAction::Stop => self.stop_requested = true,
                GlobalAction::Fail(e) => {
                    warn!(error = %e, "global timer rejected, aborting run");
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn schedule_node_timer(&mut self, node: NodeId, time: SimTime, pending: Pending<dyn Timer<N>>) -> ScheduleResult<()> {
        match self.config.mode {
            ExecutionMode::Synchronous => {
                if let Some(slot) = self.slot_mut(node) {
                    slot.timers.push(time, pending);
                }
            }
            ExecutionMode::Asynchronous => {
                self.queue.insert(self.clock.time, time, SimEvent::NodeTimer { node, pending })?;
            }
        }
        Ok(())
    }

    fn schedule_global_timer(&mut self, time: SimTime, pending: Pending<dyn GlobalTimer<N>>) -> ScheduleResult<()> {
        match self.config.mode {
            ExecutionMode::Synchronous => self.global_timers.push(time, pending),
            ExecutionMode::Asynchronous => {
                self.queue.insert(self.clock.time, time, SimEvent::GlobalTimer(pending))?;
            }
        }
        Ok(())
    }

    /// Fire every synchronous timer due by `now`: node timers in node order,
    /// then global timers.
    fn fire_due_timers(&mut self, now: SimTime) -> SimResult<()> {
        for id in self.live.clone() {
            let due = match self.slot_mut(id) {
                Some(slot) => slot.timers.drain_due(now),
                None => continue,
            };
            for (_, pending) in due {
                if pending.handle.is_active() && self.is_live(id) {
                    self.invoke(id, Hook::Timer(pending.timer))?;
                }
            }
        }
        for (_, pending) in self.global_timers.drain_due(now) {
            if pending.handle.is_active() {
                self.fire_global(pending.timer)?;
            }
        }
        Ok(())
    }

    fn move_nodes(&mut self, elapsed: f64) -> SimResult<()> {
        for &id in &self.live {
            let next = self.models.mobility.next_position(id, self.positions[id.index()], elapsed);
            self.positions[id.index()] = next;
            self.index.update(id, next)?;
        }
        Ok(())
    }

    fn connectivity_pass<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let change = self.graph.update_connections(
            self.models.connectivity.as_mut(),
            &self.index,
            &self.positions,
            &self.live,
        )?;
        if change.is_empty() {
            return Ok(());
        }
        for edge in &change.added {
            observer.on_edge_added(edge);
        }
        for edge in &change.removed {
            observer.on_edge_removed(edge);
        }
        let touched = change.touched_nodes();
        self.refresh_neighbors(&touched);
        for node in touched {
            if self.is_live(node) {
                self.invoke(node, Hook::NeighborhoodChange)?;
            }
        }
        Ok(())
    }

    fn refresh_neighbors(&mut self, nodes: &[NodeId]) {
        for &node in nodes {
            let neighbors = self.graph.neighbors(node);
            if let Some(slot) = self.slot_mut(node) {
                slot.neighbors = neighbors;
            }
        }
    }

    /// Re-queue a periodic event while user activity remains.
    fn reschedule_periodic(&mut self, interval: f64, event: SimEvent<N>) -> SimResult<()> {
        if self.queue.iter().any(|(_, e)| !e.is_periodic()) {
            let now = self.clock.time;
            self.queue.insert(now, now + interval, event)?;
        }
        Ok(())
    }
}
