//! Integration tests for ws-sim.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use ws_core::{ExecutionMode, ModelParams, Position, SimConfig, SimTime};
    use ws_node::{Inbox, Message, NodeBehavior, NodeCtx, Timer};

    use crate::{Edge, RoundStats, SimBuilder, SimObserver, Simulation};

    pub fn sync_config(max_rounds: u64) -> SimConfig {
        SimConfig { seed: 7, max_rounds, ..SimConfig::default() }
    }

    pub fn async_config(max_time: f64) -> SimConfig {
        SimConfig { mode: ExecutionMode::Asynchronous, seed: 7, max_time, ..SimConfig::default() }
    }

    /// UDG radius 15, index radius 20, constant transmission time 1.
    pub fn params() -> ModelParams {
        ModelParams { udg_radius: Some(15.0), index_radius: 20.0, ..ModelParams::default() }
    }

    /// Nodes spaced 10 apart on the x axis: neighbors are adjacent indices.
    pub fn line(n: usize) -> Vec<Position> {
        (0..n).map(|i| Position::planar(i as f64 * 10.0, 0.0)).collect()
    }

    pub fn build<N: NodeBehavior>(
        config:    SimConfig,
        params:    ModelParams,
        nodes:     Vec<N>,
        positions: Vec<Position>,
    ) -> Simulation<N> {
        SimBuilder::new(config, params, nodes).positions(positions).build().unwrap()
    }

    // ── Messages ──────────────────────────────────────────────────────────

    #[derive(Clone, Debug, PartialEq)]
    pub struct Note(pub u32);

    impl Message for Note {}

    #[derive(Clone, Debug, PartialEq)]
    pub struct Beacon(pub u32);

    impl Message for Beacon {
        const READ_ONLY: bool = true;
    }

    // ── Flooding ──────────────────────────────────────────────────────────

    /// Rebroadcasts the first beacon it sees.
    #[derive(Default)]
    pub struct Flood {
        pub source:      bool,
        pub seen:        bool,
        pub seen_at:     Option<SimTime>,
        pub payloads:    Vec<Arc<Beacon>>,
        pub changes:     u32,
    }

    impl Flood {
        pub fn source() -> Self {
            Self { source: true, ..Self::default() }
        }
    }

    impl NodeBehavior for Flood {
        type Msg = Beacon;

        fn pre_step(&mut self, ctx: &mut NodeCtx<'_, Self>) {
            if self.source && !self.seen {
                self.seen = true;
                self.seen_at = Some(ctx.now());
                ctx.broadcast(Beacon(1));
            }
        }

        fn handle_messages(&mut self, inbox: &mut Inbox<Beacon>, ctx: &mut NodeCtx<'_, Self>) {
            for packet in inbox.drain() {
                self.payloads.push(packet.shared());
            }
            if !self.payloads.is_empty() && !self.seen {
                self.seen = true;
                self.seen_at = Some(ctx.now());
                ctx.broadcast(Beacon(1));
            }
        }

        fn neighborhood_change(&mut self, _ctx: &mut NodeCtx<'_, Self>) {
            self.changes += 1;
        }
    }

    // ── Point-to-point ────────────────────────────────────────────────────

    /// Sends `count` notes to `target` from `init`, records what arrives.
    #[derive(Default)]
    pub struct Sender {
        pub target:   Option<(ws_core::NodeId, u32)>,
        pub received: Vec<(SimTime, Note)>,
        pub nacks:    Vec<Note>,
        pub copies:   Vec<Arc<Note>>,
        pub fired:    Vec<(SimTime, &'static str)>,
    }

    impl Sender {
        pub fn to(target: u32, count: u32) -> Self {
            Self { target: Some((ws_core::NodeId(target), count)), ..Self::default() }
        }
    }

    impl NodeBehavior for Sender {
        type Msg = Note;

        fn init(&mut self, ctx: &mut NodeCtx<'_, Self>) {
            if let Some((to, count)) = self.target {
                for i in 0..count {
                    ctx.send(to, Note(i));
                }
            }
        }

        fn handle_messages(&mut self, inbox: &mut Inbox<Note>, ctx: &mut NodeCtx<'_, Self>) {
            for packet in inbox.drain() {
                self.copies.push(packet.shared());
                self.received.push((ctx.now(), packet.into_message()));
            }
        }

        fn handle_nacks(&mut self, nacks: &mut Inbox<Note>, _ctx: &mut NodeCtx<'_, Self>) {
            for packet in nacks.drain() {
                self.nacks.push(packet.into_message());
            }
        }
    }

    /// Records its label and fire time on the node.
    pub struct Label(pub &'static str);

    impl Timer<Sender> for Label {
        fn fire(self: Box<Self>, node: &mut Sender, ctx: &mut NodeCtx<'_, Sender>) {
            node.fired.push((ctx.now(), self.0));
        }
    }

    /// Fires every time unit forever.
    pub struct Every;

    impl Timer<Sender> for Every {
        fn fire(self: Box<Self>, node: &mut Sender, ctx: &mut NodeCtx<'_, Sender>) {
            node.fired.push((ctx.now(), "every"));
            ctx.start_timer_relative(1.0, Every).unwrap();
        }
    }

    /// Sends one note to the given node when it fires.
    pub struct Post(pub ws_core::NodeId, pub u32);

    impl Timer<Sender> for Post {
        fn fire(self: Box<Self>, _node: &mut Sender, ctx: &mut NodeCtx<'_, Sender>) {
            ctx.send(self.0, Note(self.1));
        }
    }

    // ── Observer ──────────────────────────────────────────────────────────

    #[derive(Default)]
    pub struct Recorder {
        pub rounds:   Vec<RoundStats>,
        pub added:    Vec<Edge>,
        pub removed:  Vec<Edge>,
        pub events:   Vec<SimTime>,
        pub resolved: u64,
        pub ended:    Option<RoundStats>,
    }

    impl SimObserver for Recorder {
        fn on_round_end(&mut self, _round: ws_core::Round, stats: &RoundStats) {
            self.rounds.push(stats.clone());
        }

        fn on_event(&mut self, time: SimTime) {
            self.events.push(time);
        }

        fn on_packet_resolved(&mut self, _packet: &ws_radio::PacketHeader, _outcome: ws_radio::DeliveryOutcome) {
            self.resolved += 1;
        }

        fn on_edge_added(&mut self, edge: &Edge) {
            self.added.push(edge.clone());
        }

        fn on_edge_removed(&mut self, edge: &Edge) {
            self.removed.push(edge.clone());
        }

        fn on_sim_end(&mut self, _time: SimTime, totals: &RoundStats) {
            self.ended = Some(totals.clone());
        }
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use ws_core::{Area, NodeId, Position, SimConfig};
    use ws_mobility::GridDistribution;
    use ws_node::NoopNode;

    use super::helpers::*;
    use crate::{SimBuilder, SimError};

    #[test]
    fn edge_within_radius() {
        let sim = build(
            sync_config(1),
            params(),
            vec![NoopNode, NoopNode],
            vec![Position::planar(0.0, 0.0), Position::planar(5.0, 0.0)],
        );
        assert_eq!(sim.graph().edge_count(), 2);
        assert_eq!(sim.neighbors(NodeId(0)), Some(&[NodeId(1)][..]));
        let id = sim.graph().edge_between(NodeId(0), NodeId(1)).unwrap();
        assert!(sim.graph().edge(id).unwrap().is_bidirectional());
    }

    #[test]
    fn line_neighbors() {
        let sim = build(sync_config(1), params(), vec![NoopNode; 4], line(4));
        assert_eq!(sim.neighbors(NodeId(0)), Some(&[NodeId(1)][..]));
        assert_eq!(sim.neighbors(NodeId(2)), Some(&[NodeId(1), NodeId(3)][..]));
        assert_eq!(sim.graph().edge_count(), 6);
    }

    #[test]
    fn position_count_mismatch_errors() {
        let result = SimBuilder::new(sync_config(1), params(), vec![NoopNode; 3])
            .positions(line(2))
            .build();
        assert!(matches!(result, Err(SimError::NodeCountMismatch { expected: 3, got: 2, .. })));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = SimConfig { mobility_interval: 0.0, mobility: true, ..async_config(5.0) };
        let result = SimBuilder::new(config, params(), vec![NoopNode]).build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }

    #[test]
    fn random_placement_is_seeded() {
        let a = SimBuilder::new(sync_config(1), params(), vec![NoopNode; 20]).build().unwrap();
        let b = SimBuilder::new(sync_config(1), params(), vec![NoopNode; 20]).build().unwrap();
        assert_eq!(a.positions(), b.positions());
        let area = params().area;
        assert!(a.positions().iter().all(|&p| area.contains(p)));
    }

    #[test]
    fn distribution_override() {
        let mut p = params();
        p.area = Area::planar(20.0, 20.0);
        let sim = SimBuilder::new(sync_config(1), p, vec![NoopNode; 4])
            .distribution(GridDistribution)
            .build()
            .unwrap();
        assert_eq!(sim.position(NodeId(0)), Some(Position::planar(5.0, 5.0)));
        assert_eq!(sim.position(NodeId(3)), Some(Position::planar(15.0, 15.0)));
    }
}

// ── Synchronous driver ────────────────────────────────────────────────────────

#[cfg(test)]
mod sync_tests {
    use ws_core::{NodeId, Round, SimTime};
    use ws_node::{GlobalCtx, GlobalTimer, NoopNode};

    use super::helpers::*;
    use crate::{NoopObserver, SimError};

    #[test]
    fn flooding_reaches_every_node() {
        let mut nodes: Vec<Flood> = (0..5).map(|_| Flood::default()).collect();
        nodes[0] = Flood::source();
        let mut sim = build(sync_config(10), params(), nodes, line(5));
        sim.run(&mut NoopObserver).unwrap();

        for (id, node) in sim.nodes() {
            assert!(node.seen, "{id} never saw the beacon");
            // One hop per round, starting with the source in round 1.
            assert_eq!(node.seen_at, Some(SimTime(1.0 + id.index() as f64)));
        }
    }

    #[test]
    fn stops_at_max_rounds() {
        let mut sim = build(sync_config(7), params(), vec![NoopNode; 2], line(2));
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(sim.clock().round, Round(7));
        assert_eq!(sim.clock().time, SimTime(7.0));
        assert_eq!(rec.rounds.len(), 7);
        assert!(rec.ended.is_some());
    }

    #[test]
    fn lossless_link_delivers_everything() {
        let nodes = vec![Sender::to(1, 100), Sender::default()];
        let mut sim = build(sync_config(3), params(), nodes, line(2));
        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sim.totals().delivered, 100);
        assert_eq!(sim.totals().resolved(), 100);
        let received = &sim.node(NodeId(1)).unwrap().received;
        assert_eq!(received.len(), 100);
        assert!(received.iter().all(|(t, _)| *t == SimTime(1.0)));
        // Sends resolve in send order.
        assert_eq!(received[0].1, Note(0));
        assert_eq!(received[99].1, Note(99));
    }

    #[test]
    fn lossy_link_drops_everything_at_rate_one() {
        let mut p = params();
        p.drop_rate = 1.0;
        let nodes = vec![Sender::to(1, 10), Sender::default()];
        let mut sim = build(sync_config(2), p, nodes, line(2));
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.totals().dropped, 10);
        assert!(sim.node(NodeId(1)).unwrap().received.is_empty());
    }

    #[test]
    fn nack_for_unconnected_send() {
        let mut config = sync_config(2);
        config.generate_nacks = true;
        let nodes = vec![Sender::to(1, 1), Sender::default()];
        let far = vec![ws_core::Position::planar(0.0, 0.0), ws_core::Position::planar(500.0, 0.0)];
        let mut sim = build(config, params(), nodes, far);
        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sim.totals().not_connected, 1);
        assert_eq!(sim.node(NodeId(0)).unwrap().nacks, vec![Note(0)]);
        assert!(sim.node(NodeId(1)).unwrap().received.is_empty());
    }

    #[test]
    fn failures_silent_without_nacks() {
        let nodes = vec![Sender::to(1, 1), Sender::default()];
        let far = vec![ws_core::Position::planar(0.0, 0.0), ws_core::Position::planar(500.0, 0.0)];
        let mut sim = build(sync_config(2), params(), nodes, far);
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.totals().not_connected, 1);
        assert!(sim.node(NodeId(0)).unwrap().nacks.is_empty());
    }

    #[test]
    fn sync_timer_fires_in_its_round() {
        struct Arm;
        impl GlobalTimer<Sender> for Arm {
            fn fire(self: Box<Self>, ctx: &mut GlobalCtx<'_, Sender>) {
                ctx.start_node_timer_relative(NodeId(0), 1.5, Label("late")).unwrap();
            }
        }

        let mut sim = build(sync_config(5), params(), vec![Sender::default()], line(1));
        sim.start_global_timer_relative(1.0, Arm).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        // Armed in round 1 for time 2.5, so it fires at the end of round 3.
        assert_eq!(sim.node(NodeId(0)).unwrap().fired, vec![(SimTime(3.0), "late")]);
    }

    #[test]
    fn stop_ends_the_run() {
        struct Halt;
        impl GlobalTimer<NoopNode> for Halt {
            fn fire(self: Box<Self>, ctx: &mut GlobalCtx<'_, NoopNode>) {
                ctx.stop();
            }
        }

        let mut sim = build(sync_config(100), params(), vec![NoopNode; 2], line(2));
        sim.start_global_timer_relative(3.0, Halt).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.clock().round, Round(3));
    }

    #[test]
    fn non_positive_delay_is_an_error() {
        struct Never;
        impl GlobalTimer<NoopNode> for Never {
            fn fire(self: Box<Self>, _ctx: &mut GlobalCtx<'_, NoopNode>) {}
        }

        let mut sim = build(sync_config(1), params(), vec![NoopNode], line(1));
        assert!(matches!(sim.start_global_timer_relative(0.0, Never), Err(SimError::Schedule(_))));
        assert!(matches!(
            sim.start_global_timer_absolute(SimTime::ZERO, Never),
            Err(SimError::Schedule(_))
        ));
    }

    /// Starts a timer with a zero delay from `pre_step` or `init`.
    struct Impatient {
        on_init: bool,
    }

    struct Nudge;

    impl ws_node::Timer<Impatient> for Nudge {
        fn fire(self: Box<Self>, _node: &mut Impatient, _ctx: &mut ws_node::NodeCtx<'_, Impatient>) {}
    }

    impl ws_node::NodeBehavior for Impatient {
        type Msg = Note;

        fn init(&mut self, ctx: &mut ws_node::NodeCtx<'_, Self>) {
            if self.on_init {
                assert!(ctx.start_timer_relative(0.0, Nudge).is_err());
            }
        }

        fn pre_step(&mut self, ctx: &mut ws_node::NodeCtx<'_, Self>) {
            assert!(ctx.start_timer_relative(-1.0, Nudge).is_err());
        }

        fn handle_messages(&mut self, _inbox: &mut ws_node::Inbox<Note>, _ctx: &mut ws_node::NodeCtx<'_, Self>) {}
    }

    #[test]
    fn rejected_node_timer_aborts_the_run() {
        let mut sim = build(sync_config(5), params(), vec![Impatient { on_init: false }], line(1));
        let result = sim.run(&mut NoopObserver);
        assert!(matches!(result, Err(SimError::Schedule(ws_schedule::ScheduleError::NonPositiveDelay(_)))));
        assert_eq!(sim.clock().round, Round(1));
    }

    #[test]
    fn rejected_timer_in_init_fails_the_build() {
        let result = crate::SimBuilder::new(sync_config(5), params(), vec![Impatient { on_init: true }])
            .positions(line(1))
            .build();
        assert!(matches!(result, Err(SimError::Schedule(_))));
    }

    #[test]
    fn step_event_wrong_mode() {
        let mut sim = build(sync_config(1), params(), vec![NoopNode], line(1));
        assert!(matches!(sim.step_event(&mut NoopObserver), Err(SimError::WrongMode { .. })));
    }
}

// ── Asynchronous driver ───────────────────────────────────────────────────────

#[cfg(test)]
mod async_tests {
    use ws_core::{NodeId, SimConfig, SimTime};
    use ws_node::{NodeBehavior, NodeCtx};

    use super::helpers::*;
    use crate::{NoopObserver, SimError};

    /// Starts labelled timers from `init`.
    struct Timed(Sender);

    impl NodeBehavior for Timed {
        type Msg = Note;
        fn init(&mut self, ctx: &mut NodeCtx<'_, Self>) {
            ctx.start_timer_relative(1.0, TimedLabel("a")).unwrap();
            ctx.start_timer_relative(1.0, TimedLabel("b")).unwrap();
            ctx.start_timer_relative(0.5, TimedLabel("c")).unwrap();
            let cancelled = ctx.start_timer_relative(0.7, TimedLabel("x")).unwrap();
            cancelled.deactivate();
        }
        fn handle_messages(&mut self, _inbox: &mut ws_node::Inbox<Note>, _ctx: &mut NodeCtx<'_, Self>) {}
    }

    struct TimedLabel(&'static str);

    impl ws_node::Timer<Timed> for TimedLabel {
        fn fire(self: Box<Self>, node: &mut Timed, ctx: &mut NodeCtx<'_, Timed>) {
            node.0.fired.push((ctx.now(), self.0));
        }
    }

    /// Asynchronous run with a static graph, so only user events are queued.
    fn static_config(max_time: f64) -> SimConfig {
        SimConfig { connectivity: false, ..async_config(max_time) }
    }

    #[test]
    fn timer_fires_at_exact_time() {
        struct Once;
        impl NodeBehavior for Once {
            type Msg = Note;
            fn init(&mut self, ctx: &mut NodeCtx<'_, Self>) {
                ctx.start_timer_relative(2.5, Mark).unwrap();
            }
            fn handle_messages(&mut self, _inbox: &mut ws_node::Inbox<Note>, _ctx: &mut NodeCtx<'_, Self>) {}
        }
        struct Mark;
        impl ws_node::Timer<Once> for Mark {
            fn fire(self: Box<Self>, _node: &mut Once, ctx: &mut NodeCtx<'_, Once>) {
                assert_eq!(ctx.now(), SimTime(2.5));
            }
        }

        let mut sim = build(static_config(10.0), params(), vec![Once], line(1));
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.events, vec![SimTime(2.5)]);
        assert_eq!(sim.clock().time, SimTime(2.5));
    }

    #[test]
    fn same_time_events_fire_in_insertion_order() {
        let mut sim = build(async_config(10.0), params(), vec![Timed(Sender::default())], line(1));
        sim.run(&mut NoopObserver).unwrap();
        let fired = &sim.node(NodeId(0)).unwrap().0.fired;
        assert_eq!(fired, &vec![(SimTime(0.5), "c"), (SimTime(1.0), "a"), (SimTime(1.0), "b")]);
    }

    #[test]
    fn arrival_runs_handler_immediately() {
        let nodes = vec![Sender::to(1, 2), Sender::default()];
        let mut sim = build(async_config(10.0), params(), nodes, line(2));
        sim.run(&mut NoopObserver).unwrap();

        let received = &sim.node(NodeId(1)).unwrap().received;
        assert_eq!(received, &vec![(SimTime(1.0), Note(0)), (SimTime(1.0), Note(1))]);
        assert_eq!(sim.totals().delivered, 2);
    }

    #[test]
    fn max_time_bounds_repeating_timers() {
        struct Start;
        impl ws_node::GlobalTimer<Sender> for Start {
            fn fire(self: Box<Self>, ctx: &mut ws_node::GlobalCtx<'_, Sender>) {
                ctx.start_node_timer_relative(NodeId(0), 1.0, Every).unwrap();
            }
        }

        let mut sim = build(static_config(10.0), params(), vec![Sender::default()], line(1));
        sim.start_global_timer_relative(0.5, Start).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        let fired = &sim.node(NodeId(0)).unwrap().fired;
        // 1.5, 2.5, …, 9.5; the one at 10.5 stays queued.
        assert_eq!(fired.len(), 9);
        assert_eq!(fired.last().map(|f| f.0), Some(SimTime(9.5)));
        assert_eq!(sim.pending_events(), 1);
    }

    #[test]
    fn rejected_global_timer_aborts_the_run() {
        struct Again;
        impl ws_node::GlobalTimer<Sender> for Again {
            fn fire(self: Box<Self>, ctx: &mut ws_node::GlobalCtx<'_, Sender>) {
                let now = ctx.now();
                assert!(ctx.start_global_timer_absolute(now, Again).is_err());
            }
        }

        let mut sim = build(static_config(10.0), params(), vec![Sender::default()], line(1));
        sim.start_global_timer_relative(2.0, Again).unwrap();
        let result = sim.run(&mut NoopObserver);
        assert!(matches!(result, Err(SimError::Schedule(ws_schedule::ScheduleError::NotInFuture { .. }))));
        assert_eq!(sim.clock().time, SimTime(2.0));
    }

    #[test]
    fn step_round_wrong_mode() {
        let mut sim = build(async_config(1.0), params(), vec![Sender::default()], line(1));
        assert!(matches!(sim.step_round(&mut NoopObserver), Err(SimError::WrongMode { .. })));
    }
}

// ── Broadcast and interference ────────────────────────────────────────────────

#[cfg(test)]
mod radio_tests {
    use std::sync::Arc;

    use ws_core::{NodeId, Position, SimConfig};
    use ws_node::{Inbox, NodeBehavior, NodeCtx};

    use super::helpers::*;
    use crate::NoopObserver;

    /// Broadcasts `message` once from `init`.
    struct Shout<M: ws_node::Message> {
        message: Option<M>,
        got:     Vec<Arc<M>>,
    }

    impl<M: ws_node::Message> Shout<M> {
        fn new(message: Option<M>) -> Self {
            Self { message, got: Vec::new() }
        }
    }

    impl<M: ws_node::Message> NodeBehavior for Shout<M> {
        type Msg = M;

        fn init(&mut self, ctx: &mut NodeCtx<'_, Self>) {
            if let Some(m) = self.message.take() {
                ctx.broadcast(m);
            }
        }

        fn handle_messages(&mut self, inbox: &mut Inbox<M>, _ctx: &mut NodeCtx<'_, Self>) {
            self.got.extend(inbox.drain().map(|p| p.shared()));
        }
    }

    fn star() -> Vec<Position> {
        vec![
            Position::planar(0.0, 0.0),
            Position::planar(10.0, 0.0),
            Position::planar(0.0, 10.0),
            Position::planar(-10.0, 0.0),
        ]
    }

    #[test]
    fn broadcast_has_one_active_copy() {
        let config = SimConfig { interference: true, ..sync_config(3) };
        let nodes = vec![Shout::new(Some(Note(1))), Shout::new(None), Shout::new(None), Shout::new(None)];
        let sim = build(config, params(), nodes, star());
        assert_eq!(sim.packets_in_flight(), 3);
        assert_eq!(sim.air().active_count(), 1);
        assert_eq!(sim.air().passive_count(), 2);
    }

    #[test]
    fn read_only_payload_is_shared() {
        let nodes = vec![Shout::new(Some(Beacon(9))), Shout::new(None), Shout::new(None), Shout::new(None)];
        let mut sim = build(sync_config(2), params(), nodes, star());
        sim.run(&mut NoopObserver).unwrap();
        let a = &sim.node(NodeId(1)).unwrap().got[0];
        let b = &sim.node(NodeId(2)).unwrap().got[0];
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn mutable_payload_is_copied() {
        let nodes = vec![Shout::new(Some(Note(9))), Shout::new(None), Shout::new(None), Shout::new(None)];
        let mut sim = build(sync_config(2), params(), nodes, star());
        sim.run(&mut NoopObserver).unwrap();
        let a = &sim.node(NodeId(1)).unwrap().got[0];
        let b = &sim.node(NodeId(2)).unwrap().got[0];
        assert!(!Arc::ptr_eq(a, b));
        assert_eq!(**a, **b);
    }

    #[test]
    fn parallel_reception_disabled_disturbs_both() {
        let config = SimConfig { interference: true, ..sync_config(3) };
        let mut p = params();
        p.can_receive_multiple_in_parallel = false;
        let nodes = vec![Sender::to(1, 1), Sender::default(), Sender::to(1, 1)];
        let mut sim = build(config, p, nodes, line(3));
        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sim.totals().disturbed, 2);
        assert!(sim.node(NodeId(1)).unwrap().received.is_empty());
        assert!(sim.air().is_empty());
    }

    #[test]
    fn async_parallel_reception_disabled_disturbs_both() {
        let config = SimConfig { interference: true, ..async_config(10.0) };
        let mut p = params();
        p.can_receive_multiple_in_parallel = false;
        let nodes = vec![Sender::to(1, 1), Sender::default(), Sender::to(1, 1)];
        let mut sim = build(config, p, nodes, line(3));
        assert_eq!(sim.air().active_count(), 2);
        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sim.totals().disturbed, 2);
        assert!(sim.node(NodeId(1)).unwrap().received.is_empty());
        assert!(sim.air().is_empty());
    }

    #[test]
    fn async_retest_after_each_removal_keeps_clean_packets() {
        let config = SimConfig { interference: true, ..async_config(10.0) };
        let mut p = params();
        p.sinr_beta = 0.7;
        let nodes = vec![Sender::to(1, 1), Sender::default(), Sender::to(1, 1)];
        let mut sim = build(config, p, nodes, line(3));

        assert!(sim.step_event(&mut NoopObserver).unwrap());
        assert_eq!(sim.air().len(), 1, "first arrival left the air");
        assert!(sim.air().iter().all(|h| h.positive_delivery()));
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.totals().delivered, 2);
        assert_eq!(sim.node(NodeId(1)).unwrap().received.len(), 2);
    }

    #[test]
    fn async_broadcast_copies_leave_the_air() {
        let config = SimConfig { interference: true, ..async_config(10.0) };
        let nodes = vec![Shout::new(Some(Note(1))), Shout::new(None), Shout::new(None), Shout::new(None)];
        let mut sim = build(config, params(), nodes, star());
        sim.run(&mut NoopObserver).unwrap();
        assert!(sim.air().is_empty());
        assert_eq!(sim.totals().delivered, 3);
        for id in 1..4 {
            assert_eq!(sim.node(NodeId(id)).unwrap().got.len(), 1);
        }
    }

    #[test]
    fn parallel_reception_allowed_delivers_both() {
        let config = SimConfig { interference: true, ..sync_config(3) };
        let mut p = params();
        // Equal distance, equal power: SINR is 1, above the 0.7 threshold.
        p.sinr_beta = 0.7;
        let nodes = vec![Sender::to(1, 1), Sender::default(), Sender::to(1, 1)];
        let mut sim = build(config, p, nodes, line(3));
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.totals().delivered, 2);
    }
}

// ── Topology changes ──────────────────────────────────────────────────────────

#[cfg(test)]
mod topology_tests {
    use ws_core::{NodeId, Position, SimConfig};

    use super::helpers::*;
    use crate::{NoopObserver, SimBuilder, SimError};

    #[test]
    fn connectivity_pass_is_idempotent() {
        let mut sim = build(sync_config(3), params(), vec![Flood::default(), Flood::default(), Flood::default()], line(3));
        let before = sim.graph().edge_count();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert!(rec.added.is_empty());
        assert!(rec.removed.is_empty());
        assert_eq!(sim.graph().edge_count(), before);
        assert!(sim.nodes().all(|(_, n)| n.changes == 0));
    }

    #[test]
    fn moving_away_removes_edges() {
        let mut sim = build(sync_config(5), params(), vec![Flood::default(), Flood::default()], line(2));
        sim.set_position(NodeId(1), Position::planar(100.0, 0.0)).unwrap();
        let mut rec = Recorder::default();
        sim.step_round(&mut rec).unwrap();

        assert_eq!(rec.removed.len(), 2);
        assert_eq!(sim.graph().edge_count(), 0);
        assert_eq!(sim.neighbors(NodeId(0)), Some(&[][..]));
        assert_eq!(sim.node(NodeId(0)).unwrap().changes, 1);
        assert_eq!(sim.node(NodeId(1)).unwrap().changes, 1);
    }

    #[test]
    fn static_graph_without_connectivity_updates() {
        let config = SimConfig { connectivity: false, ..sync_config(5) };
        let mut sim = build(config, params(), vec![Flood::default(), Flood::default()], line(2));
        sim.set_position(NodeId(1), Position::planar(100.0, 0.0)).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.graph().edge_count(), 2);
    }

    #[test]
    fn remove_node_drops_edges_and_packets() {
        let nodes = vec![Sender::to(1, 3), Sender::default(), Sender::default()];
        let mut sim = build(sync_config(3), params(), nodes, line(3));
        assert_eq!(sim.packets_in_flight(), 3);

        sim.remove_node(NodeId(1)).unwrap();
        assert_eq!(sim.packets_in_flight(), 0);
        assert_eq!(sim.pending_events(), 0);
        assert_eq!(sim.graph().edge_count(), 0);
        assert_eq!(sim.node_ids(), &[NodeId(0), NodeId(2)]);
        assert!(!sim.is_live(NodeId(1)));
        assert_eq!(sim.neighbors(NodeId(0)), Some(&[][..]));

        assert!(matches!(sim.remove_node(NodeId(1)), Err(SimError::Core(_))));
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.totals().resolved(), 0);
    }

    #[test]
    fn removed_node_timers_never_fire() {
        struct Arm;
        impl ws_node::GlobalTimer<Sender> for Arm {
            fn fire(self: Box<Self>, ctx: &mut ws_node::GlobalCtx<'_, Sender>) {
                ctx.start_node_timer_relative(NodeId(1), 1.0, Label("gone")).unwrap();
            }
        }

        let config = SimConfig { connectivity: false, ..async_config(10.0) };
        let mut sim = build(config, params(), vec![Sender::default(), Sender::default()], line(2));
        sim.start_global_timer_relative(1.0, Arm).unwrap();
        assert!(sim.step_event(&mut NoopObserver).unwrap());
        assert_eq!(sim.pending_events(), 1);
        let removed = sim.remove_node(NodeId(1)).unwrap();
        assert!(removed.fired.is_empty());
        assert_eq!(sim.pending_events(), 0);
    }

    #[test]
    fn sending_to_removed_node_is_not_connected() {
        let config = SimConfig { generate_nacks: true, ..sync_config(3) };
        let mut sim = build(config, params(), vec![Sender::default(), Sender::default()], line(2));
        sim.remove_node(NodeId(1)).unwrap();
        sim.send(NodeId(0), NodeId(1), Note(0), None).unwrap();
        sim.send(NodeId(0), NodeId(7), Note(1), None).unwrap();
        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sim.totals().not_connected, 2);
        assert_eq!(sim.node(NodeId(0)).unwrap().nacks, vec![Note(0), Note(1)]);
    }

    #[test]
    fn sending_from_removed_node_is_fatal() {
        let mut sim = build(sync_config(3), params(), vec![Sender::default(), Sender::default()], line(2));
        sim.remove_node(NodeId(1)).unwrap();
        let err = sim.send(NodeId(1), NodeId(0), Note(0), None);
        assert!(matches!(err, Err(SimError::Core(ws_core::WsError::NodeNotFound(_)))));
    }

    #[test]
    fn async_connectivity_follows_moved_node() {
        struct Arm;
        impl ws_node::GlobalTimer<Sender> for Arm {
            fn fire(self: Box<Self>, ctx: &mut ws_node::GlobalCtx<'_, Sender>) {
                ctx.start_node_timer_relative(NodeId(0), 0.5, Post(NodeId(1), 42)).unwrap();
            }
        }

        let config = async_config(10.0);
        assert!(!config.mobility);
        let mut sim = build(config, params(), vec![Sender::default(), Sender::default()], line(2));
        sim.set_position(NodeId(1), Position::planar(1000.0, 0.0)).unwrap();
        sim.start_global_timer_relative(2.0, Arm).unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.removed.len(), 2);
        assert_eq!(sim.graph().edge_count(), 0);
        assert_eq!(sim.neighbors(NodeId(0)), Some(&[][..]));
        assert!(sim.node(NodeId(1)).unwrap().received.is_empty());
        assert_eq!(sim.totals().not_connected, 1);
        assert_eq!(sim.totals().delivered, 0);
    }

    #[test]
    fn async_static_graph_keeps_edges() {
        let config = SimConfig { connectivity: false, ..async_config(10.0) };
        let nodes = vec![Sender::default(), Sender::default()];
        let mut sim = build(config, params(), nodes, line(2));
        sim.set_position(NodeId(1), Position::planar(1000.0, 0.0)).unwrap();
        sim.start_global_timer_relative(1.0, Noop).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.graph().edge_count(), 2);
    }

    struct Noop;

    impl ws_node::GlobalTimer<Sender> for Noop {
        fn fire(self: Box<Self>, _ctx: &mut ws_node::GlobalCtx<'_, Sender>) {}
    }

    #[test]
    fn edge_slots_are_reused() {
        let mut sim = build(sync_config(100), params(), vec![Flood::default(), Flood::default()], line(2));
        for _ in 0..20 {
            sim.set_position(NodeId(1), Position::planar(100.0, 0.0)).unwrap();
            sim.step_round(&mut NoopObserver).unwrap();
            assert_eq!(sim.graph().edge_count(), 0);
            sim.set_position(NodeId(1), Position::planar(10.0, 0.0)).unwrap();
            sim.step_round(&mut NoopObserver).unwrap();
            assert_eq!(sim.graph().edge_count(), 2);
        }
        assert_eq!(sim.graph().slot_count(), 2);
        assert_eq!(sim.graph().edges().count(), 2);
        let id = sim.graph().edge_between(NodeId(0), NodeId(1)).unwrap();
        assert!(sim.graph().edge(id).unwrap().is_bidirectional());
    }

    #[test]
    fn waypoint_churn_keeps_arena_bounded() {
        let config = SimConfig { mobility: true, ..sync_config(500) };
        let mut p = params();
        p.area = ws_core::Area::planar(60.0, 60.0);
        p.mobility = ws_core::MobilityParams::RandomWaypoint { speed_min: 2.0, speed_max: 5.0, pause: 0.0 };
        let n = 10;
        let mut sim = SimBuilder::new(config, p, (0..n).map(|_| Flood::default()).collect()).build().unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert!(sim.graph().slot_count() <= n * (n - 1));
    }

    #[test]
    fn waypoint_mobility_moves_nodes() {
        let config = SimConfig { mobility: true, ..sync_config(5) };
        let mut p = params();
        p.mobility = ws_core::MobilityParams::RandomWaypoint { speed_min: 1.0, speed_max: 2.0, pause: 0.0 };
        let mut sim = build(config, p, vec![Flood::default(), Flood::default()], line(2));
        let start = sim.positions();
        sim.run(&mut NoopObserver).unwrap();
        let end = sim.positions();
        assert_ne!(start, end);
        for (a, b) in start.iter().zip(&end) {
            // Never faster than speed_max for 5 rounds.
            assert!(a.distance_to(*b) <= 10.0 + 1e-9);
        }
    }
}
