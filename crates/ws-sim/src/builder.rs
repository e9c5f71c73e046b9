//! Fluent builder for constructing a [`Simulation`].

use tracing::debug;

use ws_core::{
    ConnectivityKind, ExecutionMode, MobilityParams, ModelParams, NodeId, NodeRng, Position, SimClock,
    SimConfig, SimRng,
};
use ws_mobility::{DistributionModel, MobilityModel, NoMobility, RandomDistribution, RandomWaypoint};
use ws_node::NodeBehavior;
use ws_radio::{
    AirMode, ConnectivityModel, InterferenceModel, LossyDelivery, NoInterference, PacketsInTheAir,
    QuasiUnitDiskGraph, ReliabilityModel, ReliableDelivery, Sinr, TransmissionModel, UnitDiskGraph,
};
use ws_schedule::{EventQueue, TimerBag};
use ws_spatial::SpatialIndex;

use crate::sim::{Models, NodeSlot, PacketMap};
use crate::{Graph, RoundStats, SimError, SimResult, Simulation};

// Child stream offsets of the root `SimRng`.  Every stream is derived even
// when its model is overridden, so a run only changes where it must.
const STREAM_DISTRIBUTION: u64 = 0;
const STREAM_CONNECTIVITY: u64 = 1;
const STREAM_TRANSMISSION: u64 = 2;
const STREAM_RELIABILITY: u64 = 3;
const STREAM_MOBILITY: u64 = 4;
const STREAM_GLOBAL: u64 = 5;

/// Fluent builder for [`Simulation<N>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: mode, seed, limits, feature switches
/// - [`ModelParams`]: numeric model parameters and model selection
/// - one `N: NodeBehavior` per node; node `i` gets `NodeId(i)`
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                           |
/// |----------------------|---------------------------------------------------|
/// | `.positions(v)`      | drawn by the distribution model                   |
/// | `.distribution(d)`   | `RandomDistribution` over `params.area`           |
/// | `.connectivity(m)`   | UDG or quasi-UDG per `params.connectivity_model`  |
/// | `.transmission(m)`   | built from `params.transmission`                  |
/// | `.reliability(m)`    | `LossyDelivery` if `drop_rate > 0`, else reliable |
/// | `.interference(m)`   | `Sinr` if `config.interference`, else none        |
/// | `.mobility(m)`       | per `params.mobility` if `config.mobility`        |
///
/// # Example
///
/// ```rust,ignore
/// let nodes = (0..50).map(|_| Flood::default()).collect();
/// let mut sim = SimBuilder::new(config, params, nodes)
///     .distribution(GridDistribution)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<N: NodeBehavior> {
    config:       SimConfig,
    params:       ModelParams,
    nodes:        Vec<N>,
    positions:    Option<Vec<Position>>,
    distribution: Option<Box<dyn DistributionModel>>,
    connectivity: Option<Box<dyn ConnectivityModel>>,
    transmission: Option<Box<dyn TransmissionModel>>,
    reliability:  Option<Box<dyn ReliabilityModel>>,
    interference: Option<Box<dyn InterferenceModel>>,
    mobility:     Option<Box<dyn MobilityModel>>,
}

impl<N: NodeBehavior> SimBuilder<N> {
    pub fn new(config: SimConfig, params: ModelParams, nodes: Vec<N>) -> Self {
        Self {
            config,
            params,
            nodes,
            positions:    None,
            distribution: None,
            connectivity: None,
            transmission: None,
            reliability:  None,
            interference: None,
            mobility:     None,
        }
    }

    /// Explicit initial positions, one per node.  Takes precedence over
    /// [`distribution`](Self::distribution).
    pub fn positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn distribution(mut self, model: impl DistributionModel + 'static) -> Self {
        self.distribution = Some(Box::new(model));
        self
    }

    /// Replace the connectivity model.  The spatial index still only
    /// reports candidates within `params.index_radius`.
    pub fn connectivity(mut self, model: impl ConnectivityModel + 'static) -> Self {
        self.connectivity = Some(Box::new(model));
        self
    }

    pub fn transmission(mut self, model: impl TransmissionModel + 'static) -> Self {
        self.transmission = Some(Box::new(model));
        self
    }

    pub fn reliability(mut self, model: impl ReliabilityModel + 'static) -> Self {
        self.reliability = Some(Box::new(model));
        self
    }

    /// Only consulted when `config.interference` is on.
    pub fn interference(mut self, model: impl InterferenceModel + 'static) -> Self {
        self.interference = Some(Box::new(model));
        self
    }

    /// Only consulted when `config.mobility` is on.
    pub fn mobility(mut self, model: impl MobilityModel + 'static) -> Self {
        self.mobility = Some(Box::new(model));
        self
    }

    /// Validate inputs, place nodes, build the models and the initial graph,
    /// run every node's `init`, and return a ready-to-run [`Simulation`].
    pub fn build(self) -> SimResult<Simulation<N>> {
        self.config.validate()?;
        self.params.validate()?;
        let count = self.nodes.len();
        let config = self.config;
        let params = self.params;

        let mut root = SimRng::new(config.seed);
        let distribution_rng = root.child(STREAM_DISTRIBUTION);
        let connectivity_rng = root.child(STREAM_CONNECTIVITY);
        let transmission_rng = root.child(STREAM_TRANSMISSION);
        let reliability_rng = root.child(STREAM_RELIABILITY);
        let mobility_rng = root.child(STREAM_MOBILITY);
        let global_rng = root.child(STREAM_GLOBAL);

        // ── Placement ─────────────────────────────────────────────────────
        let positions = match self.positions {
            Some(p) => {
                if p.len() != count {
                    return Err(SimError::NodeCountMismatch {
                        expected: count,
                        got:      p.len(),
                        what:     "positions",
                    });
                }
                p
            }
            None => {
                let mut model: Box<dyn DistributionModel> = match self.distribution {
                    Some(m) => m,
                    None => Box::new(RandomDistribution::new(distribution_rng)),
                };
                let p = model.positions(count, params.area)?;
                if p.len() != count {
                    return Err(SimError::NodeCountMismatch {
                        expected: count,
                        got:      p.len(),
                        what:     "distributed positions",
                    });
                }
                p
            }
        };

        let mut index = SpatialIndex::new(params.index_radius)?;
        index.rebuild(positions.iter().enumerate().map(|(i, &p)| (NodeId(i as u32), p)));

        // ── Models ────────────────────────────────────────────────────────
        let connectivity: Box<dyn ConnectivityModel> = match self.connectivity {
            Some(m) => m,
            None => match params.connectivity_model {
                ConnectivityKind::UnitDisk => Box::new(UnitDiskGraph::new(&params, &index)?),
                ConnectivityKind::QuasiUnitDisk => {
                    Box::new(QuasiUnitDiskGraph::new(&params, &index, connectivity_rng)?)
                }
            },
        };
        let transmission = match self.transmission {
            Some(m) => m,
            None => ws_radio::transmission::from_params(&params.transmission, transmission_rng)?,
        };
        let reliability: Box<dyn ReliabilityModel> = match self.reliability {
            Some(m) => m,
            None if params.drop_rate > 0.0 => Box::new(LossyDelivery::new(params.drop_rate, reliability_rng)?),
            None => Box::new(ReliableDelivery),
        };
        let interference: Box<dyn InterferenceModel> = match self.interference {
            Some(m) => m,
            None if config.interference => Box::new(Sinr::new(&params)?),
            None => Box::new(NoInterference),
        };
        let mobility: Box<dyn MobilityModel> = match (self.mobility, &params.mobility) {
            (Some(m), _) => m,
            (None, MobilityParams::RandomWaypoint { speed_min, speed_max, pause }) if config.mobility => {
                Box::new(RandomWaypoint::new(params.area, *speed_min, *speed_max, *pause, mobility_rng)?)
            }
            (None, _) => Box::new(NoMobility),
        };

        let air = PacketsInTheAir::new(interference, AirMode {
            interference: config.interference,
            additive:     config.interference_is_additive,
            asynchronous: config.mode == ExecutionMode::Asynchronous,
        });

        // ── Nodes ─────────────────────────────────────────────────────────
        let nodes: Vec<Option<NodeSlot<N>>> = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, behavior)| {
                let id = NodeId(i as u32);
                Some(NodeSlot::new(behavior, NodeRng::new(config.seed, id)))
            })
            .collect();
        let live: Vec<NodeId> = (0..count).map(|i| NodeId(i as u32)).collect();

        let clock = SimClock::new(config.mode);
        debug!(nodes = count, mode = ?config.mode, seed = config.seed, "building simulation");

        let mut sim = Simulation {
            round_stats:    RoundStats::new(clock.round, clock.time),
            totals:         RoundStats::new(clock.round, clock.time),
            clock,
            config,
            params,
            nodes,
            live,
            positions,
            index,
            graph:          Graph::new(),
            models:         Models { connectivity, transmission, reliability, mobility },
            air,
            packets:        PacketMap::default(),
            queue:          EventQueue::new(),
            global_timers:  TimerBag::new(),
            rng:            global_rng,
            next_packet:    0,
            stop_requested: false,
        };
        sim.initialize()?;
        Ok(sim)
    }
}
