//! flood: broadcast flooding over a random wireless deployment.
//!
//! Node 0 broadcasts a beacon; every node rebroadcasts the first copy it
//! hears.  Prints how many nodes were reached and after how many hops, and
//! writes round statistics plus the initial placement to the output
//! directory.
//!
//! ```text
//! cargo run -p flood                    # built-in defaults
//! cargo run -p flood -- demos/flood/flood.json
//! RUST_LOG=ws_sim=debug cargo run -p flood
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ws_core::{ModelParams, SimConfig};
use ws_node::{Inbox, Message, NodeBehavior, NodeCtx, Timer};
use ws_output::{CsvWriter, SimOutputObserver, write_positions};
use ws_sim::SimBuilder;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(default)]
struct FloodConfig {
    nodes:      usize,
    output_dir: PathBuf,
    sim:        SimConfig,
    params:     ModelParams,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            nodes:      100,
            output_dir: PathBuf::from("output/flood"),
            sim:        SimConfig { seed: 42, max_rounds: 50, ..SimConfig::default() },
            params:     ModelParams { udg_radius: Some(120.0), index_radius: 120.0, ..ModelParams::default() },
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FloodConfig> {
    let Some(path) = path else {
        return Ok(FloodConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ── Behavior ──────────────────────────────────────────────────────────────────

/// The flooded beacon: hop count so far.  Never mutated after sending, so
/// every copy of a broadcast shares one allocation.
#[derive(Clone, Debug)]
struct Beacon {
    hops: u32,
}

impl Message for Beacon {
    const READ_ONLY: bool = true;

    fn size(&self) -> usize {
        4
    }
}

#[derive(Default)]
struct Flooder {
    hops:   Option<u32>,
    nacks:  u32,
}

impl NodeBehavior for Flooder {
    type Msg = Beacon;

    fn init(&mut self, ctx: &mut NodeCtx<'_, Self>) {
        if ctx.id().index() == 0 {
            self.hops = Some(0);
            ctx.broadcast(Beacon { hops: 0 });
        }
    }

    fn handle_messages(&mut self, inbox: &mut Inbox<Beacon>, ctx: &mut NodeCtx<'_, Self>) {
        let Some(closest) = inbox.iter().map(|p| p.message().hops).min() else {
            return;
        };
        if self.hops.is_none() {
            let hops = closest + 1;
            self.hops = Some(hops);
            // Jitter the rebroadcast so neighbors do not all collide.
            let delay = ctx.rng().gen_range(0.1..1.0);
            if let Err(e) = ctx.start_timer_relative(delay, Rebroadcast) {
                warn!(node = %ctx.id(), error = %e, "rebroadcast not scheduled");
            }
        }
    }

    fn handle_nacks(&mut self, nacks: &mut Inbox<Beacon>, _ctx: &mut NodeCtx<'_, Self>) {
        self.nacks += nacks.len() as u32;
    }
}

struct Rebroadcast;

impl Timer<Flooder> for Rebroadcast {
    fn fire(self: Box<Self>, node: &mut Flooder, ctx: &mut NodeCtx<'_, Flooder>) {
        if let Some(hops) = node.hops {
            ctx.broadcast(Beacon { hops });
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(path.as_deref())?;
    info!(nodes = config.nodes, mode = ?config.sim.mode, seed = config.sim.seed, "flood starting");

    let nodes = (0..config.nodes).map(|_| Flooder::default()).collect();
    let mut sim = SimBuilder::new(config.sim.clone(), config.params.clone(), nodes).build()?;

    std::fs::create_dir_all(&config.output_dir)?;
    write_positions(&config.output_dir.join("positions.txt"), &sim.positions())?;
    let mut obs = SimOutputObserver::new(CsvWriter::new(&config.output_dir)?);

    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        warn!("output error: {e}");
    }

    let reached: Vec<u32> = sim.nodes().filter_map(|(_, n)| n.hops).collect();
    let nacks: u32 = sim.nodes().map(|(_, n)| n.nacks).sum();
    let totals = sim.totals();

    println!("Simulation complete in {:.3} s at {}", elapsed.as_secs_f64(), sim.clock());
    println!("  reached     : {} / {}", reached.len(), sim.node_count());
    println!("  max hops    : {}", reached.iter().max().copied().unwrap_or(0));
    println!("  delivered   : {}", totals.delivered);
    println!("  dropped     : {}", totals.dropped);
    println!("  disturbed   : {}", totals.disturbed);
    println!("  unconnected : {}", totals.not_connected);
    println!("  nacks       : {nacks}");
    println!("  output      : {}", config.output_dir.display());

    Ok(())
}
