//! Directed edge arena and the connectivity pass.
//!
//! # Layout
//!
//! ```text
//! edges:  Vec<Option<Edge>>            indexed by EdgeId; None once removed
//! free:   Vec<EdgeId>                  removed slots, reused before growing
//! out:    Vec<Vec<EdgeId>>             per start node, sorted by end node
//! lookup: HashMap<(start, end), EdgeId>
//! ```
//!
//! The arena never holds more slots than the peak number of live edges.
//! A handle kept in a packet header names the edge the packet was sent
//! over; after that edge is removed the handle may name a newer one.

use tracing::debug;

use ws_core::{EdgeId, NodeId, Position};
use ws_radio::{ConnectivityModel, Endpoint};
use ws_spatial::SpatialIndex;

use crate::{SimError, SimResult};

#[cfg(feature = "fx-hash")]
type EdgeMap = rustc_hash::FxHashMap<(NodeId, NodeId), EdgeId>;
#[cfg(not(feature = "fx-hash"))]
type EdgeMap = std::collections::HashMap<(NodeId, NodeId), EdgeId>;

/// A directed link `start → end`.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id:       EdgeId,
    pub start:    NodeId,
    pub end:      NodeId,
    /// The `end → start` edge, if it exists.
    pub opposite: Option<EdgeId>,
    /// Confirmed by the connectivity pass in progress.
    valid:        bool,
}

impl Edge {
    pub fn is_bidirectional(&self) -> bool {
        self.opposite.is_some()
    }
}

/// Edges added and removed by one connectivity pass.
#[derive(Debug, Default)]
pub struct ConnectivityChange {
    pub added:   Vec<Edge>,
    pub removed: Vec<Edge>,
}

impl ConnectivityChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Start nodes whose outgoing edge set changed, ascending and unique.
    pub fn touched_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.added.iter().chain(&self.removed).map(|e| e.start).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }
}

#[derive(Default)]
pub struct Graph {
    edges:  Vec<Option<Edge>>,
    free:   Vec<EdgeId>,
    out:    Vec<Vec<EdgeId>>,
    lookup: EdgeMap,
    count:  usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    pub fn edge_between(&self, start: NodeId, end: NodeId) -> Option<EdgeId> {
        self.lookup.get(&(start, end)).copied()
    }

    /// Outgoing edges of `node`, ordered by end node.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.out
            .get(node.index())
            .into_iter()
            .flatten()
            .filter_map(|&id| self.edge(id))
    }

    /// End nodes of `node`'s outgoing edges, ascending.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.out_edges(node).map(|e| e.end).collect()
    }

    /// Every live edge, grouped by start node.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.out.iter().flatten().filter_map(|&id| self.edge(id))
    }

    pub fn edge_count(&self) -> usize {
        self.count
    }

    /// Arena slots, live or free.
    pub fn slot_count(&self) -> usize {
        self.edges.len()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add `start → end` unless it already exists.  Returns the handle and
    /// whether the edge is new.
    pub fn add_edge(&mut self, start: NodeId, end: NodeId) -> SimResult<(EdgeId, bool)> {
        if let Some(id) = self.edge_between(start, end) {
            return Ok((id, false));
        }
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = EdgeId::try_from(self.edges.len())
                    .ok()
                    .filter(|id| *id != EdgeId::INVALID)
                    .ok_or(SimError::EdgeArenaFull(self.edges.len()))?;
                self.edges.push(None);
                id
            }
        };
        let opposite = self.edge_between(end, start);
        if let Some(opp) = opposite {
            if let Some(e) = self.edges[opp.index()].as_mut() {
                e.opposite = Some(id);
            }
        }
        self.edges[id.index()] = Some(Edge { id, start, end, opposite, valid: true });
        self.lookup.insert((start, end), id);

        if self.out.len() <= start.index() {
            self.out.resize_with(start.index() + 1, Vec::new);
        }
        let edges = &self.edges;
        let out = &mut self.out[start.index()];
        let at = out.partition_point(|e| edges[e.index()].as_ref().is_some_and(|e| e.end < end));
        out.insert(at, id);
        self.count += 1;
        Ok((id, true))
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.get_mut(id.index())?.take()?;
        self.lookup.remove(&(edge.start, edge.end));
        if let Some(out) = self.out.get_mut(edge.start.index()) {
            out.retain(|&e| e != id);
        }
        if let Some(opp) = edge.opposite {
            if let Some(e) = self.edges[opp.index()].as_mut() {
                e.opposite = None;
            }
        }
        self.free.push(id);
        self.count -= 1;
        Some(edge)
    }

    /// Remove every edge starting or ending at `node`.
    pub fn remove_node(&mut self, node: NodeId) -> Vec<Edge> {
        let doomed: Vec<EdgeId> = self
            .edges()
            .filter(|e| e.start == node || e.end == node)
            .map(|e| e.id)
            .collect();
        doomed.into_iter().filter_map(|id| self.remove_edge(id)).collect()
    }

    /// Recompute the edge set of `nodes`.
    ///
    /// Every live edge is first marked unconfirmed.  Each node then asks
    /// `model` about each candidate the index reports near it, in ascending
    /// order; a connected pair confirms its edge or creates it.  Edges left
    /// unconfirmed are dying links and are removed.
    pub fn update_connections(
        &mut self,
        model:     &mut dyn ConnectivityModel,
        index:     &SpatialIndex,
        positions: &[Position],
        nodes:     &[NodeId],
    ) -> SimResult<ConnectivityChange> {
        for &id in self.out.iter().flatten() {
            if let Some(edge) = self.edges[id.index()].as_mut() {
                edge.valid = false;
            }
        }

        let mut change = ConnectivityChange::default();
        for &node in nodes {
            let from = Endpoint::new(node, positions[node.index()]);
            for candidate in index.candidates(node, from.position) {
                let to = Endpoint::new(candidate, positions[candidate.index()]);
                if !model.is_connected(from, to) {
                    continue;
                }
                let (id, created) = self.add_edge(node, candidate)?;
                if let Some(edge) = self.edges[id.index()].as_mut() {
                    edge.valid = true;
                    if created {
                        change.added.push(edge.clone());
                    }
                }
            }
        }

        let dying: Vec<EdgeId> = self.edges().filter(|e| !e.valid).map(|e| e.id).collect();
        change.removed = dying.into_iter().filter_map(|id| self.remove_edge(id)).collect();

        // Opposite handles may have changed after the snapshots were taken.
        for edge in &mut change.added {
            edge.opposite = self.edge(edge.id).and_then(|e| e.opposite);
        }

        if !change.is_empty() {
            debug!(
                added   = change.added.len(),
                removed = change.removed.len(),
                edges   = self.count,
                "connectivity changed"
            );
        }
        Ok(change)
    }
}
