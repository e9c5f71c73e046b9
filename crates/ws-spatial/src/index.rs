//! R-tree backed node index.
//!
//! # Data layout
//!
//! An R-tree (via `rstar`) holds one `NodeEntry` per live node.  A parallel
//! `Vec<Option<Position>>` indexed by `NodeId` remembers where each entry was
//! inserted so a moved node can be removed and re-inserted without a scan.
//!
//! Mobility moves every node once per round, so [`SpatialIndex::rebuild`]
//! bulk-loads from scratch (O(N log N)) instead of issuing N remove/insert
//! pairs.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use ws_core::{NodeId, Position};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone, PartialEq)]
struct NodeEntry {
    point: [f64; 3],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Bounded-radius neighbor index.
///
/// `max_radius` is the index-wide bound: [`candidates`](Self::candidates)
/// never reports a node farther away than that, whatever radius the caller's
/// connectivity model uses.
pub struct SpatialIndex {
    max_radius: f64,
    tree:       RTree<NodeEntry>,
    positions:  Vec<Option<Position>>,
}

impl SpatialIndex {
    pub fn new(max_radius: f64) -> SpatialResult<Self> {
        if !(max_radius > 0.0) {
            return Err(SpatialError::InvalidRadius(max_radius));
        }
        Ok(Self { max_radius, tree: RTree::new(), positions: Vec::new() })
    }

    /// The bound on candidate distance.
    #[inline]
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.positions.get(node.index()).is_some_and(Option::is_some)
    }

    /// Replace the whole index with `nodes`.
    pub fn rebuild<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = (NodeId, Position)>,
    {
        self.positions.clear();
        let entries: Vec<NodeEntry> = nodes
            .into_iter()
            .map(|(id, pos)| {
                self.slot(id).replace(pos);
                NodeEntry { point: pos.to_array(), id }
            })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Add `node` at `pos`, or move it there if already present.
    pub fn insert(&mut self, node: NodeId, pos: Position) {
        if let Some(old) = self.slot(node).replace(pos) {
            self.tree.remove(&NodeEntry { point: old.to_array(), id: node });
        }
        self.tree.insert(NodeEntry { point: pos.to_array(), id: node });
    }

    /// Move an indexed node.
    pub fn update(&mut self, node: NodeId, pos: Position) -> SpatialResult<()> {
        if !self.contains(node) {
            return Err(SpatialError::NodeNotFound(node));
        }
        self.insert(node, pos);
        Ok(())
    }

    pub fn remove(&mut self, node: NodeId) -> SpatialResult<()> {
        let old = self
            .positions
            .get_mut(node.index())
            .and_then(Option::take)
            .ok_or(SpatialError::NodeNotFound(node))?;
        self.tree.remove(&NodeEntry { point: old.to_array(), id: node });
        Ok(())
    }

    /// Nodes within `radius` of `pos` (inclusive), clipped to `max_radius`.
    ///
    /// Order is unspecified; callers that need determinism sort the result.
    pub fn within_radius(&self, pos: Position, radius: f64) -> Vec<NodeId> {
        let r = radius.min(self.max_radius);
        self.tree
            .locate_within_distance(pos.to_array(), r * r)
            .map(|e| e.id)
            .collect()
    }

    /// Every node that could be connected to `node`, excluding `node` itself,
    /// in ascending `NodeId` order.
    pub fn candidates(&self, node: NodeId, pos: Position) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .within_radius(pos, self.max_radius)
            .into_iter()
            .filter(|&id| id != node)
            .collect();
        out.sort_unstable();
        out
    }

    /// The indexed node nearest to `pos`.
    pub fn nearest(&self, pos: Position) -> Option<NodeId> {
        self.tree.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }

    fn slot(&mut self, node: NodeId) -> &mut Option<Position> {
        if self.positions.len() <= node.index() {
            self.positions.resize(node.index() + 1, None);
        }
        &mut self.positions[node.index()]
    }
}
