// Navigation graph for agent pathfinding.
//
// The nav graph is a set of `NavNode`s (sampled standable positions) with
// undirected neighbor links. It is populated by `navmesh::build_nav_graph()`
// and searched by `pathfinding.rs`.
//
// Storage is an arena: `Vec<Option<NavNode>>` indexed by `NavNodeId`. Ids
// are assigned sequentially and never reused while the graph lives, so a
// removed node leaves a `None` slot behind rather than shifting its
// successors. Neighbor lists are `SmallVec`s sized for an 8-connected grid,
// so a typical node keeps its links inline. No `HashMap`; iteration is in
// ascending id order, which is the graph's one deterministic order and the
// tie-break order for `find_nearest_walkable()`.
//
// See also: `navmesh.rs` for grid sampling and connection,
// `pathfinding.rs` for A*, `navigation.rs` which owns the graph on behalf of
// callers.
//
// Invariants:
// - `connect()` is symmetric and idempotent: a pair is linked at most once
//   in each direction.
// - `remove_node()` strips the removed id from every remaining neighbor
//   list. No dangling ids survive.

use crate::types::{NavNodeId, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline capacity of a neighbor list: eight grid directions.
pub type NeighborList = SmallVec<[NavNodeId; 8]>;

/// A node in the navigation graph: a position an agent can stand on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    pub id: NavNodeId,
    pub position: Vec3,
    pub neighbors: NeighborList,
    /// Traversal weight applied to edges leaving this node. 1.0 is plain
    /// geometric length.
    pub cost: f32,
    pub walkable: bool,
}

impl NavNode {
    pub fn new(id: NavNodeId, position: Vec3, walkable: bool) -> Self {
        Self {
            id,
            position,
            neighbors: NeighborList::new(),
            cost: 1.0,
            walkable,
        }
    }

    pub fn is_isolated(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// The navigation graph container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NavGraph {
    slots: Vec<Option<NavNode>>,
    live: usize,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with the default traversal cost. Returns its id.
    pub fn add_node(&mut self, position: Vec3, walkable: bool) -> NavNodeId {
        self.add_node_with_cost(position, walkable, 1.0)
    }

    pub fn add_node_with_cost(&mut self, position: Vec3, walkable: bool, cost: f32) -> NavNodeId {
        let id = NavNodeId(self.slots.len() as u32);
        let mut node = NavNode::new(id, position, walkable);
        node.cost = cost;
        self.slots.push(Some(node));
        self.live += 1;
        id
    }

    /// Adopt a pre-built node (e.g. from `navmesh::sample_grid()`), keeping
    /// its position, cost and walkability but assigning a fresh id. Any
    /// neighbor ids it carried are discarded.
    pub fn insert_node(&mut self, mut node: NavNode) -> NavNodeId {
        let id = NavNodeId(self.slots.len() as u32);
        node.id = id;
        node.neighbors.clear();
        self.slots.push(Some(node));
        self.live += 1;
        id
    }

    /// Remove a node and every link that points at it. Returns the removed
    /// node (with its neighbor list as it was), or `None` if the id is
    /// unknown.
    pub fn remove_node(&mut self, id: NavNodeId) -> Option<NavNode> {
        let removed = self.slots.get_mut(id.index())?.take()?;
        self.live -= 1;
        for &n in &removed.neighbors {
            if let Some(Some(other)) = self.slots.get_mut(n.index()) {
                other.neighbors.retain(|x| *x != id);
            }
        }
        Some(removed)
    }

    /// Link `a` and `b` in both directions. Idempotent. Returns `true` only
    /// when a new link was created; self-links and unknown ids are ignored.
    pub fn connect(&mut self, a: NavNodeId, b: NavNodeId) -> bool {
        if a == b || self.node(a).is_none() || self.node(b).is_none() {
            return false;
        }
        let mut created = false;
        if let Some(Some(node)) = self.slots.get_mut(a.index()) {
            if !node.neighbors.contains(&b) {
                node.neighbors.push(b);
                created = true;
            }
        }
        if let Some(Some(node)) = self.slots.get_mut(b.index()) {
            if !node.neighbors.contains(&a) {
                node.neighbors.push(a);
                created = true;
            }
        }
        created
    }

    pub fn node(&self, id: NavNodeId) -> Option<&NavNode> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Neighbor ids of `id`, empty for unknown ids.
    pub fn neighbors(&self, id: NavNodeId) -> &[NavNodeId] {
        self.node(id).map(|n| n.neighbors.as_slice()).unwrap_or(&[])
    }

    /// Live nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &NavNode> + '_ {
        self.slots.iter().flatten()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Upper bound (exclusive) on ids handed out so far. Per-node search
    /// scratch is sized by this, not by `node_count()`.
    pub fn id_capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of undirected links.
    pub fn edge_count(&self) -> usize {
        self.nodes().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Nearest walkable node to `point` by Euclidean distance. Linear scan;
    /// on exact ties the first node in id order wins. `None` when no
    /// walkable node exists.
    pub fn find_nearest_walkable(&self, point: Vec3) -> Option<NavNodeId> {
        let mut best: Option<(NavNodeId, f32)> = None;
        for node in self.nodes().filter(|n| n.walkable) {
            let d = node.position.distance_squared(point);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((node.id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Drop every node. Ids restart from zero.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }
}
