// A* pathfinding over the navigation graph.
//
// Two layers:
// - `astar()`: node-to-node search. The open set is a `BinaryHeap` with
//   reversed ordering (min-heap) and lazy deletion; stale entries are skipped
//   when popped because their node is already closed. `g_score`, `came_from`
//   and `closed` are `Vec`s indexed by `NavNodeId`, live only for one call.
// - `find_path()`: position-to-position query. Snaps both ends to the
//   nearest walkable node, runs `astar()`, and returns world positions whose
//   last element is the caller's literal goal rather than the snapped node.
//
// Step cost from `current` to a neighbor is the Euclidean edge length
// scaled by `current.cost`. The heuristic is plain Euclidean distance to the
// goal node, admissible for any node cost >= 1. Ties on f-score pop the lower
// id first, matching the graph's iteration order.
//
// Not-found outcomes are values: `None` from `astar()`, an empty `Vec` from
// `find_path()`. Nothing here errors or panics on missing nodes.
//
// See also: `nav.rs` for the graph, `navigation.rs` for the service wrapper,
// `smoothing.rs` for post-processing the returned waypoints.

use crate::nav::NavGraph;
use crate::types::{NavNodeId, Vec3};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// The result of a successful A* search.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// Node ids from start to goal, inclusive.
    pub nodes: Vec<NavNodeId>,
    /// Accumulated step cost.
    pub total_cost: f32,
}

/// Entry in the open set.
struct OpenEntry {
    node: NavNodeId,
    f_score: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the smallest f-score (then smallest id) is "greatest".
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Lowest-cost route from `start` to `goal`.
///
/// Returns `None` when either id is unknown or the frontier empties before
/// the goal is reached. Non-walkable neighbors are never entered.
pub fn astar(graph: &NavGraph, start: NavNodeId, goal: NavNodeId) -> Option<PathResult> {
    let goal_pos = graph.node(goal)?.position;
    if graph.node(start).is_none() {
        return None;
    }
    if start == goal {
        return Some(PathResult {
            nodes: vec![start],
            total_cost: 0.0,
        });
    }

    let n = graph.id_capacity();
    let mut g_score = vec![f32::INFINITY; n];
    let mut came_from: Vec<Option<NavNodeId>> = vec![None; n];
    let mut closed = vec![false; n];

    g_score[start.index()] = 0.0;
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        node: start,
        f_score: heuristic(graph, start, goal_pos),
    });

    while let Some(OpenEntry { node: current, .. }) = open.pop() {
        let ci = current.index();
        if closed[ci] {
            continue;
        }
        closed[ci] = true;

        if current == goal {
            return Some(reconstruct(&came_from, start, goal, g_score[ci]));
        }

        let Some(node) = graph.node(current) else {
            continue;
        };
        let current_g = g_score[ci];

        for &neighbor_id in &node.neighbors {
            let ni = neighbor_id.index();
            if closed[ni] {
                continue;
            }
            let Some(neighbor) = graph.node(neighbor_id) else {
                continue;
            };
            if !neighbor.walkable {
                continue;
            }

            let step = node.position.distance(neighbor.position) * node.cost;
            let tentative_g = current_g + step;
            if tentative_g < g_score[ni] {
                g_score[ni] = tentative_g;
                came_from[ni] = Some(current);
                open.push(OpenEntry {
                    node: neighbor_id,
                    f_score: tentative_g + neighbor.position.distance(goal_pos),
                });
            }
        }
    }

    None
}

fn heuristic(graph: &NavGraph, from: NavNodeId, goal_pos: Vec3) -> f32 {
    graph
        .node(from)
        .map_or(f32::INFINITY, |n| n.position.distance(goal_pos))
}

fn reconstruct(
    came_from: &[Option<NavNodeId>],
    start: NavNodeId,
    goal: NavNodeId,
    total_cost: f32,
) -> PathResult {
    let mut nodes = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from[current.index()] {
            Some(prev) => {
                nodes.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    nodes.reverse();
    PathResult { nodes, total_cost }
}

/// Waypoints from `start_pos` to `goal_pos` through the graph.
///
/// - Either end failing to snap to a walkable node gives an empty path.
/// - Both ends snapping to the same node gives `[goal_pos]`.
/// - No route gives an empty path.
/// - Otherwise the node positions along the route, with the last replaced by
///   `goal_pos` so callers end exactly where they asked to go.
pub fn find_path(graph: &NavGraph, start_pos: Vec3, goal_pos: Vec3) -> Vec<Vec3> {
    let (Some(start), Some(goal)) = (
        graph.find_nearest_walkable(start_pos),
        graph.find_nearest_walkable(goal_pos),
    ) else {
        return Vec::new();
    };

    if start == goal {
        return vec![goal_pos];
    }

    let Some(result) = astar(graph, start, goal) else {
        tracing::trace!(%start, %goal, "no route between snapped nodes");
        return Vec::new();
    };

    let mut waypoints: Vec<Vec3> = result
        .nodes
        .iter()
        .filter_map(|&id| graph.node(id).map(|n| n.position))
        .collect();
    if let Some(last) = waypoints.last_mut() {
        *last = goal_pos;
    }
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (NavGraph, [NavNodeId; 3]) {
        let mut graph = NavGraph::new();
        let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0), true);
        let b = graph.add_node(Vec3::new(5.0, 0.0, 0.0), true);
        let c = graph.add_node(Vec3::new(10.0, 0.0, 0.0), true);
        graph.connect(a, b);
        graph.connect(b, c);
        (graph, [a, b, c])
    }

    /// `w` x `h` 8-connected grid with spacing 1, ids row-major by x.
    fn grid(w: u32, h: u32) -> NavGraph {
        let mut graph = NavGraph::new();
        for x in 0..w {
            for z in 0..h {
                graph.add_node(Vec3::new(x as f32, 0.0, z as f32), true);
            }
        }
        let id = |x: u32, z: u32| NavNodeId(x * h + z);
        for x in 0..w {
            for z in 0..h {
                for (dx, dz) in [(1i32, 0i32), (0, 1), (1, 1), (1, -1)] {
                    let (nx, nz) = (x as i32 + dx, z as i32 + dz);
                    if nx >= 0 && nz >= 0 && (nx as u32) < w && (nz as u32) < h {
                        graph.connect(id(x, z), id(nx as u32, nz as u32));
                    }
                }
            }
        }
        graph
    }

    #[test]
    fn astar_trivial_path() {
        let (graph, [a, _, _]) = chain();
        let result = astar(&graph, a, a).unwrap();
        assert_eq!(result.nodes, vec![a]);
        assert_eq!(result.total_cost, 0.0);
    }

    #[test]
    fn astar_simple_chain() {
        let (graph, [a, b, c]) = chain();
        let result = astar(&graph, a, c).unwrap();
        assert_eq!(result.nodes, vec![a, b, c]);
        assert_eq!(result.total_cost, 10.0);
    }

    #[test]
    fn astar_prefers_cheaper_detour() {
        let mut graph = NavGraph::new();
        let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0), true);
        // The direct hop leaves through an expensive node.
        let swamp = graph.add_node_with_cost(Vec3::new(1.0, 0.0, 0.0), true, 10.0);
        let b = graph.add_node(Vec3::new(2.0, 0.0, 0.0), true);
        let detour = graph.add_node(Vec3::new(1.0, 0.0, 1.0), true);
        graph.connect(a, swamp);
        graph.connect(swamp, b);
        graph.connect(a, detour);
        graph.connect(detour, b);

        let result = astar(&graph, a, b).unwrap();
        assert_eq!(result.nodes, vec![a, detour, b]);
    }

    #[test]
    fn astar_skips_unwalkable_nodes() {
        let mut graph = NavGraph::new();
        let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0), true);
        let blocked = graph.add_node(Vec3::new(1.0, 0.0, 0.0), false);
        let b = graph.add_node(Vec3::new(2.0, 0.0, 0.0), true);
        graph.connect(a, blocked);
        graph.connect(blocked, b);
        assert!(astar(&graph, a, b).is_none());
    }

    #[test]
    fn astar_unknown_ids_are_none() {
        let (graph, [a, _, _]) = chain();
        assert!(astar(&graph, a, NavNodeId(99)).is_none());
        assert!(astar(&graph, NavNodeId(99), a).is_none());
    }

    #[test]
    fn astar_survives_removed_nodes() {
        let (mut graph, [a, b, c]) = chain();
        graph.remove_node(b);
        assert!(astar(&graph, a, c).is_none());
    }

    #[test]
    fn grid_path_has_optimal_waypoint_count() {
        let graph = grid(6, 6);
        // (0,0) -> (5,3): five diagonal-or-straight hops, six waypoints.
        let path = find_path(&graph, Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 3.0));
        assert_eq!(path.len(), 6);
        // (0,0) -> (4,4): pure diagonal.
        let path = find_path(&graph, Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0));
        assert_eq!(path.len(), 5);
        for pair in path.windows(2) {
            assert!(pair[0].distance(pair[1]) < 1.5, "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn find_path_ends_at_requested_goal() {
        let (graph, _) = chain();
        let goal = Vec3::new(10.4, 0.3, -0.2);
        let path = find_path(&graph, Vec3::new(0.1, 0.0, 0.0), goal);
        assert_eq!(
            path,
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), goal]
        );
    }

    #[test]
    fn find_path_same_node_returns_literal_goal() {
        let (graph, _) = chain();
        let p = Vec3::new(0.3, 0.0, 0.2);
        assert_eq!(find_path(&graph, p, p), vec![p]);
        let q = Vec3::new(-0.4, 0.0, 0.0);
        assert_eq!(find_path(&graph, p, q), vec![q]);
    }

    #[test]
    fn find_path_to_isolated_node_is_empty() {
        let (mut graph, _) = chain();
        graph.add_node(Vec3::new(50.0, 0.0, 0.0), true);
        let path = find_path(&graph, Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0));
        assert!(path.is_empty());
    }

    #[test]
    fn find_path_on_empty_graph_is_empty() {
        let graph = NavGraph::new();
        assert!(find_path(&graph, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn astar_deterministic() {
        let graph = grid(5, 5);
        let r1 = astar(&graph, NavNodeId(0), NavNodeId(24)).unwrap();
        let r2 = astar(&graph, NavNodeId(0), NavNodeId(24)).unwrap();
        assert_eq!(r1, r2);
    }
}
