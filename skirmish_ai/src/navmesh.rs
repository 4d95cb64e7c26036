// NavMesh construction: sample a level on a regular grid and connect it.
//
// `build_nav_graph()` is the load-time (or explicit world-change) entry
// point. It runs in two passes:
//
// 1. **Sampling** (`sample_grid()`): walk a regular X/Z grid over `bounds`
//    at `step` increments, X outer and Z inner, both ends inclusive. At each
//    sample, probe straight down from above the bounds to find the ground.
//    A hit gives the surface height; a miss falls back to `bounds.min.y`.
//    The node sits `node_height_offset` above that surface. It is walkable
//    unless one of the four cardinal probes (±X, ±Z) finds an obstruction
//    closer than `wall_clearance_factor * step`, i.e. too close to a wall.
// 2. **Connection** (`connect_walkable()`): every pair of walkable nodes no
//    more than `connection_radius_factor * step` apart is linked if a single
//    `line_of_sight()` ray between them is clear.
//
// Both passes fan probe calls out over rayon. Results are collected in
// input order and links are applied in ascending `(i, j)` order, so node ids
// and connectivity are identical from run to run for identical inputs.
// Connection is quadratic in the walkable node count; it is not meant to run
// per frame.
//
// Nodes with no neighbors are legitimate output (a ledge, a closet); A*
// simply never reaches them.
//
// See also: `nav.rs` for the graph being built, `probe.rs` for the ray
// queries, `config.rs` for `NavMeshConfig`.

use crate::config::NavMeshConfig;
use crate::nav::{NavGraph, NavNode};
use crate::probe::{VisibilityProbe, line_of_sight};
use crate::types::{Bounds, NavNodeId, Vec3};
use rayon::prelude::*;
use thiserror::Error;

/// Cardinal probe directions on the walking plane.
const CARDINALS: [Vec3; 4] = [
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(-1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, -1.0),
];

/// Slack so that `max` is sampled when `(max - min)` is an exact multiple of
/// `step` up to float error.
const GRID_EPSILON: f32 = 1e-4;

/// Reasons a navmesh cannot be built. All are caller mistakes.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum NavMeshError {
    #[error("grid step must be finite and positive, got {0}")]
    InvalidStep(f32),
    #[error("bounds are inverted or not finite: {min} .. {max}")]
    InvalidBounds { min: Vec3, max: Vec3 },
    #[error("grid would sample {samples} points, limit is {limit}")]
    TooManySamples { samples: usize, limit: usize },
}

/// Number of grid coordinates along one axis: `min, min + step, ...` up to
/// `max`. `None` when the count does not fit a node id.
fn axis_count(min: f32, max: f32, step: f32) -> Option<usize> {
    let intervals = ((f64::from(max) - f64::from(min)) / f64::from(step)
        + f64::from(GRID_EPSILON))
    .floor();
    if !intervals.is_finite() || intervals >= f64::from(u32::MAX) {
        return None;
    }
    usize::try_from(intervals as u64).ok()?.checked_add(1)
}

fn validate(bounds: &Bounds, step: f32) -> Result<(), NavMeshError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(NavMeshError::InvalidStep(step));
    }
    if !bounds.is_valid() {
        return Err(NavMeshError::InvalidBounds {
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(())
}

/// Sample the grid and classify each point. Returns unconnected nodes with
/// ids `0..n` in grid order.
pub fn sample_grid<P: VisibilityProbe + ?Sized>(
    bounds: &Bounds,
    step: f32,
    probe: &P,
    config: &NavMeshConfig,
) -> Result<Vec<NavNode>, NavMeshError> {
    validate(bounds, step)?;

    // Checked before anything is allocated. An axis too long to count
    // reports a saturated sample count.
    let counts = axis_count(bounds.min.x, bounds.max.x, step)
        .zip(axis_count(bounds.min.z, bounds.max.z, step));
    let samples = counts.map_or(usize::MAX, |(nx, nz)| nx.saturating_mul(nz));
    let (nx, nz) = match counts {
        Some(counts) if samples <= config.max_samples => counts,
        _ => {
            return Err(NavMeshError::TooManySamples {
                samples,
                limit: config.max_samples,
            });
        }
    };

    let points: Vec<(f32, f32)> = (0..nx)
        .flat_map(|xi| {
            let x = bounds.min.x + xi as f32 * step;
            (0..nz).map(move |zi| (x, bounds.min.z + zi as f32 * step))
        })
        .collect();

    let clearance = config.wall_clearance_factor * step;
    let probe_y = bounds.max.y + config.ground_probe_clearance;

    let nodes = points
        .par_iter()
        .enumerate()
        .map(|(i, &(x, z))| {
            let surface = probe.probe(Vec3::new(x, probe_y, z), Vec3::DOWN, None);
            let ground_y = if surface.hit {
                surface.point.y
            } else {
                bounds.min.y
            };
            let position = Vec3::new(x, ground_y + config.node_height_offset, z);
            let walkable = has_wall_clearance(probe, position, clearance);
            NavNode::new(NavNodeId(i as u32), position, walkable)
        })
        .collect();

    Ok(nodes)
}

/// True when no cardinal probe finds anything closer than `clearance`.
fn has_wall_clearance<P: VisibilityProbe + ?Sized>(probe: &P, at: Vec3, clearance: f32) -> bool {
    CARDINALS.iter().all(|&dir| {
        let hit = probe.probe(at, dir, Some(clearance));
        !(hit.hit && hit.distance < clearance)
    })
}

/// Link every visible pair of nearby walkable nodes. Returns the number of
/// links created.
pub fn connect_walkable<P: VisibilityProbe + ?Sized>(
    graph: &mut NavGraph,
    step: f32,
    probe: &P,
    config: &NavMeshConfig,
) -> usize {
    let radius = config.connection_radius_factor * step;
    let radius_sq = radius * radius;

    let walkable: Vec<(NavNodeId, Vec3)> = graph
        .nodes()
        .filter(|n| n.walkable)
        .map(|n| (n.id, n.position))
        .collect();

    let candidates: Vec<Vec<(NavNodeId, NavNodeId)>> = (0..walkable.len())
        .into_par_iter()
        .map(|i| {
            let (a, pa) = walkable[i];
            walkable[i + 1..]
                .iter()
                .filter(|(_, pb)| pa.distance_squared(*pb) <= radius_sq)
                .filter(|(_, pb)| line_of_sight(probe, pa, *pb))
                .map(|&(b, _)| (a, b))
                .collect()
        })
        .collect();

    let mut created = 0;
    for (a, b) in candidates.into_iter().flatten() {
        if graph.connect(a, b) {
            created += 1;
        }
    }
    created
}

/// Build a fully connected navigation graph for `bounds`.
pub fn build_nav_graph<P: VisibilityProbe + ?Sized>(
    bounds: &Bounds,
    step: f32,
    probe: &P,
    config: &NavMeshConfig,
) -> Result<NavGraph, NavMeshError> {
    let nodes = sample_grid(bounds, step, probe, config)?;
    let mut graph = NavGraph::new();
    for node in nodes {
        graph.insert_node(node);
    }
    let edges = connect_walkable(&mut graph, step, probe, config);

    tracing::debug!(
        samples = graph.node_count(),
        walkable = graph.nodes().filter(|n| n.walkable).count(),
        edges,
        step,
        "built nav graph"
    );
    Ok(graph)
}
