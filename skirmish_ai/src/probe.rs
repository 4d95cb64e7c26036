// Visibility probe: the only view this crate has of world geometry.
//
// The host engine owns meshes, colliders and physics. All this crate needs is
// a ray query: "starting at `origin`, heading along `direction`, what is the
// first thing hit within `max_distance`?". That capability is the
// `VisibilityProbe` trait. The navmesh builder uses it to find ground height
// and wall clearance; the smoother and the builder's edge pass use it via
// `line_of_sight()`.
//
// `ObstacleSet` is a self-contained implementation over axis-aligned boxes
// plus an optional infinite ground plane, ray-tested with the slab method.
// Hosts with real geometry implement the trait themselves; `ObstacleSet`
// backs the tests, the `plan` CLI scenes and the benchmarks.
//
// See also: `navmesh.rs` (ground/wall probing, edge visibility),
// `smoothing.rs` (string pulling).
//
// Probes are read-only and must be `Sync`: the navmesh builder fans probe
// calls out across rayon worker threads.

use crate::types::Vec3;
use serde::{Deserialize, Serialize};

/// Slack used when deciding whether a hit lies strictly before a target.
/// Keeps a target sitting exactly on a surface from occluding itself.
const LOS_EPSILON: f32 = 1e-3;

/// Result of one ray query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeHit {
    pub hit: bool,
    /// Hit location. Meaningless when `hit` is false.
    pub point: Vec3,
    /// Distance from the origin to `point` along the ray.
    pub distance: f32,
}

impl ProbeHit {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
            distance: f32::INFINITY,
        }
    }
}

/// Ray-intersection capability supplied by the host.
pub trait VisibilityProbe: Sync {
    /// Cast a ray. `direction` need not be normalized. `max_distance` of
    /// `None` means unbounded. Hits beyond `max_distance` are misses.
    fn probe(&self, origin: Vec3, direction: Vec3, max_distance: Option<f32>) -> ProbeHit;
}

/// All-or-nothing line-of-sight test between two points: a single ray from
/// `from` toward `to`, limited to their separation. Anything hit strictly
/// before `to` blocks the line; there is no partial occlusion.
pub fn line_of_sight<P: VisibilityProbe + ?Sized>(probe: &P, from: Vec3, to: Vec3) -> bool {
    let delta = to - from;
    let dist = delta.length();
    if dist <= LOS_EPSILON {
        return true;
    }
    let hit = probe.probe(from, delta, Some(dist));
    !hit.hit || hit.distance >= dist - LOS_EPSILON
}

// ---------------------------------------------------------------------------
// Reference geometry: boxes + ground plane
// ---------------------------------------------------------------------------

/// An axis-aligned solid box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centred on `center` with full extents `size`.
    pub fn from_center(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Slab test. Returns the entry distance along a unit `dir`, or 0 when
    /// the origin is already inside.
    fn ray_entry(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let axes = [
            (origin.x, dir.x, self.min.x, self.max.x),
            (origin.y, dir.y, self.min.y, self.max.y),
            (origin.z, dir.z, self.min.z, self.max.z),
        ];
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        for (o, d, lo, hi) in axes {
            if d.abs() < f32::EPSILON {
                // Parallel to this slab: must already lie within it.
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        if t_exit < 0.0 {
            return None;
        }
        Some(t_enter.max(0.0))
    }
}

/// A static obstacle world: solid boxes and an optional horizontal ground
/// plane at `ground_height` (solid below, hit only by rays heading down).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ObstacleSet {
    pub boxes: Vec<Aabb>,
    #[serde(default)]
    pub ground_height: Option<f32>,
}

impl ObstacleSet {
    /// No obstacles and no ground: every probe misses.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ground(mut self, height: f32) -> Self {
        self.ground_height = Some(height);
        self
    }

    pub fn with_box(mut self, aabb: Aabb) -> Self {
        self.boxes.push(aabb);
        self
    }

    pub fn push(&mut self, aabb: Aabb) {
        self.boxes.push(aabb);
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.ground_height.is_none()
    }
}

impl VisibilityProbe for ObstacleSet {
    fn probe(&self, origin: Vec3, direction: Vec3, max_distance: Option<f32>) -> ProbeHit {
        let dir = direction.normalized_or(Vec3::ZERO);
        if dir == Vec3::ZERO {
            return ProbeHit::miss();
        }
        let limit = max_distance.unwrap_or(f32::INFINITY);

        let mut best: Option<f32> = None;
        for aabb in &self.boxes {
            if let Some(t) = aabb.ray_entry(origin, dir) {
                if t <= limit && best.is_none_or(|b| t < b) {
                    best = Some(t);
                }
            }
        }
        if let Some(ground) = self.ground_height {
            if dir.y < 0.0 && origin.y >= ground {
                let t = (ground - origin.y) / dir.y;
                if t <= limit && best.is_none_or(|b| t < b) {
                    best = Some(t);
                }
            }
        }

        match best {
            Some(t) => ProbeHit {
                hit: true,
                point: origin + dir * t,
                distance: t,
            },
            None => ProbeHit::miss(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Aabb {
        // A thin wall across the X axis at x in [4, 5].
        Aabb::new(Vec3::new(4.0, -1.0, -10.0), Vec3::new(5.0, 3.0, 10.0))
    }

    #[test]
    fn empty_set_never_hits() {
        let set = ObstacleSet::new();
        let hit = set.probe(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), None);
        assert!(!hit.hit);
        assert!(set.is_empty());
    }

    #[test]
    fn ray_hits_box_face() {
        let set = ObstacleSet::new().with_box(wall());
        let hit = set.probe(Vec3::new(0.0, 0.5, 0.0), Vec3::new(2.0, 0.0, 0.0), None);
        assert!(hit.hit);
        assert_eq!(hit.distance, 4.0);
        assert_eq!(hit.point, Vec3::new(4.0, 0.5, 0.0));
    }

    #[test]
    fn max_distance_limits_hits() {
        let set = ObstacleSet::new().with_box(wall());
        let hit = set.probe(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 0.0, 0.0), Some(3.0));
        assert!(!hit.hit);
    }

    #[test]
    fn ray_away_from_box_misses() {
        let set = ObstacleSet::new().with_box(wall());
        let hit = set.probe(Vec3::new(0.0, 0.5, 0.0), Vec3::new(-1.0, 0.0, 0.0), None);
        assert!(!hit.hit);
    }

    #[test]
    fn origin_inside_box_hits_at_zero() {
        let set = ObstacleSet::new().with_box(wall());
        let hit = set.probe(Vec3::new(4.5, 0.5, 0.0), Vec3::new(0.0, 0.0, 1.0), Some(1.0));
        assert!(hit.hit);
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn ground_plane_hit_from_above() {
        let set = ObstacleSet::new().with_ground(1.0);
        let hit = set.probe(Vec3::new(2.0, 11.0, 3.0), Vec3::DOWN, None);
        assert!(hit.hit);
        assert_eq!(hit.point, Vec3::new(2.0, 1.0, 3.0));
        assert_eq!(hit.distance, 10.0);
        // Horizontal rays skim over the plane.
        let flat = set.probe(Vec3::new(0.0, 1.5, 0.0), Vec3::new(1.0, 0.0, 0.0), None);
        assert!(!flat.hit);
    }

    #[test]
    fn line_of_sight_blocked_by_wall() {
        let set = ObstacleSet::new().with_box(wall());
        let a = Vec3::new(0.0, 0.5, 0.0);
        let b = Vec3::new(8.0, 0.5, 0.0);
        assert!(!line_of_sight(&set, a, b));
        assert!(line_of_sight(&set, a, Vec3::new(3.0, 0.5, 0.0)));
    }

    #[test]
    fn line_of_sight_to_surface_point_is_clear() {
        let set = ObstacleSet::new().with_box(wall());
        // Target lies exactly on the wall face.
        assert!(line_of_sight(
            &set,
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(4.0, 0.5, 0.0)
        ));
    }

    #[test]
    fn line_of_sight_to_self_is_clear() {
        let set = ObstacleSet::new().with_box(wall());
        let p = Vec3::new(4.5, 0.5, 0.0);
        assert!(line_of_sight(&set, p, p));
    }
}
