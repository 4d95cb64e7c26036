// Path smoothing by greedy line-of-sight shortcutting ("string pulling").
//
// Grid paths zig-zag along sample points. Starting from an anchor (first
// waypoint), scan backward from the end of the path for the furthest
// waypoint the anchor can see; keep it, move the anchor there, repeat until
// the anchor is the last waypoint. Adjacent waypoints are always kept even if
// the probe says they are occluded, so the anchor strictly advances and the
// loop terminates.
//
// Guarantees: output is never longer than input; the first and last input
// waypoints are always present; relative order is preserved.
//
// See also: `probe.rs` for `line_of_sight()`, `pathfinding.rs` for the raw
// waypoints this consumes.

use crate::probe::{VisibilityProbe, line_of_sight};
use crate::types::Vec3;

/// Reduce `path` to the waypoints needed to stay in line of sight.
/// Paths of two or fewer waypoints come back unchanged.
pub fn smooth_path<P: VisibilityProbe + ?Sized>(path: &[Vec3], probe: &P) -> Vec<Vec3> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let last = path.len() - 1;
    let mut out = vec![path[0]];
    let mut anchor = 0;
    while anchor < last {
        let mut next = last;
        while next > anchor + 1 && !line_of_sight(probe, path[anchor], path[next]) {
            next -= 1;
        }
        out.push(path[next]);
        anchor = next;
    }

    tracing::trace!(before = path.len(), after = out.len(), "smoothed path");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Aabb, ObstacleSet};

    fn p(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.5, z)
    }

    #[test]
    fn short_paths_are_untouched() {
        let probe = ObstacleSet::new();
        assert!(smooth_path(&[], &probe).is_empty());
        assert_eq!(smooth_path(&[p(0.0, 0.0)], &probe), vec![p(0.0, 0.0)]);
        let two = [p(0.0, 0.0), p(5.0, 5.0)];
        assert_eq!(smooth_path(&two, &probe), two.to_vec());
    }

    #[test]
    fn open_space_collapses_to_endpoints() {
        let probe = ObstacleSet::new();
        let raw = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 1.0), p(3.0, 1.0), p(4.0, 2.0)];
        assert_eq!(smooth_path(&raw, &probe), vec![p(0.0, 0.0), p(4.0, 2.0)]);
    }

    #[test]
    fn corner_around_wall_is_kept() {
        // Wall occupying x in [1, 3], z in [-1, 3]: the path hugs around it.
        let probe = ObstacleSet::new()
            .with_box(Aabb::new(Vec3::new(1.0, 0.0, -1.0), Vec3::new(3.0, 2.0, 3.0)));
        let raw = [
            p(0.0, 0.0),
            p(0.0, 2.0),
            p(0.0, 4.0),
            p(2.0, 4.0),
            p(4.0, 4.0),
            p(4.0, 2.0),
            p(4.0, 0.0),
        ];
        let smoothed = smooth_path(&raw, &probe);
        assert_eq!(smoothed.first(), raw.first());
        assert_eq!(smoothed.last(), raw.last());
        assert!(smoothed.len() < raw.len());
        for pair in smoothed.windows(2) {
            assert!(line_of_sight(&probe, pair[0], pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn fully_blocked_path_keeps_every_waypoint() {
        // A probe that reports everything occluded.
        struct Opaque;
        impl VisibilityProbe for Opaque {
            fn probe(&self, origin: Vec3, _: Vec3, _: Option<f32>) -> crate::probe::ProbeHit {
                crate::probe::ProbeHit {
                    hit: true,
                    point: origin,
                    distance: 0.0,
                }
            }
        }
        let raw = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        assert_eq!(smooth_path(&raw, &Opaque), raw.to_vec());
    }
}
