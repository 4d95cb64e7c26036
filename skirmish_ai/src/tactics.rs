// Pure geometric and situational helpers for the archetype policies.
//
// Every function here is read-only over the `WorldSnapshot` (and, where a
// preferred range matters, the `ArchetypeProfile`). None of them hold state
// or draw randomness except `pick_flank_route()`, which takes the caller's
// `RandomSource` so route choice is reproducible.
//
// "Away from the opponent" is always the unit vector from the opponent to
// the agent. When the two positions coincide there is no such direction;
// +X is used instead so results stay finite.
//
// See also: `policy.rs` for the decision tables that call these.

use crate::profile::ArchetypeProfile;
use crate::snapshot::WorldSnapshot;
use crate::types::Vec3;
use skirmish_prng::RandomSource;

/// Opponent must be further than this for a flank to be worth it.
pub const FLANK_MIN_DISTANCE: f32 = 15.0;
/// Flank only while the opponent's position is fresh.
pub const FLANK_MAX_TIME_SINCE_SEEN: f32 = 5.0;
/// Opponent slower than this counts as stationary for grenade throws.
pub const GRENADE_MAX_TARGET_SPEED: f32 = 1.0;
pub const GRENADE_MIN_RANGE: f32 = 10.0;
pub const GRENADE_MAX_RANGE: f32 = 30.0;
/// A position with allies nearby is defensible beyond this range.
pub const DEFENSIBLE_MIN_RANGE: f32 = 15.0;
/// How close a sniper must be to its chosen vantage point to be "at" it.
pub const VANTAGE_TOLERANCE: f32 = 3.0;
/// An ally this close to the opponent counts as engaging it.
pub const ALLY_ENGAGEMENT_RADIUS: f32 = 30.0;

const FALLBACK_AWAY: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Unit direction from the opponent toward the agent.
fn away_from_opponent(snap: &WorldSnapshot) -> Vec3 {
    (snap.agent_position - snap.opponent_position).normalized_or(FALLBACK_AWAY)
}

/// Cover point closest to the agent. First listed wins ties.
pub fn nearest_cover(snap: &WorldSnapshot) -> Option<Vec3> {
    let mut best: Option<(Vec3, f32)> = None;
    for &cover in &snap.cover_points {
        let d = snap.agent_position.distance_squared(cover);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((cover, d));
        }
    }
    best.map(|(cover, _)| cover)
}

pub fn flank_feasible(snap: &WorldSnapshot) -> bool {
    !snap.flank_routes.is_empty()
        && snap.opponent_distance > FLANK_MIN_DISTANCE
        && snap.time_since_seen < FLANK_MAX_TIME_SINCE_SEEN
}

/// Uniformly chosen flank route, or `None` when there are none. Draws from
/// `rng` only when there is a choice to make.
pub fn pick_flank_route(snap: &WorldSnapshot, rng: &mut impl RandomSource) -> Option<Vec3> {
    match snap.flank_routes.len() {
        0 => None,
        1 => Some(snap.flank_routes[0]),
        n => Some(snap.flank_routes[rng.range_usize(0, n)]),
    }
}

/// Point `preferred_range.min` further away from the opponent.
pub fn retreat_position(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> Vec3 {
    snap.agent_position + away_from_opponent(snap) * profile.preferred_range.min
}

/// Nearest cover, else the point at mid-band distance from the opponent on
/// the agent's side.
pub fn tactical_position(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> Vec3 {
    nearest_cover(snap).unwrap_or_else(|| {
        snap.opponent_position + away_from_opponent(snap) * profile.preferred_range.midpoint()
    })
}

/// Visible, (nearly) stationary opponent at mid range.
pub fn grenade_opportunity(snap: &WorldSnapshot) -> bool {
    snap.has_line_of_sight
        && snap.opponent_speed < GRENADE_MAX_TARGET_SPEED
        && (GRENADE_MIN_RANGE..=GRENADE_MAX_RANGE).contains(&snap.opponent_distance)
}

pub fn is_defensible(snap: &WorldSnapshot) -> bool {
    snap.in_cover || (!snap.nearby_allies.is_empty() && snap.opponent_distance > DEFENSIBLE_MIN_RANGE)
}

/// Where a sniper wants to be: the cover point nearest the agent among
/// those at least `preferred_range.min` from the opponent, else a point
/// `preferred_range.max` out from the opponent toward the agent.
pub fn select_vantage_point(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> Vec3 {
    let min_range = profile.preferred_range.min;
    let mut best: Option<(Vec3, f32)> = None;
    for &cover in &snap.cover_points {
        if cover.distance(snap.opponent_position) < min_range {
            continue;
        }
        let d = snap.agent_position.distance_squared(cover);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((cover, d));
        }
    }
    match best {
        Some((cover, _)) => cover,
        None => snap.opponent_position + away_from_opponent(snap) * profile.preferred_range.max,
    }
}

pub fn is_at_vantage_point(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> bool {
    snap.agent_position.distance(select_vantage_point(snap, profile)) <= VANTAGE_TOLERANCE
}

pub fn in_preferred_range(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> bool {
    profile.preferred_range.contains(snap.opponent_distance)
}

/// Opponent is inside the preferred band's lower edge.
pub fn too_close(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> bool {
    snap.opponent_distance < profile.preferred_range.min
}

/// Some ally is within `ALLY_ENGAGEMENT_RADIUS` of the opponent.
pub fn allies_engaged(snap: &WorldSnapshot) -> bool {
    snap.nearby_allies
        .iter()
        .any(|ally| ally.distance(snap.opponent_position) <= ALLY_ENGAGEMENT_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_prng::ReplayRng;

    fn snap(agent: Vec3, opponent: Vec3) -> WorldSnapshot {
        WorldSnapshot {
            agent_position: agent,
            opponent_position: opponent,
            opponent_distance: agent.distance(opponent),
            health: 100.0,
            max_health: 100.0,
            ..WorldSnapshot::default()
        }
    }

    #[test]
    fn nearest_cover_prefers_first_on_ties() {
        let mut s = snap(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0));
        assert_eq!(nearest_cover(&s), None);
        s.cover_points = vec![
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        assert_eq!(nearest_cover(&s), Some(Vec3::new(0.0, 0.0, 2.0)));
        s.cover_points = vec![Vec3::new(0.0, 0.0, 3.0), Vec3::new(3.0, 0.0, 0.0)];
        assert_eq!(nearest_cover(&s), Some(Vec3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn flank_needs_routes_distance_and_fresh_sighting() {
        let mut s = snap(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0));
        assert!(!flank_feasible(&s));
        s.flank_routes = vec![Vec3::new(10.0, 0.0, 10.0)];
        assert!(flank_feasible(&s));
        s.time_since_seen = 5.0;
        assert!(!flank_feasible(&s));
        s.time_since_seen = 0.0;
        s.opponent_distance = 15.0;
        assert!(!flank_feasible(&s));
    }

    #[test]
    fn flank_route_choice_follows_rng() {
        let mut s = snap(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0));
        let a = Vec3::new(10.0, 0.0, 10.0);
        let b = Vec3::new(10.0, 0.0, -10.0);
        s.flank_routes = vec![a, b];
        assert_eq!(pick_flank_route(&s, &mut ReplayRng::constant(0.1)), Some(a));
        assert_eq!(pick_flank_route(&s, &mut ReplayRng::constant(0.9)), Some(b));

        // A single route never consumes a draw.
        s.flank_routes = vec![a];
        let mut rng = ReplayRng::constant(0.9);
        assert_eq!(pick_flank_route(&s, &mut rng), Some(a));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn retreat_moves_directly_away() {
        let s = snap(Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0));
        let profile = ArchetypeProfile::tactical();
        assert_eq!(retreat_position(&s, &profile), Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn retreat_with_coincident_positions_uses_fallback_axis() {
        let s = snap(Vec3::new(3.0, 0.0, 3.0), Vec3::new(3.0, 0.0, 3.0));
        let profile = ArchetypeProfile::tactical();
        let target = retreat_position(&s, &profile);
        assert!(target.is_finite());
        assert_eq!(target, Vec3::new(13.0, 0.0, 3.0));
    }

    #[test]
    fn tactical_position_falls_back_to_mid_band() {
        let mut s = snap(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 50.0));
        let profile = ArchetypeProfile::tactical();
        // Mid band is 20: 20 units from the opponent toward the agent.
        assert_eq!(tactical_position(&s, &profile), Vec3::new(0.0, 0.0, 30.0));
        s.cover_points = vec![Vec3::new(4.0, 0.0, 4.0)];
        assert_eq!(tactical_position(&s, &profile), Vec3::new(4.0, 0.0, 4.0));
    }

    #[test]
    fn grenade_needs_visible_slow_mid_range_target() {
        let mut s = snap(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0));
        assert!(!grenade_opportunity(&s));
        s.has_line_of_sight = true;
        assert!(grenade_opportunity(&s));
        s.opponent_speed = 3.0;
        assert!(!grenade_opportunity(&s));
        s.opponent_speed = 0.2;
        s.opponent_distance = 35.0;
        assert!(!grenade_opportunity(&s));
        s.opponent_distance = 10.0;
        assert!(grenade_opportunity(&s));
    }

    #[test]
    fn defensibility() {
        let mut s = snap(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0));
        assert!(!is_defensible(&s));
        s.nearby_allies = vec![Vec3::new(1.0, 0.0, 0.0)];
        assert!(is_defensible(&s));
        s.opponent_distance = 10.0;
        assert!(!is_defensible(&s));
        s.in_cover = true;
        assert!(is_defensible(&s));
    }

    #[test]
    fn vantage_point_skips_cover_near_opponent() {
        let mut s = snap(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 40.0));
        let profile = ArchetypeProfile::sniper();
        s.cover_points = vec![
            // Closest to the agent but only 20 from the opponent.
            Vec3::new(0.0, 0.0, 20.0),
            Vec3::new(0.0, 0.0, -5.0),
        ];
        assert_eq!(select_vantage_point(&s, &profile), Vec3::new(0.0, 0.0, -5.0));
        assert!(!is_at_vantage_point(&s, &profile));
        s.agent_position = Vec3::new(0.0, 0.0, -3.0);
        assert!(is_at_vantage_point(&s, &profile));
    }

    #[test]
    fn vantage_point_without_cover_is_far_along_axis() {
        let s = snap(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 40.0));
        let profile = ArchetypeProfile::sniper();
        assert_eq!(select_vantage_point(&s, &profile), Vec3::new(0.0, 0.0, -40.0));
    }

    #[test]
    fn allies_engaged_within_radius() {
        let mut s = snap(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0));
        s.nearby_allies = vec![Vec3::new(5.0, 0.0, 0.0)];
        assert!(!allies_engaged(&s));
        s.nearby_allies.push(Vec3::new(25.0, 0.0, 0.0));
        assert!(allies_engaged(&s));
    }

    #[test]
    fn range_checks() {
        let s = snap(Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0));
        let tactical = ArchetypeProfile::tactical();
        assert!(too_close(&s, &tactical));
        assert!(!in_preferred_range(&s, &tactical));
        assert!(in_preferred_range(&s, &ArchetypeProfile::rush()));
    }
}
