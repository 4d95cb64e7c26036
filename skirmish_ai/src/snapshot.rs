// Per-tick, read-only view of the world as seen by one agent.
//
// The host builds a `WorldSnapshot` for each agent every tick and discards it
// afterwards. Policies take it by shared reference and never mutate it, so a
// decision is a pure function of (archetype, snapshot, random draws).
//
// Distances are world units, times are seconds.

use crate::types::Vec3;
use serde::{Deserialize, Serialize};

/// Current weapon state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    pub weapon: String,
    pub ammo: u32,
    pub is_reloading: bool,
    /// Seconds since the agent last fired.
    pub time_since_shot: f32,
}

/// Everything a policy may look at for one decision.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    pub agent_position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub in_cover: bool,
    /// The agent can see its opponent (and, symmetrically, be seen).
    pub has_line_of_sight: bool,

    pub opponent_position: Vec3,
    pub opponent_distance: f32,
    /// Opponent ground speed; near zero means it is standing still.
    pub opponent_speed: f32,
    pub last_seen_opponent_position: Option<Vec3>,
    /// Seconds since the opponent was last seen.
    pub time_since_seen: f32,

    pub weapon: WeaponState,

    pub nearby_allies: Vec<Vec3>,
    pub nearby_opponents: Vec<Vec3>,
    pub cover_points: Vec<Vec3>,
    pub flank_routes: Vec<Vec3>,

    /// Length of the current tick.
    pub delta_time: f32,
    /// Host clock at snapshot time.
    pub timestamp: f64,
}

impl WorldSnapshot {
    /// `health / max_health`, or 0 when `max_health` is not positive.
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}
