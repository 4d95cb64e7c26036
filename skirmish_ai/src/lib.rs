// skirmish_ai: decision-making and navigation core for combat agents.
//
// This crate answers two per-tick questions for each non-player combatant:
// "what should I do?" (the policy evaluator) and "how do I get there?" (the
// navigation service). It never touches rendering, physics or animation.
// World geometry is reached only through the `VisibilityProbe` trait, and
// per-tick world state arrives as a read-only `WorldSnapshot`.
//
// Module overview:
// - `types.rs`:       Vec3, Bounds, NavNodeId.
// - `probe.rs`:       VisibilityProbe trait, line_of_sight(), AABB ObstacleSet.
// - `nav.rs`:         Arena-backed NavGraph with stable node ids.
// - `navmesh.rs`:     Grid sampling + line-of-sight connection (rayon fan-out).
// - `pathfinding.rs`: A* over the nav graph; position-to-position find_path().
// - `smoothing.rs`:   Line-of-sight string pulling of waypoint paths.
// - `navigation.rs`:  NavigationService: graph lifecycle + path queries.
// - `profile.rs`:     Archetype, ArchetypeProfile presets, SpecialAbility.
// - `snapshot.rs`:    WorldSnapshot, the per-tick input to decisions.
// - `action.rs`:      Action / ActionType, the per-tick output of decisions.
// - `tactics.rs`:     Pure situational helpers (cover, flanks, vantage points).
// - `policy.rs`:      PolicyEvaluator: first-match-wins table per archetype.
// - `planner.rs`:     TickPlanner: decide, then route, for one agent.
// - `config.rs`:      AiConfig + NavMeshConfig, loaded from JSON.
// - `prng`:           Re-exported from `skirmish_prng`: GameRng, RandomSource.
//
// **Critical constraint: determinism.** Identical inputs give identical
// graphs, paths and decisions. All randomness flows through an injected
// `RandomSource`; parallel navmesh work is collected in input order; ordered
// collections are `BTreeMap`.

pub mod action;
pub mod config;
pub mod nav;
pub mod navigation;
pub mod navmesh;
pub mod pathfinding;
pub mod planner;
pub mod policy;
pub mod probe;
pub use skirmish_prng as prng;
pub mod profile;
pub mod smoothing;
pub mod snapshot;
pub mod tactics;
pub mod types;
