// Test-only arena for end-to-end scenario tests.
//
// Wraps a real `TickPlanner` and a real `ObstacleSet` behind a small,
// test-friendly API: build a level, describe agents as (archetype,
// snapshot) pairs, run ticks, inspect plans. The only test-specific code is
// the snapshot builder and the per-agent RNG bookkeeping; navigation,
// decisions and smoothing go through the same code paths a host would use.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use rayon::prelude::*;
use skirmish_ai::config::AiConfig;
use skirmish_ai::planner::{Plan, TickPlanner};
use skirmish_ai::prng::GameRng;
use skirmish_ai::probe::ObstacleSet;
use skirmish_ai::profile::Archetype;
use skirmish_ai::snapshot::WorldSnapshot;
use skirmish_ai::types::{Bounds, Vec3};

/// A built level plus one decision RNG per agent slot.
pub struct TestArena {
    pub planner: TickPlanner,
    pub obstacles: ObstacleSet,
    rngs: Vec<GameRng>,
    seed: u64,
}

impl TestArena {
    /// Square, obstacle-free level from (0,0,0) to (size,0,size).
    pub fn open(size: f32, step: f32, seed: u64) -> Self {
        let bounds = Bounds::new(Vec3::ZERO, Vec3::new(size, 0.0, size));
        Self::build(AiConfig::default(), &bounds, step, ObstacleSet::new(), seed)
    }

    pub fn build(
        config: AiConfig,
        bounds: &Bounds,
        step: f32,
        obstacles: ObstacleSet,
        seed: u64,
    ) -> Self {
        let mut planner = TickPlanner::new(config).expect("TestArena: invalid config");
        planner
            .initialize(bounds, step, &obstacles)
            .expect("TestArena: navmesh build failed");
        Self {
            planner,
            obstacles,
            rngs: Vec::new(),
            seed,
        }
    }

    /// One tick for every agent, in order. Agent `i` always draws from its
    /// own RNG, seeded from the arena seed and `i`.
    pub fn tick(&mut self, agents: &[(Archetype, WorldSnapshot)]) -> Vec<Plan> {
        self.ensure_rngs(agents.len());
        agents
            .iter()
            .zip(self.rngs.iter_mut())
            .map(|((archetype, snap), rng)| {
                self.planner.plan(*archetype, snap, &self.obstacles, rng)
            })
            .collect()
    }

    /// Same as `tick()`, but plans every agent on the rayon pool against the
    /// shared planner.
    pub fn par_tick(&mut self, agents: &[(Archetype, WorldSnapshot)]) -> Vec<Plan> {
        self.ensure_rngs(agents.len());
        let planner = &self.planner;
        let obstacles = &self.obstacles;
        agents
            .par_iter()
            .zip(self.rngs.par_iter_mut())
            .map(|((archetype, snap), rng)| planner.plan(*archetype, snap, obstacles, rng))
            .collect()
    }

    fn ensure_rngs(&mut self, count: usize) {
        while self.rngs.len() < count {
            let i = self.rngs.len() as u64;
            self.rngs.push(GameRng::new(self.seed.wrapping_add(i)));
        }
    }
}

/// Healthy agent at `agent` facing an opponent at `opponent`, nothing else
/// known. Tests tweak the returned snapshot per scenario.
pub fn snapshot(agent: Vec3, opponent: Vec3) -> WorldSnapshot {
    WorldSnapshot {
        agent_position: agent,
        health: 100.0,
        max_health: 100.0,
        opponent_position: opponent,
        opponent_distance: agent.distance(opponent),
        delta_time: 1.0 / 30.0,
        ..WorldSnapshot::default()
    }
}
