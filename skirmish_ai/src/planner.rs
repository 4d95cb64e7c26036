// One-agent, one-tick orchestration: decide, then route.
//
// The host calls `TickPlanner::plan()` once per agent per tick with that
// agent's snapshot. The planner asks the policy evaluator for an action and,
// when the action is a movement with a target, asks the navigation service
// for a smoothed route from the agent to that target. Nothing is remembered
// between calls; the planner only owns long-lived, read-mostly state (the
// profile table and the navigation graph).
//
// Level load and world changes go through `initialize()`, which rebuilds
// the graph. Plans made before initialization carry an empty path.

use crate::action::Action;
use crate::config::{AiConfig, ConfigError};
use crate::navigation::{NavigationError, NavigationService};
use crate::policy::PolicyEvaluator;
use crate::probe::VisibilityProbe;
use crate::profile::Archetype;
use crate::snapshot::WorldSnapshot;
use crate::types::{Bounds, Vec3};
use serde::Serialize;
use skirmish_prng::RandomSource;

/// What one agent should do this tick and how to get there.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plan {
    pub action: Action,
    /// Smoothed waypoints to `action.target`. Empty for non-movement
    /// actions, movement actions without a target, and unreachable targets.
    pub path: Vec<Vec3>,
}

#[derive(Debug)]
pub struct TickPlanner {
    policies: PolicyEvaluator,
    navigation: NavigationService,
}

impl TickPlanner {
    /// Validate `config` and set up an uninitialized planner.
    pub fn new(config: AiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let AiConfig {
            navmesh,
            archetypes,
        } = config;
        let policies = PolicyEvaluator::from_validated(archetypes);
        Ok(Self {
            policies,
            navigation: NavigationService::new(navmesh),
        })
    }

    pub fn initialize<P: VisibilityProbe + ?Sized>(
        &mut self,
        bounds: &Bounds,
        step: f32,
        probe: &P,
    ) -> Result<(), NavigationError> {
        self.navigation.initialize(bounds, step, probe)
    }

    pub fn navigation(&self) -> &NavigationService {
        &self.navigation
    }

    pub fn policies(&self) -> &PolicyEvaluator {
        &self.policies
    }

    pub fn plan<P: VisibilityProbe + ?Sized>(
        &self,
        archetype: Archetype,
        snap: &WorldSnapshot,
        probe: &P,
        rng: &mut impl RandomSource,
    ) -> Plan {
        let action = self.policies.decide(archetype, snap, rng);
        let path = match action.target {
            Some(target) if action.kind.requires_movement() => {
                self.navigation
                    .find_smoothed_path(snap.agent_position, target, probe)
            }
            _ => Vec::new(),
        };
        Plan { action, path }
    }
}
