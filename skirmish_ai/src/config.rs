// Data-driven configuration for the navigation and decision core.
//
// Tunables live here rather than as magic numbers in the algorithms.
// `AiConfig` is loaded from JSON (`AiConfig::from_json()`) or built from
// `Default`, and groups:
// - `NavMeshConfig`: how the grid sampler and connector interpret
//   `stepSize` (node lift, wall clearance, link radius, probe start height,
//   sample cap).
// - `archetypes`: the `ArchetypeProfile` table keyed by `Archetype`.
//
// Every field has a serde default, so a partial document only overrides
// what it names: `{"navmesh": {"node_height_offset": 1.0}}` is a complete
// config.
//
// See also: `profile.rs` for `ArchetypeProfile` and its presets,
// `navmesh.rs` for the consumer of `NavMeshConfig`, `policy.rs` for the
// consumer of the profile table.

use crate::profile::{Archetype, ArchetypeProfile, ProfileError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Grid sampling and connection parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavMeshConfig {
    /// How far above the probed surface a node is placed.
    pub node_height_offset: f32,
    /// A node is unwalkable if a cardinal probe hits something closer than
    /// `wall_clearance_factor * step`.
    pub wall_clearance_factor: f32,
    /// Walkable nodes within `connection_radius_factor * step` of each other
    /// are link candidates. 1.5 admits grid diagonals (~1.414).
    pub connection_radius_factor: f32,
    /// Ground probes start this far above `bounds.max.y`.
    pub ground_probe_clearance: f32,
    /// Upper limit on grid samples per build.
    pub max_samples: usize,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            node_height_offset: 0.5,
            wall_clearance_factor: 0.5,
            connection_radius_factor: 1.5,
            ground_probe_clearance: 50.0,
            max_samples: 250_000,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub navmesh: NavMeshConfig,
    /// Archetypes missing from the table use their built-in preset.
    pub archetypes: BTreeMap<Archetype, ArchetypeProfile>,
}

impl Default for AiConfig {
    fn default() -> Self {
        let archetypes = Archetype::ALL
            .into_iter()
            .map(|a| (a, ArchetypeProfile::preset(a)))
            .collect();
        Self {
            navmesh: NavMeshConfig::default(),
            archetypes,
        }
    }
}

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON for this schema: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile for {archetype} is malformed: {source}")]
    Profile {
        archetype: Archetype,
        #[source]
        source: ProfileError,
    },
    #[error("navmesh setting `{0}` must be finite and positive")]
    NavMesh(&'static str),
}

impl AiConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AiConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nav = &self.navmesh;
        let positive = [
            ("node_height_offset", nav.node_height_offset),
            ("wall_clearance_factor", nav.wall_clearance_factor),
            ("connection_radius_factor", nav.connection_radius_factor),
            ("ground_probe_clearance", nav.ground_probe_clearance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NavMesh(name));
            }
        }
        if nav.max_samples == 0 {
            return Err(ConfigError::NavMesh("max_samples"));
        }
        for (&archetype, profile) in &self.archetypes {
            profile
                .validate()
                .map_err(|source| ConfigError::Profile { archetype, source })?;
        }
        Ok(())
    }

    /// Profile for `archetype`, falling back to its preset.
    pub fn profile(&self, archetype: Archetype) -> ArchetypeProfile {
        self.archetypes
            .get(&archetype)
            .cloned()
            .unwrap_or_else(|| ArchetypeProfile::preset(archetype))
    }
}
