// Archetype profiles: data-driven per-class combat configuration.
//
// Every combat agent belongs to one `Archetype`. The decision logic for an
// archetype is code (see `policy.rs`), but the tunable numbers it consults
// (preferred engagement band, which utilities the class may use, special
// abilities) are data in `ArchetypeProfile`, keyed by `Archetype` in
// `AiConfig::archetypes`. Named presets (`ArchetypeProfile::rush()`,
// `::sniper()`, ...) give the defaults.
//
// Profiles come from outside the core (config JSON or host code) and are
// read-only here. `validate()` is the one place malformed data is caught;
// `PolicyEvaluator::new()` and `AiConfig::validate()` both call it.
//
// See also: `config.rs` for the profile table, `tactics.rs` for the helpers
// that read the preferred range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A category of combat agent with its own decision policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Rush,
    Tactical,
    Defensive,
    Sniper,
    Berserker,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Rush,
        Archetype::Tactical,
        Archetype::Defensive,
        Archetype::Sniper,
        Archetype::Berserker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Rush => "rush",
            Archetype::Tactical => "tactical",
            Archetype::Defensive => "defensive",
            Archetype::Sniper => "sniper",
            Archetype::Berserker => "berserker",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name does not match any archetype.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown archetype `{0}`")]
pub struct UnknownArchetype(pub String);

impl FromStr for Archetype {
    type Err = UnknownArchetype;

    /// Case-insensitive match on `name()`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownArchetype(s.to_owned()))
    }
}

/// Class abilities an agent can trigger with `ActionType::UseAbility`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialAbility {
    SpeedBoost,
    DamageBoost,
    Shield,
    Heal,
    Cloak,
}

impl SpecialAbility {
    /// Abilities that make a berserker hit harder or close faster.
    pub fn is_combat_boost(self) -> bool {
        matches!(self, SpecialAbility::SpeedBoost | SpecialAbility::DamageBoost)
    }
}

/// Preferred engagement distance band, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeBand {
    pub min: f32,
    pub max: f32,
}

impl RangeBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.min && distance <= self.max
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }
}

/// Malformed archetype configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProfileError {
    #[error("preferred range bounds must be finite and non-negative, got {min}..{max}")]
    InvalidRange { min: f32, max: f32 },
    #[error("preferred range is inverted: min {min} > max {max}")]
    InvertedRange { min: f32, max: f32 },
    #[error("special ability {0:?} listed more than once")]
    DuplicateAbility(SpecialAbility),
}

/// Per-archetype tunables consulted by the decision policies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeProfile {
    pub preferred_range: RangeBand,
    pub throws_grenades: bool,
    pub throws_flashbangs: bool,
    pub calls_backup: bool,
    pub can_flank: bool,
    #[serde(default)]
    pub special_abilities: Vec<SpecialAbility>,
}

impl ArchetypeProfile {
    /// Close-quarters chargers: no utilities, no abilities.
    pub fn rush() -> Self {
        Self {
            preferred_range: RangeBand::new(0.0, 15.0),
            throws_grenades: false,
            throws_flashbangs: false,
            calls_backup: false,
            can_flank: false,
            special_abilities: Vec::new(),
        }
    }

    /// Cover-to-cover riflemen that flank, call for help and use grenades.
    pub fn tactical() -> Self {
        Self {
            preferred_range: RangeBand::new(10.0, 30.0),
            throws_grenades: true,
            throws_flashbangs: true,
            calls_backup: true,
            can_flank: true,
            special_abilities: Vec::new(),
        }
    }

    /// Area holders with a shield and a long preferred band.
    pub fn defensive() -> Self {
        Self {
            preferred_range: RangeBand::new(15.0, 40.0),
            throws_grenades: false,
            throws_flashbangs: false,
            calls_backup: true,
            can_flank: false,
            special_abilities: vec![SpecialAbility::Shield],
        }
    }

    /// Long-range marksmen that keep their distance.
    pub fn sniper() -> Self {
        Self {
            preferred_range: RangeBand::new(30.0, 80.0),
            throws_grenades: false,
            throws_flashbangs: false,
            calls_backup: false,
            can_flank: false,
            special_abilities: vec![SpecialAbility::Cloak],
        }
    }

    /// Melee-range bruisers with a grenade and a combat boost.
    pub fn berserker() -> Self {
        Self {
            preferred_range: RangeBand::new(0.0, 10.0),
            throws_grenades: true,
            throws_flashbangs: false,
            calls_backup: false,
            can_flank: false,
            special_abilities: vec![SpecialAbility::DamageBoost, SpecialAbility::SpeedBoost],
        }
    }

    /// The built-in preset for `archetype`.
    pub fn preset(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Rush => Self::rush(),
            Archetype::Tactical => Self::tactical(),
            Archetype::Defensive => Self::defensive(),
            Archetype::Sniper => Self::sniper(),
            Archetype::Berserker => Self::berserker(),
        }
    }

    /// First listed ability that boosts speed or damage.
    pub fn combat_boost(&self) -> Option<SpecialAbility> {
        self.special_abilities
            .iter()
            .copied()
            .find(|a| a.is_combat_boost())
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let RangeBand { min, max } = self.preferred_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(ProfileError::InvalidRange { min, max });
        }
        if min > max {
            return Err(ProfileError::InvertedRange { min, max });
        }
        for (i, ability) in self.special_abilities.iter().enumerate() {
            if self.special_abilities[..i].contains(ability) {
                return Err(ProfileError::DuplicateAbility(*ability));
            }
        }
        Ok(())
    }
}
