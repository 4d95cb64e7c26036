// Per-archetype decision policies.
//
// `PolicyEvaluator::decide()` maps (archetype, snapshot, random source) to a
// single `Action`. Dispatch is an exhaustive `match` on `Archetype`, so a new
// archetype does not compile until it has a policy. Each policy is a strict
// first-match-wins list: conditions are tested top to bottom and the first
// one that holds produces the action. Reordering branches changes behavior.
//
// Policies are stateless. Anything that must persist across ticks (movement
// state, cooldowns) belongs to the host's agent controller.
//
// Randomness comes only from the `RandomSource` passed in, and is drawn only
// on branches that need it:
// - Tactical: one backup coin-flip when low on health and backup-capable.
// - Sniper: one detection roll per tick while the opponent has line of sight.
// - Tactical flank: one route pick when more than one route exists.
// A scripted source therefore pins every random branch.
//
// See also: `tactics.rs` for the situational helpers, `profile.rs` for the
// per-archetype tunables, `action.rs` for the output type.

use crate::action::{Action, ActionType};
use crate::profile::{Archetype, ArchetypeProfile, ProfileError};
use crate::snapshot::WorldSnapshot;
use crate::tactics;
use skirmish_prng::RandomSource;
use std::collections::BTreeMap;

const RUSH_LOW_HEALTH: f32 = 0.3;
const RUSH_SHOOT_RANGE: f32 = 40.0;
const RUSH_CLOSE_RANGE: f32 = 15.0;

const TACTICAL_LOW_HEALTH: f32 = 0.4;
const BACKUP_CHANCE: f32 = 0.5;

const DEFENSIVE_LOW_HEALTH: f32 = 0.5;
const SUPPRESS_RANGE: f32 = 20.0;
const SUPPRESS_SECS: f32 = 2.0;
const SURROUNDED_OPPONENTS: usize = 2;

const SNIPER_DETECTION_CHANCE: f32 = 0.15;
const AIM_SECS: f32 = 1.5;
const SNIPER_WAIT_SECS: f32 = 1.0;

const BERSERKER_LOW_HEALTH: f32 = 0.3;
const BERSERKER_GRENADE_RANGE: f32 = 10.0;

/// Owns the validated profile table and evaluates policies against it.
#[derive(Clone, Debug)]
pub struct PolicyEvaluator {
    profiles: BTreeMap<Archetype, ArchetypeProfile>,
}

impl Default for PolicyEvaluator {
    fn default() -> Self {
        Self::from_validated(BTreeMap::new())
    }
}

impl PolicyEvaluator {
    /// Validate `profiles` and fill in presets for any missing archetype.
    pub fn new(profiles: BTreeMap<Archetype, ArchetypeProfile>) -> Result<Self, ProfileError> {
        for profile in profiles.values() {
            profile.validate()?;
        }
        Ok(Self::from_validated(profiles))
    }

    /// For tables that already passed `AiConfig::validate()`.
    pub(crate) fn from_validated(mut profiles: BTreeMap<Archetype, ArchetypeProfile>) -> Self {
        for archetype in Archetype::ALL {
            profiles
                .entry(archetype)
                .or_insert_with(|| ArchetypeProfile::preset(archetype));
        }
        Self { profiles }
    }

    /// The profile in effect for `archetype`.
    pub fn profile(&self, archetype: Archetype) -> ArchetypeProfile {
        self.profiles
            .get(&archetype)
            .cloned()
            .unwrap_or_else(|| ArchetypeProfile::preset(archetype))
    }

    pub fn decide(
        &self,
        archetype: Archetype,
        snap: &WorldSnapshot,
        rng: &mut impl RandomSource,
    ) -> Action {
        let profile = self.profile(archetype);
        let action = match archetype {
            Archetype::Rush => decide_rush(snap),
            Archetype::Tactical => decide_tactical(snap, &profile, rng),
            Archetype::Defensive => decide_defensive(snap, &profile),
            Archetype::Sniper => decide_sniper(snap, &profile, rng),
            Archetype::Berserker => decide_berserker(snap, &profile),
        };
        tracing::trace!(
            %archetype,
            action = %action.kind,
            priority = action.priority,
            "decided"
        );
        action
    }

    /// Like `decide()`, but takes the archetype by name. Names that match no
    /// archetype get `Action::hold_fallback()`.
    pub fn decide_named(
        &self,
        name: &str,
        snap: &WorldSnapshot,
        rng: &mut impl RandomSource,
    ) -> Action {
        match name.parse::<Archetype>() {
            Ok(archetype) => self.decide(archetype, snap, rng),
            Err(err) => {
                tracing::trace!(%err, "holding position");
                Action::hold_fallback()
            }
        }
    }
}

fn decide_rush(snap: &WorldSnapshot) -> Action {
    let opponent = snap.opponent_position;
    if snap.health_fraction() < RUSH_LOW_HEALTH {
        // Nothing to lose.
        return Action::new(ActionType::Rush, 9).at(opponent);
    }
    if snap.has_line_of_sight && snap.opponent_distance < RUSH_SHOOT_RANGE {
        return Action::new(ActionType::Shoot, 8).at(opponent);
    }
    if snap.opponent_distance < RUSH_CLOSE_RANGE {
        return Action::new(ActionType::Shoot, 7).at(opponent);
    }
    Action::new(ActionType::Rush, 5).at(opponent)
}

fn decide_tactical(
    snap: &WorldSnapshot,
    profile: &ArchetypeProfile,
    rng: &mut impl RandomSource,
) -> Action {
    if snap.health_fraction() < TACTICAL_LOW_HEALTH {
        if profile.calls_backup && rng.next_f32() < BACKUP_CHANCE {
            return Action::new(ActionType::CallBackup, 10);
        }
        let fallback = tactics::nearest_cover(snap)
            .unwrap_or_else(|| tactics::retreat_position(snap, profile));
        return Action::new(ActionType::Retreat, 9).at(fallback);
    }
    if !snap.in_cover {
        let cover = tactics::nearest_cover(snap)
            .unwrap_or_else(|| tactics::tactical_position(snap, profile));
        return Action::new(ActionType::TakeCover, 8).at(cover);
    }
    if profile.can_flank && tactics::flank_feasible(snap) {
        return Action::new(ActionType::Flank, 7).at_opt(tactics::pick_flank_route(snap, rng));
    }
    if snap.has_line_of_sight && snap.in_cover && tactics::in_preferred_range(snap, profile) {
        return Action::new(ActionType::Shoot, 6).at(snap.opponent_position);
    }
    if tactics::too_close(snap, profile) {
        return Action::new(ActionType::Retreat, 6).at(tactics::retreat_position(snap, profile));
    }
    if profile.throws_grenades && tactics::grenade_opportunity(snap) {
        return Action::new(ActionType::ThrowGrenade, 7).at(snap.opponent_position);
    }
    Action::new(ActionType::MoveTo, 4).at(tactics::tactical_position(snap, profile))
}

fn decide_defensive(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> Action {
    if snap.health_fraction() < DEFENSIVE_LOW_HEALTH {
        if let Some(&ability) = profile.special_abilities.first() {
            return Action::new(ActionType::UseAbility, 9).using(ability);
        }
    }
    if snap.opponent_distance < SUPPRESS_RANGE {
        return Action::new(ActionType::SuppressFire, 8)
            .at(snap.opponent_position)
            .for_secs(SUPPRESS_SECS);
    }
    if snap.has_line_of_sight && snap.opponent_distance < profile.preferred_range.max {
        return Action::new(ActionType::Shoot, 7).at(snap.opponent_position);
    }
    if !tactics::is_defensible(snap) {
        return Action::new(ActionType::MoveTo, 6).at(tactics::tactical_position(snap, profile));
    }
    if snap.nearby_opponents.len() > SURROUNDED_OPPONENTS && profile.calls_backup {
        return Action::new(ActionType::CallBackup, 8);
    }
    Action::new(ActionType::HoldPosition, 2)
}

fn decide_sniper(
    snap: &WorldSnapshot,
    profile: &ArchetypeProfile,
    rng: &mut impl RandomSource,
) -> Action {
    // Only an opponent with line of sight can spot the sniper.
    let detected = snap.has_line_of_sight && rng.next_f32() < SNIPER_DETECTION_CHANCE;
    if detected {
        return Action::new(ActionType::Retreat, 9).at(tactics::select_vantage_point(snap, profile));
    }
    if !tactics::is_at_vantage_point(snap, profile) {
        return Action::new(ActionType::MoveTo, 7).at(tactics::select_vantage_point(snap, profile));
    }
    if snap.has_line_of_sight && tactics::in_preferred_range(snap, profile) {
        return Action::new(ActionType::AimAndWarn, 8)
            .at(snap.opponent_position)
            .for_secs(AIM_SECS);
    }
    if tactics::too_close(snap, profile) {
        return Action::new(ActionType::Retreat, 7).at(tactics::retreat_position(snap, profile));
    }
    if tactics::allies_engaged(snap) && snap.has_line_of_sight {
        return Action::new(ActionType::Shoot, 6).at(snap.opponent_position);
    }
    Action::new(ActionType::Wait, 1).for_secs(SNIPER_WAIT_SECS)
}

fn decide_berserker(snap: &WorldSnapshot, profile: &ArchetypeProfile) -> Action {
    if snap.health_fraction() < BERSERKER_LOW_HEALTH {
        if let Some(boost) = profile.combat_boost() {
            return Action::new(ActionType::UseAbility, 10).using(boost);
        }
    }
    if snap.opponent_distance < BERSERKER_GRENADE_RANGE && profile.throws_grenades {
        return Action::new(ActionType::ThrowGrenade, 8).at(snap.opponent_position);
    }
    if snap.has_line_of_sight {
        // Fired on the move; the target doubles as the advance direction.
        return Action::new(ActionType::Shoot, 7).at(snap.opponent_position);
    }
    Action::new(ActionType::Rush, 5).at(snap.opponent_position)
}
