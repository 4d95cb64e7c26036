// Abstract action descriptors emitted by the policy evaluator.
//
// An `Action` says what an agent should do this tick: a kind, an optional
// world-space target, a priority and optionally a duration or an ability to
// trigger. It is a value: produced fresh per `decide()` call and never
// retained here. Executing it (steering, firing, playing an animation)
// belongs to the host's agent controller.
//
// `priority` is always populated, even though only one action leaves
// `decide()`. A squad-level arbiter can compare actions across agents with
// it; this crate never does.

use crate::profile::SpecialAbility;
use crate::types::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything an agent can be told to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    MoveTo,
    Rush,
    Retreat,
    TakeCover,
    Flank,
    HoldPosition,
    Shoot,
    Reload,
    ThrowGrenade,
    ThrowFlashbang,
    CallBackup,
    AlertAllies,
    UseAbility,
    SuppressFire,
    AimAndWarn,
    Patrol,
    Search,
    Wait,
}

impl ActionType {
    /// Kinds whose target is a place to walk to. The planner routes these
    /// through the navigation service.
    pub fn requires_movement(self) -> bool {
        matches!(
            self,
            ActionType::MoveTo
                | ActionType::Rush
                | ActionType::Retreat
                | ActionType::TakeCover
                | ActionType::Flank
                | ActionType::Patrol
                | ActionType::Search
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionType::MoveTo => "move-to",
            ActionType::Rush => "rush",
            ActionType::Retreat => "retreat",
            ActionType::TakeCover => "take-cover",
            ActionType::Flank => "flank",
            ActionType::HoldPosition => "hold-position",
            ActionType::Shoot => "shoot",
            ActionType::Reload => "reload",
            ActionType::ThrowGrenade => "throw-grenade",
            ActionType::ThrowFlashbang => "throw-flashbang",
            ActionType::CallBackup => "call-backup",
            ActionType::AlertAllies => "alert-allies",
            ActionType::UseAbility => "use-ability",
            ActionType::SuppressFire => "suppress-fire",
            ActionType::AimAndWarn => "aim-and-warn",
            ActionType::Patrol => "patrol",
            ActionType::Search => "search",
            ActionType::Wait => "wait",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec3>,
    pub priority: u8,
    /// Seconds the action should be sustained, when meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    /// Ability to trigger for `UseAbility`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<SpecialAbility>,
}

impl Action {
    pub fn new(kind: ActionType, priority: u8) -> Self {
        Self {
            kind,
            target: None,
            priority,
            duration: None,
            ability: None,
        }
    }

    /// The neutral action returned for unknown archetypes.
    pub fn hold_fallback() -> Self {
        Self::new(ActionType::HoldPosition, 0)
    }

    pub fn at(mut self, target: Vec3) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the target if there is one.
    pub fn at_opt(mut self, target: Option<Vec3>) -> Self {
        self.target = target;
        self
    }

    pub fn for_secs(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn using(mut self, ability: SpecialAbility) -> Self {
        self.ability = Some(ability);
        self
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (p{})", self.kind, self.priority)?;
        if let Some(target) = self.target {
            write!(f, " -> {target}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let action = Action::new(ActionType::UseAbility, 9)
            .at(Vec3::new(1.0, 0.0, 2.0))
            .for_secs(3.0)
            .using(SpecialAbility::Shield);
        assert_eq!(action.kind, ActionType::UseAbility);
        assert_eq!(action.priority, 9);
        assert_eq!(action.target, Some(Vec3::new(1.0, 0.0, 2.0)));
        assert_eq!(action.duration, Some(3.0));
        assert_eq!(action.ability, Some(SpecialAbility::Shield));
    }

    #[test]
    fn hold_fallback_is_neutral() {
        let action = Action::hold_fallback();
        assert_eq!(action.kind, ActionType::HoldPosition);
        assert_eq!(action.priority, 0);
        assert_eq!(action.target, None);
    }

    #[test]
    fn movement_kinds() {
        assert!(ActionType::TakeCover.requires_movement());
        assert!(ActionType::Flank.requires_movement());
        assert!(!ActionType::Shoot.requires_movement());
        assert!(!ActionType::AimAndWarn.requires_movement());
    }

    #[test]
    fn display_uses_kebab_names() {
        let action = Action::new(ActionType::CallBackup, 10);
        assert_eq!(action.to_string(), "call-backup (p10)");
    }
}
