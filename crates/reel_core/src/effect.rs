//! Narrative effects attached to waypoints
//!
//! Which effects a waypoint may carry depends on the role of the character
//! that owns the path. [`Effect`] encodes that split directly so that a
//! survivor can never "kill" and a kill target can only exist on a kill
//! waypoint. [`EffectKind`] is the flat view handed to renderers.

use crate::character::{CharacterId, Role};
use serde::{Deserialize, Serialize};

/// Flat effect classification used in render output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    #[default]
    Normal,
    Hiding,
    Dead,
    Escaped,
    Fallen,
    Kill,
}

impl EffectKind {
    /// Opacity used when a waypoint does not override it
    pub fn default_opacity(self) -> f32 {
        match self {
            EffectKind::Hiding => 0.3,
            EffectKind::Dead => 0.0,
            EffectKind::Normal | EffectKind::Escaped | EffectKind::Fallen | EffectKind::Kill => 1.0,
        }
    }

    /// Whether a character of `role` may carry this effect on its path
    pub fn allowed_for(self, role: Role) -> bool {
        match self {
            EffectKind::Normal | EffectKind::Dead => true,
            EffectKind::Kill => role == Role::Killer,
            EffectKind::Hiding | EffectKind::Escaped | EffectKind::Fallen => role == Role::Survivor,
        }
    }
}

/// Effects available on a survivor's path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivorEffect {
    #[default]
    Normal,
    Hiding,
    Escaped,
    Fallen,
    Dead,
}

/// Effects available on the killer's path
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillerEffect {
    #[default]
    Normal,
    /// Strike at this waypoint; `target` may be unset while authoring
    Kill {
        #[serde(default)]
        target: Option<CharacterId>,
    },
    Dead,
}

/// A waypoint effect, split by the role that may author it
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "effect", rename_all = "snake_case")]
pub enum Effect {
    Survivor(SurvivorEffect),
    Killer(KillerEffect),
}

impl Effect {
    /// Shorthand for a killer strike on `target`
    pub fn kill(target: impl Into<CharacterId>) -> Self {
        Effect::Killer(KillerEffect::Kill {
            target: Some(target.into()),
        })
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Survivor(SurvivorEffect::Normal) | Effect::Killer(KillerEffect::Normal) => {
                EffectKind::Normal
            }
            Effect::Survivor(SurvivorEffect::Dead) | Effect::Killer(KillerEffect::Dead) => {
                EffectKind::Dead
            }
            Effect::Survivor(SurvivorEffect::Hiding) => EffectKind::Hiding,
            Effect::Survivor(SurvivorEffect::Escaped) => EffectKind::Escaped,
            Effect::Survivor(SurvivorEffect::Fallen) => EffectKind::Fallen,
            Effect::Killer(KillerEffect::Kill { .. }) => EffectKind::Kill,
        }
    }

    /// The role allowed to author this effect
    pub fn role(&self) -> Role {
        match self {
            Effect::Survivor(_) => Role::Survivor,
            Effect::Killer(_) => Role::Killer,
        }
    }

    /// Kill target, only present on a killer strike
    pub fn kill_target(&self) -> Option<&CharacterId> {
        match self {
            Effect::Killer(KillerEffect::Kill { target }) => target.as_ref(),
            _ => None,
        }
    }
}

impl From<SurvivorEffect> for Effect {
    fn from(effect: SurvivorEffect) -> Self {
        Effect::Survivor(effect)
    }
}

impl From<KillerEffect> for Effect {
    fn from(effect: KillerEffect) -> Self {
        Effect::Killer(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_opacity_table() {
        assert_eq!(EffectKind::Normal.default_opacity(), 1.0);
        assert_eq!(EffectKind::Hiding.default_opacity(), 0.3);
        assert_eq!(EffectKind::Dead.default_opacity(), 0.0);
        assert_eq!(EffectKind::Escaped.default_opacity(), 1.0);
        assert_eq!(EffectKind::Fallen.default_opacity(), 1.0);
        assert_eq!(EffectKind::Kill.default_opacity(), 1.0);
    }

    #[test]
    fn test_role_constraints() {
        assert!(EffectKind::Kill.allowed_for(Role::Killer));
        assert!(!EffectKind::Kill.allowed_for(Role::Survivor));
        assert!(EffectKind::Hiding.allowed_for(Role::Survivor));
        assert!(!EffectKind::Escaped.allowed_for(Role::Killer));
        assert!(EffectKind::Dead.allowed_for(Role::Killer));
        assert!(EffectKind::Dead.allowed_for(Role::Survivor));
    }

    #[test]
    fn test_kill_target_only_on_kill() {
        let strike = Effect::kill("s1");
        assert_eq!(strike.kind(), EffectKind::Kill);
        assert_eq!(strike.kill_target(), Some(&CharacterId::new("s1")));

        let dead: Effect = KillerEffect::Dead.into();
        assert_eq!(dead.kind(), EffectKind::Dead);
        assert_eq!(dead.kill_target(), None);

        let unaimed = Effect::Killer(KillerEffect::Kill { target: None });
        assert_eq!(unaimed.kind(), EffectKind::Kill);
        assert_eq!(unaimed.kill_target(), None);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Effect::kill("s1")).unwrap();
        assert_eq!(
            json,
            r#"{"role":"killer","effect":{"kill":{"target":"s1"}}}"#
        );

        let hiding: Effect =
            serde_json::from_str(r#"{"role":"survivor","effect":"hiding"}"#).unwrap();
        assert_eq!(hiding, Effect::Survivor(SurvivorEffect::Hiding));
    }
}
