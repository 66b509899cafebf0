//! Behavior configuration and resolution.
//!
//! A [`BehaviorConfig`] is the user-facing, partially specified description of
//! how ships behave:
//!
//! - per-class [`PersonalityOverride`]s layered over [`DEFAULT_PERSONALITIES`]
//! - per-team [`TeamModifier`]s that scale the bounded traits
//! - [`GlobalSettings`] with a default for every key
//!
//! [`ResolvedBehavior`] turns a config into fully populated values once, so
//! the tick never branches on whether a key was present.

mod defaults;
mod resolver;
mod settings;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ship::{ShipClass, Team};

pub use defaults::{default_personality, DEFAULT_PERSONALITIES};
pub use resolver::{effective_personality, ResolvedBehavior};
pub use settings::GlobalSettings;

/// Intent-selection strategy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityMode {
    /// Range-banded pursue/strafe
    Aggressive,
    /// Evade or group, weighted by caution and cohesion
    Defensive,
    /// RNG blend of aggressive and defensive
    Mixed,
    /// Hold around a private anchor point
    Roaming,
    /// Hold a formation slot
    Formation,
}

impl fmt::Display for PersonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggressive => write!(f, "aggressive"),
            Self::Defensive => write!(f, "defensive"),
            Self::Mixed => write!(f, "mixed"),
            Self::Roaming => write!(f, "roaming"),
            Self::Formation => write!(f, "formation"),
        }
    }
}

/// Fully specified behavioral weights for one class and team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Intent-selection strategy
    pub mode: PersonalityMode,
    /// Minimum seconds between reevaluations
    pub intent_reevaluation_rate: f32,
    /// Shortest duration of a chosen intent
    pub min_intent_duration: f32,
    /// Longest duration of a chosen intent
    pub max_intent_duration: f32,
    /// Drive to engage, in `[0, 1]`
    pub aggressiveness: f32,
    /// Drive to avoid danger, in `[0, 1]`
    pub caution: f32,
    /// Drive to stay with teammates, in `[0, 1]`
    pub group_cohesion: f32,
    /// Scales the class weapon range into the preferred range
    pub preferred_range_multiplier: f32,
}

/// Partial personality; `None` fields keep the class default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityOverride {
    /// Strategy override
    pub mode: Option<PersonalityMode>,
    /// Reevaluation rate override
    pub intent_reevaluation_rate: Option<f32>,
    /// Minimum duration override
    pub min_intent_duration: Option<f32>,
    /// Maximum duration override
    pub max_intent_duration: Option<f32>,
    /// Aggressiveness override
    pub aggressiveness: Option<f32>,
    /// Caution override
    pub caution: Option<f32>,
    /// Group cohesion override
    pub group_cohesion: Option<f32>,
    /// Preferred range multiplier override
    pub preferred_range_multiplier: Option<f32>,
}

impl PersonalityOverride {
    /// Override that only changes the mode.
    #[must_use]
    pub fn mode(mode: PersonalityMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    /// Layer this override over `base`.
    #[must_use]
    pub fn apply(&self, base: Personality) -> Personality {
        Personality {
            mode: self.mode.unwrap_or(base.mode),
            intent_reevaluation_rate: self.intent_reevaluation_rate.unwrap_or(base.intent_reevaluation_rate),
            min_intent_duration: self.min_intent_duration.unwrap_or(base.min_intent_duration),
            max_intent_duration: self.max_intent_duration.unwrap_or(base.max_intent_duration),
            aggressiveness: self.aggressiveness.unwrap_or(base.aggressiveness),
            caution: self.caution.unwrap_or(base.caution),
            group_cohesion: self.group_cohesion.unwrap_or(base.group_cohesion),
            preferred_range_multiplier: self
                .preferred_range_multiplier
                .unwrap_or(base.preferred_range_multiplier),
        }
    }
}

/// Multiplicative per-team factors on the bounded traits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamModifier {
    /// Factor on aggressiveness
    pub aggressiveness: f32,
    /// Factor on caution
    pub caution: f32,
    /// Factor on group cohesion
    pub group_cohesion: f32,
}

impl TeamModifier {
    /// Identity modifier.
    pub const IDENTITY: Self = Self {
        aggressiveness: 1.0,
        caution: 1.0,
        group_cohesion: 1.0,
    };
}

impl Default for TeamModifier {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// User-facing behavior configuration.
///
/// ```
/// use armada_core::behavior::{BehaviorConfig, PersonalityMode};
/// use armada_core::ship::{ShipClass, Team};
///
/// let config = BehaviorConfig::from_json_str(r#"{
///     "personalities": { "fighter": { "mode": "roaming" } },
///     "team_modifiers": { "blue": { "aggressiveness": 1.5 } },
///     "global": { "separation_distance": 75.0 }
/// }"#).unwrap();
///
/// assert_eq!(config.global.separation_distance, 75.0);
/// let fighter = armada_core::behavior::effective_personality(&config, ShipClass::Fighter, Team::Red);
/// assert_eq!(fighter.mode, PersonalityMode::Roaming);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Per-class overrides of the default personalities
    pub personalities: BTreeMap<ShipClass, PersonalityOverride>,
    /// Per-team trait modifiers
    pub team_modifiers: BTreeMap<Team, TeamModifier>,
    /// Engine-wide tunables
    pub global: GlobalSettings,
}

impl BehaviorConfig {
    /// Parse a config from JSON. Missing sections and keys use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid JSON for this
    /// shape (unknown keys are ignored, wrong value types are not).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the config as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder helper: set a per-class override.
    #[must_use]
    pub fn with_personality(mut self, class: ShipClass, over: PersonalityOverride) -> Self {
        self.personalities.insert(class, over);
        self
    }

    /// Builder helper: set a team modifier.
    #[must_use]
    pub fn with_team_modifier(mut self, team: Team, modifier: TeamModifier) -> Self {
        self.team_modifiers.insert(team, modifier);
        self
    }

    /// Builder helper: replace the global settings.
    #[must_use]
    pub fn with_global(mut self, global: GlobalSettings) -> Self {
        self.global = global;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default_config() {
        let config = BehaviorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, BehaviorConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = BehaviorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let wrong_type = BehaviorConfig::from_json_str(r#"{ "global": { "enable_scouts": 3 } }"#);
        assert!(wrong_type.is_err());
    }

    #[test]
    fn json_roundtrip_preserves_overrides() {
        let config = BehaviorConfig::default()
            .with_personality(ShipClass::Frigate, PersonalityOverride::mode(PersonalityMode::Formation))
            .with_team_modifier(
                Team::Blue,
                TeamModifier {
                    caution: 0.5,
                    ..TeamModifier::IDENTITY
                },
            );
        let json = config.to_json_string().unwrap();
        let back = BehaviorConfig::from_json_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn override_keeps_unset_fields() {
        let base = default_personality(ShipClass::Corvette);
        let over = PersonalityOverride {
            caution: Some(0.1),
            ..PersonalityOverride::default()
        };
        let merged = over.apply(base);
        assert_eq!(merged.caution, 0.1);
        assert_eq!(merged.mode, base.mode);
        assert_eq!(merged.aggressiveness, base.aggressiveness);
    }

    #[test]
    fn partial_team_modifier_defaults_to_identity() {
        let modifier: TeamModifier = serde_json::from_str(r#"{ "caution": 2.0 }"#).unwrap();
        assert_eq!(modifier.aggressiveness, 1.0);
        assert_eq!(modifier.caution, 2.0);
    }
}
