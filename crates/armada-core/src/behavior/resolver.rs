//! Resolve a [`BehaviorConfig`] into fully populated per-ship values.

use super::{default_personality, BehaviorConfig, GlobalSettings, Personality, TeamModifier};
use crate::ship::{ShipClass, Team};

/// Smallest reevaluation interval accepted, in seconds.
const MIN_REEVALUATION_RATE: f32 = 0.05;

fn unit_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

fn positive_or(value: f32, min: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(min)
    } else {
        fallback
    }
}

fn factor(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        1.0
    }
}

/// Effective personality for a class on a team.
///
/// Starts from the default table, layers the class override, then multiplies
/// aggressiveness, caution and group cohesion by the team modifier and clamps
/// each to `[0, 1]`. A missing override or modifier is the identity. Timing
/// fields are forced into a usable range (`max >= min`, rate above a small
/// floor) so the tick never sees a degenerate personality.
///
/// ```
/// use armada_core::behavior::{effective_personality, BehaviorConfig, TeamModifier};
/// use armada_core::ship::{ShipClass, Team};
///
/// let config = BehaviorConfig::default().with_team_modifier(
///     Team::Blue,
///     TeamModifier { aggressiveness: 10.0, ..TeamModifier::IDENTITY },
/// );
/// let p = effective_personality(&config, ShipClass::Carrier, Team::Blue);
/// assert_eq!(p.aggressiveness, 1.0);
/// ```
#[must_use]
pub fn effective_personality(config: &BehaviorConfig, class: ShipClass, team: Team) -> Personality {
    let base = default_personality(class);
    let merged = config
        .personalities
        .get(&class)
        .map_or(base, |over| over.apply(base));
    let modifier = config
        .team_modifiers
        .get(&team)
        .copied()
        .unwrap_or(TeamModifier::IDENTITY);

    let mut p = merged;
    p.aggressiveness = unit_or(p.aggressiveness * factor(modifier.aggressiveness), base.aggressiveness);
    p.caution = unit_or(p.caution * factor(modifier.caution), base.caution);
    p.group_cohesion = unit_or(p.group_cohesion * factor(modifier.group_cohesion), base.group_cohesion);

    p.intent_reevaluation_rate = positive_or(
        p.intent_reevaluation_rate,
        MIN_REEVALUATION_RATE,
        base.intent_reevaluation_rate,
    );
    p.min_intent_duration = positive_or(p.min_intent_duration, 0.0, base.min_intent_duration);
    p.max_intent_duration =
        positive_or(p.max_intent_duration, 0.0, base.max_intent_duration).max(p.min_intent_duration);
    p.preferred_range_multiplier =
        positive_or(p.preferred_range_multiplier, 0.0, base.preferred_range_multiplier);
    p
}

/// Config resolved once into lookup tables.
///
/// Holds one [`Personality`] per class and team plus sanitized
/// [`GlobalSettings`]. The tick reads these without any fallback logic.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBehavior {
    personalities: [[Personality; 2]; 5],
    settings: GlobalSettings,
}

impl ResolvedBehavior {
    /// Resolve every class/team combination.
    #[must_use]
    pub fn new(config: &BehaviorConfig) -> Self {
        let personalities =
            ShipClass::ALL.map(|class| Team::ALL.map(|team| effective_personality(config, class, team)));
        Self {
            personalities,
            settings: config.global.sanitized(),
        }
    }

    /// Personality for a class on a team.
    #[must_use]
    pub fn personality(&self, class: ShipClass, team: Team) -> &Personality {
        &self.personalities[class.index()][team.index()]
    }

    /// Sanitized global settings.
    #[must_use]
    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Mutable settings, for runtime toggles.
    pub fn settings_mut(&mut self) -> &mut GlobalSettings {
        &mut self.settings
    }
}

impl Default for ResolvedBehavior {
    fn default() -> Self {
        Self::new(&BehaviorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{PersonalityMode, PersonalityOverride, DEFAULT_PERSONALITIES};

    #[test]
    fn defaults_without_overrides() {
        let config = BehaviorConfig::default();
        for class in ShipClass::ALL {
            for team in Team::ALL {
                assert_eq!(
                    effective_personality(&config, class, team),
                    DEFAULT_PERSONALITIES[class.index()]
                );
            }
        }
    }

    #[test]
    fn team_modifier_clamps_to_unit_interval() {
        let config = BehaviorConfig::default().with_team_modifier(
            Team::Red,
            TeamModifier {
                aggressiveness: 1.5,
                caution: -2.0,
                group_cohesion: 1.0,
            },
        );
        let base = default_personality(ShipClass::Carrier);
        let p = effective_personality(&config, ShipClass::Carrier, Team::Red);
        // 0.9 * 1.5 = 1.35
        assert_eq!(p.aggressiveness, 1.0);
        assert_eq!(p.caution, 0.0);
        assert_eq!(p.group_cohesion, base.group_cohesion);

        let other = effective_personality(&config, ShipClass::Carrier, Team::Blue);
        assert_eq!(other, base);
    }

    #[test]
    fn class_override_applies_before_team_modifier() {
        let config = BehaviorConfig::default()
            .with_personality(
                ShipClass::Fighter,
                PersonalityOverride {
                    mode: Some(PersonalityMode::Defensive),
                    caution: Some(0.4),
                    ..PersonalityOverride::default()
                },
            )
            .with_team_modifier(
                Team::Blue,
                TeamModifier {
                    caution: 2.0,
                    ..TeamModifier::IDENTITY
                },
            );
        let p = effective_personality(&config, ShipClass::Fighter, Team::Blue);
        assert_eq!(p.mode, PersonalityMode::Defensive);
        assert!((p.caution - 0.8).abs() < 1e-6);
    }

    #[test]
    fn degenerate_timing_is_repaired() {
        let config = BehaviorConfig::default().with_personality(
            ShipClass::Frigate,
            PersonalityOverride {
                intent_reevaluation_rate: Some(-1.0),
                min_intent_duration: Some(5.0),
                max_intent_duration: Some(1.0),
                aggressiveness: Some(f32::NAN),
                ..PersonalityOverride::default()
            },
        );
        let p = effective_personality(&config, ShipClass::Frigate, Team::Red);
        assert_eq!(p.intent_reevaluation_rate, MIN_REEVALUATION_RATE);
        assert_eq!(p.min_intent_duration, 5.0);
        assert_eq!(p.max_intent_duration, 5.0);
        assert_eq!(p.aggressiveness, default_personality(ShipClass::Frigate).aggressiveness);
    }

    #[test]
    fn resolved_table_matches_direct_lookup() {
        let config = BehaviorConfig::default().with_team_modifier(
            Team::Blue,
            TeamModifier {
                aggressiveness: 0.5,
                ..TeamModifier::IDENTITY
            },
        );
        let resolved = ResolvedBehavior::new(&config);
        for class in ShipClass::ALL {
            for team in Team::ALL {
                assert_eq!(
                    *resolved.personality(class, team),
                    effective_personality(&config, class, team)
                );
            }
        }
        assert_eq!(*resolved.settings(), GlobalSettings::default());
    }
}
