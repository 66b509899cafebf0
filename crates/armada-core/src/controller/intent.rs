//! Intent selection.
//!
//! Order of precedence on every reevaluation:
//!
//! 1. damage-triggered evade (and proximity evade when not damage-gated)
//! 2. alarm response for idle or patrolling ships with nothing in sight
//! 3. the strategy of the ship's mode
//! 4. explore (the team scout) or patrol when no enemy is visible

use crate::behavior::{GlobalSettings, Personality, PersonalityMode};
use crate::rng::SimRng;
use crate::ship::{Intent, Ship, ShipId};

use super::{AiController, Decision};

/// Probability of strafing inside the close band.
const CLOSE_STRAFE_CHANCE: f32 = 0.7;
/// Probability of pursuing beyond the medium band.
const LONG_PURSUE_CHANCE: f32 = 0.9;

impl AiController {
    /// Pick the next intent (and target) for ship `i`.
    pub(super) fn choose_intent(&mut self, ships: &mut [Ship], i: usize, now: f64) -> Decision {
        let mode = self.mode_of(&ships[i]);
        match mode {
            PersonalityMode::Roaming => self.ensure_roaming_anchor(ships, i),
            PersonalityMode::Formation => self.ensure_formation_slot(ships, i),
            _ => {}
        }

        let ships: &[Ship] = ships;
        let ship = &ships[i];
        let personality = self.personality_of(ship);
        let settings = self.behavior.settings();
        let range = ship.ai_state.preferred_range;
        let visible = self.nearest_enemy(ship.position, settings.detection_range, ship.team);

        // Damage override
        if Self::damaged_recently(settings, ship, now) {
            let attacker = ship
                .ai_state
                .last_attacker
                .filter(|id| self.live(ships, *id).is_some_and(|a| a.team != ship.team));
            return Decision::new(Intent::Evade, attacker.or(visible.map(|(id, _)| id)));
        }
        if !settings.evade_only_on_damage
            && mode == PersonalityMode::Defensive
            && personality.caution >= settings.evade_caution_threshold
        {
            if let Some((id, distance)) = visible {
                if distance < range * settings.evade_proximity_multiplier {
                    return Decision::new(Intent::Evade, Some(id));
                }
            }
        }

        // Alarm propagation
        if visible.is_none() && ship.ai_state.current_intent.is_idle_like() {
            if let Some(target) = self.alarm_target(ships, ship, now) {
                return Decision::new(Intent::Pursue, Some(target));
            }
        }

        match mode {
            PersonalityMode::Roaming => {
                let engage = range * settings.roaming_engage_multiplier;
                match visible {
                    Some((id, distance)) if distance <= engage => Decision::new(Intent::Pursue, Some(id)),
                    _ => Decision::new(Intent::Roam, None),
                }
            }
            PersonalityMode::Formation => {
                let leads = ship
                    .ai_state
                    .assignment
                    .formation()
                    .and_then(|slot| self.registry.formation_leader(slot.formation_id))
                    .is_some_and(|(_, leader)| leader == ship.id);
                match visible {
                    Some((id, _)) if leads => Decision::new(Intent::Pursue, Some(id)),
                    _ => Decision::new(Intent::FormationHold, None),
                }
            }
            PersonalityMode::Aggressive | PersonalityMode::Defensive | PersonalityMode::Mixed => {
                let Some((target, distance)) = visible else {
                    let scouting =
                        settings.enable_scouts && self.registry.scout(ship.team) == Some(ship.id);
                    let intent = if scouting { Intent::Explore } else { Intent::Patrol };
                    return Decision::new(intent, None);
                };
                let has_company = !self
                    .neighbors(ship.position, settings.group_radius, ship.team, ship.id)
                    .is_empty();
                let intent = strategy(
                    &mut self.rng,
                    mode,
                    &personality,
                    settings,
                    distance,
                    range,
                    has_company,
                );
                Decision::new(intent, Some(target))
            }
        }
    }

    /// Target named by a team alarm reaching `ship`: the attacker if it is
    /// still alive, else the enemy nearest the alarm position.
    fn alarm_target(&self, ships: &[Ship], ship: &Ship, now: f64) -> Option<ShipId> {
        let alarm = self.alarm_for(ship, now)?;
        alarm
            .attacker
            .filter(|id| self.live(ships, *id).is_some_and(|a| a.team != ship.team))
            .or_else(|| {
                self.nearest_enemy(alarm.position, self.behavior.settings().detection_range, ship.team)
                    .map(|(id, _)| id)
            })
    }
}

/// Mode strategy for a ship with an enemy at `distance`.
fn strategy(
    rng: &mut SimRng,
    mode: PersonalityMode,
    personality: &Personality,
    settings: &GlobalSettings,
    distance: f32,
    range: f32,
    has_company: bool,
) -> Intent {
    match mode {
        PersonalityMode::Defensive => choose_defensive_intent(rng, personality, settings, has_company),
        PersonalityMode::Mixed => {
            let total = personality.aggressiveness + personality.caution;
            if total <= 0.0 || rng.unit() * total < personality.aggressiveness {
                choose_aggressive_intent(rng, personality, settings, distance, range)
            } else {
                choose_defensive_intent(rng, personality, settings, has_company)
            }
        }
        _ => choose_aggressive_intent(rng, personality, settings, distance, range),
    }
}

/// Range-banded pursue/strafe choice.
///
/// Inside `close_range_multiplier * range` strafing is favoured, inside
/// `medium_range_multiplier * range` aggressiveness decides, beyond that
/// pursuit is favoured.
fn choose_aggressive_intent(
    rng: &mut SimRng,
    personality: &Personality,
    settings: &GlobalSettings,
    distance: f32,
    range: f32,
) -> Intent {
    let roll = rng.unit();
    if distance < range * settings.close_range_multiplier {
        return if roll < CLOSE_STRAFE_CHANCE {
            Intent::Strafe
        } else {
            Intent::Pursue
        };
    }
    let pursue_chance = if distance < range * settings.medium_range_multiplier {
        personality.aggressiveness
    } else {
        LONG_PURSUE_CHANCE
    };
    if roll < pursue_chance {
        Intent::Pursue
    } else {
        Intent::Strafe
    }
}

/// Caution- and cohesion-weighted choice between evade, group and strafe.
///
/// Evade is only offered when evasion is not gated on damage.
fn choose_defensive_intent(
    rng: &mut SimRng,
    personality: &Personality,
    settings: &GlobalSettings,
    has_company: bool,
) -> Intent {
    if !settings.evade_only_on_damage && rng.unit() < personality.caution {
        return Intent::Evade;
    }
    if has_company && rng.unit() < personality.group_cohesion {
        return Intent::Group;
    }
    Intent::Strafe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::default_personality;
    use crate::ship::ShipClass;

    fn count(mut pick: impl FnMut(&mut SimRng) -> Intent, intent: Intent) -> usize {
        let mut rng = SimRng::new(11);
        (0..1000).filter(|_| pick(&mut rng) == intent).count()
    }

    #[test]
    fn close_band_favours_strafe() {
        let p = default_personality(ShipClass::Fighter);
        let s = GlobalSettings::default();
        let strafes = count(|rng| choose_aggressive_intent(rng, &p, &s, 100.0, 400.0), Intent::Strafe);
        assert!((600..800).contains(&strafes), "strafes = {strafes}");
    }

    #[test]
    fn long_band_favours_pursuit() {
        let p = default_personality(ShipClass::Fighter);
        let s = GlobalSettings::default();
        let pursues = count(|rng| choose_aggressive_intent(rng, &p, &s, 1000.0, 400.0), Intent::Pursue);
        assert!(pursues > 850, "pursues = {pursues}");
    }

    #[test]
    fn medium_band_follows_aggressiveness() {
        let mut p = default_personality(ShipClass::Fighter);
        p.aggressiveness = 1.0;
        let s = GlobalSettings::default();
        let pursues = count(|rng| choose_aggressive_intent(rng, &p, &s, 300.0, 400.0), Intent::Pursue);
        assert_eq!(pursues, 1000);
    }

    #[test]
    fn defensive_never_evades_when_damage_gated() {
        let mut p = default_personality(ShipClass::Carrier);
        p.caution = 1.0;
        let s = GlobalSettings::default();
        assert!(s.evade_only_on_damage);
        assert_eq!(count(|rng| choose_defensive_intent(rng, &p, &s, true), Intent::Evade), 0);

        let open = GlobalSettings {
            evade_only_on_damage: false,
            ..GlobalSettings::default()
        };
        assert_eq!(count(|rng| choose_defensive_intent(rng, &p, &open, true), Intent::Evade), 1000);
    }

    #[test]
    fn defensive_groups_only_with_company() {
        let mut p = default_personality(ShipClass::Carrier);
        p.group_cohesion = 1.0;
        let s = GlobalSettings::default();
        assert_eq!(count(|rng| choose_defensive_intent(rng, &p, &s, true), Intent::Group), 1000);
        assert_eq!(count(|rng| choose_defensive_intent(rng, &p, &s, false), Intent::Strafe), 1000);
    }

    #[test]
    fn mixed_with_zero_caution_is_aggressive() {
        let mut p = default_personality(ShipClass::Corvette);
        p.caution = 0.0;
        p.aggressiveness = 1.0;
        let s = GlobalSettings::default();
        let pursues = count(
            |rng| strategy(rng, PersonalityMode::Mixed, &p, &s, 300.0, 400.0, false),
            Intent::Pursue,
        );
        assert_eq!(pursues, 1000);
    }
}
