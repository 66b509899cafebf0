//! Default personality table, indexed by [`ShipClass::index`].
//!
//! Larger classes reevaluate less often and are more aggressive. That is a
//! tuning choice carried by this table only; the resolver applies whatever
//! table it is given.

use super::{Personality, PersonalityMode};
use crate::ship::ShipClass;

/// Built-in personalities, smallest class first.
pub const DEFAULT_PERSONALITIES: [Personality; 5] = [
    // fighter
    Personality {
        mode: PersonalityMode::Aggressive,
        intent_reevaluation_rate: 0.8,
        min_intent_duration: 1.5,
        max_intent_duration: 4.0,
        aggressiveness: 0.55,
        caution: 0.3,
        group_cohesion: 0.4,
        preferred_range_multiplier: 1.0,
    },
    // corvette
    Personality {
        mode: PersonalityMode::Mixed,
        intent_reevaluation_rate: 1.0,
        min_intent_duration: 2.0,
        max_intent_duration: 5.0,
        aggressiveness: 0.6,
        caution: 0.5,
        group_cohesion: 0.5,
        preferred_range_multiplier: 1.0,
    },
    // frigate
    Personality {
        mode: PersonalityMode::Mixed,
        intent_reevaluation_rate: 1.2,
        min_intent_duration: 2.5,
        max_intent_duration: 6.0,
        aggressiveness: 0.65,
        caution: 0.5,
        group_cohesion: 0.6,
        preferred_range_multiplier: 1.1,
    },
    // destroyer
    Personality {
        mode: PersonalityMode::Aggressive,
        intent_reevaluation_rate: 1.5,
        min_intent_duration: 3.0,
        max_intent_duration: 7.0,
        aggressiveness: 0.8,
        caution: 0.35,
        group_cohesion: 0.6,
        preferred_range_multiplier: 1.2,
    },
    // carrier
    Personality {
        mode: PersonalityMode::Defensive,
        intent_reevaluation_rate: 2.0,
        min_intent_duration: 4.0,
        max_intent_duration: 9.0,
        aggressiveness: 0.9,
        caution: 0.7,
        group_cohesion: 0.8,
        preferred_range_multiplier: 1.4,
    },
];

/// Built-in personality for a class.
#[must_use]
pub const fn default_personality(class: ShipClass) -> Personality {
    DEFAULT_PERSONALITIES[class.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_follows_size_policy() {
        for pair in DEFAULT_PERSONALITIES.windows(2) {
            assert!(pair[1].aggressiveness >= pair[0].aggressiveness);
            assert!(pair[1].intent_reevaluation_rate >= pair[0].intent_reevaluation_rate);
        }
    }

    #[test]
    fn durations_are_ordered() {
        for p in &DEFAULT_PERSONALITIES {
            assert!(p.min_intent_duration <= p.max_intent_duration);
        }
    }
}
