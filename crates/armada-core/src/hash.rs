//! State hashing for determinism verification.
//!
//! Two controllers fed the same seed, ships and `dt` sequence must produce the
//! same hash after every tick.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec3;

use crate::ship::{Assignment, Ship};

/// Deterministic hash of every simulated field of a ship list, in list order.
#[must_use]
pub fn hash_ships(ships: &[Ship]) -> u64 {
    let mut hasher = DefaultHasher::new();
    ships.len().hash(&mut hasher);
    for ship in ships {
        hash_ship(ship, &mut hasher);
    }
    hasher.finish()
}

fn hash_ship<H: Hasher>(ship: &Ship, hasher: &mut H) {
    ship.id.hash(hasher);
    ship.team.hash(hasher);
    ship.class.hash(hasher);

    // Floats as bits to avoid float comparison issues
    hash_vec3(ship.position, hasher);
    hash_vec3(ship.velocity, hasher);
    ship.orientation.pitch.to_bits().hash(hasher);
    ship.orientation.yaw.to_bits().hash(hasher);
    ship.orientation.roll.to_bits().hash(hasher);
    ship.health.to_bits().hash(hasher);
    ship.target_id.hash(hasher);

    for turret in &ship.turrets {
        turret.cooldown_remaining.to_bits().hash(hasher);
        turret.target_id.hash(hasher);
    }

    let ai = &ship.ai_state;
    ai.current_intent.hash(hasher);
    ai.intent_end_time.to_bits().hash(hasher);
    ai.last_intent_reevaluation.map(f64::to_bits).hash(hasher);
    ai.preferred_range.to_bits().hash(hasher);
    ai.recent_damage.to_bits().hash(hasher);
    match &ai.assignment {
        Assignment::None => 0u8.hash(hasher),
        Assignment::Roaming { anchor } => {
            1u8.hash(hasher);
            hash_vec3(*anchor, hasher);
        }
        Assignment::Formation(slot) => {
            2u8.hash(hasher);
            slot.formation_id.hash(hasher);
            slot.slot_index.hash(hasher);
            hash_vec3(slot.position, hasher);
        }
    }
}

fn hash_vec3<H: Hasher>(v: Vec3, hasher: &mut H) {
    v.x.to_bits().hash(hasher);
    v.y.to_bits().hash(hasher);
    v.z.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{Intent, ShipClass, ShipId, Team};

    fn ship(id: u64) -> Ship {
        Ship::new(ShipId::new(id), Team::Red, ShipClass::Fighter, Vec3::new(1.0, 2.0, 3.0))
    }

    #[test]
    fn identical_lists_hash_equal() {
        let a = vec![ship(1), ship(2)];
        let b = a.clone();
        assert_eq!(hash_ships(&a), hash_ships(&b));
    }

    #[test]
    fn any_field_change_changes_hash() {
        let base = vec![ship(1)];
        let h = hash_ships(&base);

        let mut moved = base.clone();
        moved[0].position.x += 0.001;
        assert_ne!(h, hash_ships(&moved));

        let mut retargeted = base.clone();
        retargeted[0].ai_state.current_intent = Intent::Evade;
        assert_ne!(h, hash_ships(&retargeted));
    }

    #[test]
    fn order_matters() {
        let a = vec![ship(1), ship(2)];
        let b = vec![ship(2), ship(1)];
        assert_ne!(hash_ships(&a), hash_ships(&b));
    }
}
