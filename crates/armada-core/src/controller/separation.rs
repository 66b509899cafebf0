//! Same-team separation steering.

use glam::Vec3;

use crate::behavior::GlobalSettings;
use crate::ship::{Ship, ShipId};

use super::AiController;

/// Distance below which two ships count as coincident.
const COINCIDENT_DISTANCE: f32 = 1e-4;

/// Separation result for one ship.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeparationForce {
    /// Weighted push away from neighbours (zero with no neighbours)
    pub force: Vec3,
    /// Same-team ships within `separation_distance`
    pub neighbor_count: usize,
}

/// Cluster-size weight: dense clusters get a softer multiplier.
#[must_use]
pub(crate) fn cluster_weight(settings: &GlobalSettings, neighbor_count: usize) -> f32 {
    if neighbor_count > settings.separation_moderate_cluster {
        settings.separation_moderate_weight
    } else if neighbor_count > settings.separation_mild_cluster {
        settings.separation_mild_weight
    } else {
        settings.separation_weight
    }
}

/// Push direction for two ships at the same point.
///
/// Derived from both ids so the pair always splits along the same horizontal
/// axis, in opposite directions.
#[allow(clippy::cast_precision_loss)]
fn coincident_axis(me: ShipId, other: ShipId) -> Vec3 {
    let (lo, hi) = if me < other { (me, other) } else { (other, me) };
    let seed = lo.as_u64().wrapping_mul(31).wrapping_add(hi.as_u64()) % 360;
    let angle = (seed as f32).to_radians();
    let axis = Vec3::new(angle.cos(), angle.sin(), 0.0);
    if me < other {
        -axis
    } else {
        axis
    }
}

impl AiController {
    /// Separation force on ship `index` from its same-team neighbours.
    ///
    /// Neighbours come from the grid when `enable_spatial_index` is set and
    /// from a linear scan of the tick snapshot otherwise; both return the
    /// same set and are summed in id order, so the result does not depend on
    /// the path. Each neighbour pushes along the unit vector away from it,
    /// scaled by `separation_distance / d`. The sum is then scaled by the
    /// cluster-size weight.
    #[must_use]
    pub fn calculate_separation_force_with_count(&self, ships: &[Ship], index: usize) -> SeparationForce {
        let Some(ship) = ships.get(index).filter(|s| s.is_active()) else {
            return SeparationForce::default();
        };
        let settings = self.behavior.settings();
        let radius = settings.separation_distance;
        if radius <= 0.0 {
            return SeparationForce::default();
        }

        let mut neighbors = self.neighbors(ship.position, radius, ship.team, ship.id);
        if neighbors.is_empty() {
            return SeparationForce::default();
        }
        neighbors.sort_unstable_by_key(|e| e.id);

        let force = neighbors.iter().fold(Vec3::ZERO, |acc, neighbor| {
            let offset = ship.position - neighbor.pos;
            let distance = offset.length();
            let away = if distance > COINCIDENT_DISTANCE {
                offset / distance
            } else {
                coincident_axis(ship.id, ShipId::new(neighbor.id))
            };
            acc + away * (radius / distance.max(1.0))
        });

        SeparationForce {
            force: force * cluster_weight(settings, neighbors.len()),
            neighbor_count: neighbors.len(),
        }
    }
}

/// Blend a separation force into `ship`'s velocity, capped at cruise speed.
pub(super) fn apply_separation(ship: &mut Ship, separation: &SeparationForce, settings: &GlobalSettings) {
    if separation.neighbor_count == 0 {
        return;
    }
    let push = separation.force.clamp_length_max(1.0) * ship.speed * settings.separation_steer_strength;
    let velocity = (ship.velocity + push).clamp_length_max(ship.speed.max(0.0));
    ship.velocity = if velocity.is_finite() { velocity } else { Vec3::ZERO };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorConfig;
    use crate::bounds::SimulationBounds;
    use crate::ship::{ShipClass, Team};

    fn controller() -> AiController {
        AiController::new(SimulationBounds::new(2000.0, 2000.0, 2000.0), &BehaviorConfig::default(), 1)
    }

    fn ship(id: u64, team: Team, pos: Vec3) -> Ship {
        Ship::new(ShipId::new(id), team, ShipClass::Fighter, pos)
    }

    #[test]
    fn lone_ship_has_no_force() {
        let mut ai = controller();
        let ships = vec![ship(1, Team::Red, Vec3::splat(500.0))];
        ai.refresh_spatial(&ships);
        let sep = ai.calculate_separation_force_with_count(&ships, 0);
        assert_eq!(sep, SeparationForce::default());
    }

    #[test]
    fn pushes_away_from_teammate_only() {
        let mut ai = controller();
        let ships = vec![
            ship(1, Team::Red, Vec3::new(500.0, 500.0, 500.0)),
            ship(2, Team::Red, Vec3::new(520.0, 500.0, 500.0)),
            ship(3, Team::Blue, Vec3::new(480.0, 500.0, 500.0)),
        ];
        ai.refresh_spatial(&ships);
        let sep = ai.calculate_separation_force_with_count(&ships, 0);
        assert_eq!(sep.neighbor_count, 1);
        assert!(sep.force.x < 0.0);
        assert!(sep.force.y.abs() < 1e-6);
        // 60 / 20, base weight 1.0
        assert!((sep.force.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn closer_neighbours_push_harder() {
        let mut ai = controller();
        let near = vec![ship(1, Team::Red, Vec3::splat(500.0)), ship(2, Team::Red, Vec3::new(510.0, 500.0, 500.0))];
        let far = vec![ship(1, Team::Red, Vec3::splat(500.0)), ship(2, Team::Red, Vec3::new(550.0, 500.0, 500.0))];
        ai.refresh_spatial(&near);
        let a = ai.calculate_separation_force_with_count(&near, 0).force.length();
        ai.refresh_spatial(&far);
        let b = ai.calculate_separation_force_with_count(&far, 0).force.length();
        assert!(a > b);
    }

    #[test]
    fn coincident_ships_split_in_opposite_directions() {
        let mut ai = controller();
        let ships = vec![ship(4, Team::Red, Vec3::splat(500.0)), ship(9, Team::Red, Vec3::splat(500.0))];
        ai.refresh_spatial(&ships);
        let a = ai.calculate_separation_force_with_count(&ships, 0).force;
        let b = ai.calculate_separation_force_with_count(&ships, 1).force;
        assert!(a.is_finite() && b.is_finite());
        assert!(a.length() > 0.0);
        assert!((a + b).length() < 1e-4);
    }

    #[test]
    fn cluster_bands() {
        let s = GlobalSettings::default();
        assert_eq!(cluster_weight(&s, 0), s.separation_weight);
        assert_eq!(cluster_weight(&s, 3), s.separation_weight);
        assert_eq!(cluster_weight(&s, 4), s.separation_mild_weight);
        assert_eq!(cluster_weight(&s, 6), s.separation_mild_weight);
        assert_eq!(cluster_weight(&s, 7), s.separation_moderate_weight);
    }

    #[test]
    fn inactive_or_missing_index_is_zero() {
        let mut ai = controller();
        let mut ships = vec![ship(1, Team::Red, Vec3::splat(500.0)), ship(2, Team::Red, Vec3::splat(510.0))];
        ai.refresh_spatial(&ships);
        assert_eq!(ai.calculate_separation_force_with_count(&ships, 5), SeparationForce::default());
        ships[0].position = Vec3::splat(f32::NAN);
        assert_eq!(ai.calculate_separation_force_with_count(&ships, 0), SeparationForce::default());
    }

    #[test]
    fn applied_separation_respects_speed() {
        let mut s = ship(1, Team::Red, Vec3::ZERO);
        s.velocity = Vec3::X * s.speed;
        let sep = SeparationForce {
            force: Vec3::new(0.0, 50.0, 0.0),
            neighbor_count: 2,
        };
        apply_separation(&mut s, &sep, &GlobalSettings::default());
        assert!(s.velocity.length() <= s.speed + 1e-3);
        assert!(s.velocity.y > 0.0);
    }
}
