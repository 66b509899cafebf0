//! Fleet builders and measurement utilities shared by the scenario tests.

use glam::Vec3;

use crate::behavior::BehaviorConfig;
use crate::bounds::SimulationBounds;
use crate::controller::AiController;
use crate::ship::{Ship, ShipClass, ShipId, Team};

/// Golden angle, for spreading ships evenly on a disc.
const GOLDEN_ANGLE: f32 = 2.399_963;

// =============================================================================
// Setup
// =============================================================================

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Controller over the default arena with the default behavior config.
pub fn controller(seed: u64) -> AiController {
    AiController::new(SimulationBounds::default(), &BehaviorConfig::default(), seed)
}

/// Controller with a custom config over the default arena.
pub fn controller_with(config: &BehaviorConfig, seed: u64) -> AiController {
    AiController::new(SimulationBounds::default(), config, seed)
}

/// Centre of the default arena.
pub fn arena_center() -> Vec3 {
    SimulationBounds::default().bounds.center()
}

/// A ship with class defaults.
pub fn ship(id: u64, team: Team, class: ShipClass, position: Vec3) -> Ship {
    Ship::new(ShipId::new(id), team, class, position)
}

/// `count` ships spread over a disc of `radius` around `center`, with a
/// small vertical stagger. Ids start at `first_id`.
#[allow(clippy::cast_precision_loss)]
pub fn cluster(count: usize, first_id: u64, team: Team, class: ShipClass, center: Vec3, radius: f32) -> Vec<Ship> {
    (0..count)
        .map(|i| {
            let t = i as f32;
            let r = radius * ((t + 0.5) / count as f32).sqrt();
            let angle = t * GOLDEN_ANGLE;
            let offset = Vec3::new(r * angle.cos(), r * angle.sin(), (t - count as f32 / 2.0) * 0.5);
            ship(first_id + i as u64, team, class, center + offset)
        })
        .collect()
}

/// Two opposing fleets of mixed classes, `per_team` ships each.
#[allow(clippy::cast_precision_loss)]
pub fn mixed_fleet(per_team: usize) -> Vec<Ship> {
    let center = arena_center();
    let mut ships = Vec::with_capacity(per_team * 2);
    for (side, team) in Team::ALL.into_iter().enumerate() {
        let x = if side == 0 { -500.0 } else { 500.0 };
        for i in 0..per_team {
            let class = ShipClass::ALL[i % ShipClass::ALL.len()];
            let position = center + Vec3::new(x, (i as f32 - per_team as f32 / 2.0) * 90.0, (i % 3) as f32 * 40.0);
            ships.push(ship((side * per_team + i + 1) as u64, team, class, position));
        }
    }
    ships
}

// =============================================================================
// Running and measuring
// =============================================================================

/// Run `ticks` ticks of `dt`.
pub fn run(ai: &mut AiController, ships: &mut [Ship], ticks: usize, dt: f32) {
    for _ in 0..ticks {
        ai.update_all_ships(ships, dt);
    }
}

/// Ordered same-team pairs of live ships closer than `distance`.
pub fn close_pairs(ships: &[Ship], distance: f32) -> usize {
    let mut count = 0;
    for a in ships.iter().filter(|s| s.is_active()) {
        for b in ships.iter().filter(|s| s.is_active()) {
            if a.id != b.id && a.team == b.team && a.position.distance(b.position) < distance {
                count += 1;
            }
        }
    }
    count
}

// =============================================================================
// Helper Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_stays_within_radius() {
        let center = arena_center();
        let ships = cluster(10, 1, Team::Red, ShipClass::Fighter, center, 30.0);
        assert_eq!(ships.len(), 10);
        for s in &ships {
            assert!(s.position.distance(center) <= 31.0);
        }
    }

    #[test]
    fn mixed_fleet_has_unique_ids() {
        let ships = mixed_fleet(6);
        let mut ids: Vec<_> = ships.iter().map(|s| s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }
}
