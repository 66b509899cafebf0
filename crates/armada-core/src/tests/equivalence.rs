//! Grid-backed and linear-scan queries must drive identical behaviour.

use glam::Vec3;
use proptest::prelude::*;

use crate::controller::AiController;
use crate::ship::{Ship, ShipClass, Team};

use super::helpers::{arena_center, cluster, controller, mixed_fleet, ship};

/// Positional tolerance between the two query paths.
const TOLERANCE: f32 = 0.01;

/// Two identically seeded controllers, one per query path.
fn paired(seed: u64) -> (AiController, AiController) {
    let grid = controller(seed);
    let mut linear = controller(seed);
    linear.set_spatial_index_enabled(false);
    (grid, linear)
}

fn arb_ship() -> impl Strategy<Value = (Vec3, bool, usize)> {
    (
        (0.0f32..600.0, 0.0f32..600.0, 0.0f32..200.0),
        any::<bool>(),
        0usize..ShipClass::ALL.len(),
    )
        .prop_map(|((x, y, z), blue, class)| (Vec3::new(x, y, z), blue, class))
}

fn build(specs: &[(Vec3, bool, usize)]) -> Vec<Ship> {
    let origin = arena_center() - Vec3::new(300.0, 300.0, 100.0);
    specs
        .iter()
        .enumerate()
        .map(|(i, (offset, blue, class))| {
            let team = if *blue { Team::Blue } else { Team::Red };
            ship(i as u64 + 1, team, ShipClass::ALL[*class], origin + *offset)
        })
        .collect()
}

fn assert_same_positions(a: &[Ship], b: &[Ship]) {
    for (x, y) in a.iter().zip(b) {
        assert_eq!(x.id, y.id);
        assert!(
            x.position.distance(y.position) <= TOLERANCE,
            "ship {} at {} vs {}",
            x.id,
            x.position,
            y.position
        );
        assert_eq!(x.ai_state.current_intent, y.ai_state.current_intent);
    }
}

proptest! {
    #[test]
    fn separation_force_matches_linear_scan(specs in proptest::collection::vec(arb_ship(), 1..40)) {
        let ships = build(&specs);
        let (mut grid, mut linear) = paired(1);
        grid.refresh_spatial(&ships);
        linear.refresh_spatial(&ships);

        for i in 0..ships.len() {
            let a = grid.calculate_separation_force_with_count(&ships, i);
            let b = linear.calculate_separation_force_with_count(&ships, i);
            prop_assert_eq!(a.neighbor_count, b.neighbor_count);
            prop_assert!((a.force - b.force).length() <= TOLERANCE, "{} vs {}", a.force, b.force);
        }
    }

    #[test]
    fn diagnostics_match_linear_scan(specs in proptest::collection::vec(arb_ship(), 1..30)) {
        let ships = build(&specs);
        let (mut grid, mut linear) = paired(2);
        grid.refresh_spatial(&ships);
        linear.refresh_spatial(&ships);
        prop_assert_eq!(grid.diagnostics(&ships), linear.diagnostics(&ships));
    }
}

/// Full ticks agree between the two paths on an engaged battle.
#[test]
fn battle_matches_linear_scan() {
    let (mut grid, mut linear) = paired(77);
    let mut a = mixed_fleet(8);
    let mut b = a.clone();

    for tick in 0..60 {
        let ra = grid.update_all_ships(&mut a, 0.1);
        let rb = linear.update_all_ships(&mut b, 0.1);
        assert_eq!(ra.intent_changes, rb.intent_changes, "tick {tick}");
        assert_eq!(ra.fire_intents.len(), rb.fire_intents.len(), "tick {tick}");
        assert_same_positions(&a, &b);
    }
}

/// A dense cluster spreads identically on both paths.
#[test]
fn cluster_matches_linear_scan() {
    let (mut grid, mut linear) = paired(5);
    let mut a = cluster(10, 1, Team::Red, ShipClass::Fighter, arena_center(), 30.0);
    let mut b = a.clone();

    for _ in 0..50 {
        grid.update_all_ships(&mut a, 0.1);
        linear.update_all_ships(&mut b, 0.1);
        assert_same_positions(&a, &b);
    }
    for s in &a {
        assert_eq!(grid.neighbor_count(s.id), linear.neighbor_count(s.id));
    }
}
