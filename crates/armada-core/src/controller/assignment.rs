//! Persistent movement assignments: roaming anchors and formation slots.

use armada_grid::Bounds;
use glam::Vec3;
use tracing::debug;

use crate::rng::SimRng;
use crate::ship::{Assignment, Ship};

use super::AiController;

/// Upper bound on lattice points per axis for the fallback anchor search.
const MAX_LATTICE_STEPS: usize = 16;

impl AiController {
    /// Give ship `i` a roaming anchor unless it already has one.
    ///
    /// Entering roaming releases any formation slot the ship held.
    pub(super) fn ensure_roaming_anchor(&mut self, ships: &mut [Ship], i: usize) {
        if ships[i].ai_state.assignment.roaming_anchor().is_some() {
            return;
        }
        if let Assignment::Formation(slot) = ships[i].ai_state.assignment {
            self.registry.release_slot(ships[i].id, &slot);
        }

        let team = ships[i].team;
        let others: Vec<Vec3> = ships
            .iter()
            .enumerate()
            .filter(|(j, s)| *j != i && s.team == team && s.is_alive())
            .filter_map(|(_, s)| s.ai_state.assignment.roaming_anchor())
            .collect();

        let settings = self.behavior.settings();
        let area = self.bounds.bounds.inset(settings.boundary_safety_margin);
        let anchor = place_roaming_anchor(
            &mut self.rng,
            &area,
            &others,
            settings.roaming_anchor_min_separation,
            settings.roaming_anchor_attempts,
        );

        debug!(ship = %ships[i].id, ?anchor, "roaming anchor assigned");
        ships[i].ai_state.assignment = Assignment::Roaming { anchor };
    }

    /// Give ship `i` a formation slot unless it still holds one.
    ///
    /// A held slot is never reassigned, so `(formation_id, slot_index,
    /// position)` stays fixed while the ship remains in formation mode.
    pub(super) fn ensure_formation_slot(&mut self, ships: &mut [Ship], i: usize) {
        let ship = &mut ships[i];
        if let Some(slot) = ship.ai_state.assignment.formation() {
            if self.registry.holds_slot(ship.id, slot) {
                return;
            }
        }

        let settings = self.behavior.settings();
        let slot = self.registry.assign_slot(
            ship.team,
            ship.id,
            settings.formation_max_size,
            settings.formation_spacing,
        );
        debug!(
            ship = %ship.id,
            formation = slot.formation_id.raw(),
            slot = slot.slot_index,
            "formation slot assigned"
        );
        ship.ai_state.assignment = Assignment::Formation(slot);
    }
}

/// Smallest distance from `point` to any of `others` (infinite if none).
fn clearance(point: Vec3, others: &[Vec3]) -> f32 {
    others
        .iter()
        .map(|other| point.distance(*other))
        .fold(f32::INFINITY, f32::min)
}

/// Choose an anchor inside `area` at least `min_separation` from `others`.
///
/// Up to `attempts` uniform random points are tried first. If none is clear,
/// a bounded lattice over `area` is searched and the point with the most
/// clearance wins, so the result is always inside `area`.
pub(super) fn place_roaming_anchor(
    rng: &mut SimRng,
    area: &Bounds,
    others: &[Vec3],
    min_separation: f32,
    attempts: usize,
) -> Vec3 {
    let mut best = area.center();
    let mut best_clearance = clearance(best, others);

    for _ in 0..attempts {
        let candidate = Vec3::new(
            rng.range(area.min.x, area.max.x),
            rng.range(area.min.y, area.max.y),
            rng.range(area.min.z, area.max.z),
        );
        let c = clearance(candidate, others);
        if c >= min_separation {
            return candidate;
        }
        if c > best_clearance {
            best = candidate;
            best_clearance = c;
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = |extent: f32| {
        let spacing = (min_separation * 0.5).max(1.0);
        ((extent / spacing).ceil() as usize).clamp(1, MAX_LATTICE_STEPS)
    };
    let size = area.size();
    let (nx, ny, nz) = (steps(size.x), steps(size.y), steps(size.z));
    #[allow(clippy::cast_precision_loss)]
    let at = |i: usize, n: usize| (i as f32 + 0.5) / n as f32;
    for ix in 0..nx {
        for iy in 0..ny {
            for iz in 0..nz {
                let candidate = area.min + size * Vec3::new(at(ix, nx), at(iy, ny), at(iz, nz));
                let c = clearance(candidate, others);
                if c > best_clearance {
                    best = candidate;
                    best_clearance = c;
                }
            }
        }
    }
    best
}
