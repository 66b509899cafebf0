//! Read-only per-ship diagnostics for tests and telemetry.

use bitflags::bitflags;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::controller::AiController;
use crate::ship::{Intent, Ship, ShipId, Team};

bitflags! {
    /// Boolean facts about a ship's AI state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ShipFlags: u8 {
        /// Current scout of its team
        const SCOUT = 1 << 0;
        /// Holds a roaming anchor
        const ROAMING = 1 << 1;
        /// Holds a formation slot
        const IN_FORMATION = 1 << 2;
        /// Damage accumulator above zero
        const DAMAGED = 1 << 3;
        /// Has a ship target
        const HAS_TARGET = 1 << 4;
    }
}

/// Snapshot of one ship's AI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipDiagnostics {
    /// Ship id
    pub id: ShipId,
    /// Ship team
    pub team: Team,
    /// Current intent
    pub intent: Intent,
    /// Same-team ships within `separation_distance`
    pub neighbor_count: usize,
    /// AI state flags
    pub flags: ShipFlags,
}

impl AiController {
    /// Diagnostics for every ship, in slice order.
    ///
    /// Neighbour counts are recomputed against the current spatial snapshot
    /// in parallel; nothing is mutated.
    #[must_use]
    pub fn diagnostics(&self, ships: &[Ship]) -> Vec<ShipDiagnostics> {
        ships
            .par_iter()
            .enumerate()
            .map(|(index, ship)| {
                let separation = self.calculate_separation_force_with_count(ships, index);
                let ai = &ship.ai_state;

                let mut flags = ShipFlags::empty();
                flags.set(ShipFlags::SCOUT, self.scout_for(ship.team) == Some(ship.id));
                flags.set(ShipFlags::ROAMING, ai.assignment.roaming_anchor().is_some());
                flags.set(ShipFlags::IN_FORMATION, ai.assignment.formation().is_some());
                flags.set(ShipFlags::DAMAGED, ai.recent_damage > 0.0);
                flags.set(ShipFlags::HAS_TARGET, ship.target_id.is_some());

                ShipDiagnostics {
                    id: ship.id,
                    team: ship.team,
                    intent: ai.current_intent,
                    neighbor_count: separation.neighbor_count,
                    flags,
                }
            })
            .collect()
    }

    /// Mean same-team neighbour count across active ships.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_neighbor_count(&self, ships: &[Ship]) -> f32 {
        let active: Vec<_> = self
            .diagnostics(ships)
            .into_iter()
            .zip(ships)
            .filter(|(_, ship)| ship.is_active())
            .map(|(d, _)| d.neighbor_count)
            .collect();
        if active.is_empty() {
            0.0
        } else {
            active.iter().sum::<usize>() as f32 / active.len() as f32
        }
    }
}
