//! Per-tick results handed back to the orchestration layer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ship::{Intent, ShipId};

/// A turret decided to fire this tick. Projectile spawning is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireIntent {
    /// Ship carrying the turret
    pub shooter: ShipId,
    /// Index into the shooter's turret list
    pub turret: usize,
    /// Ship being shot at
    pub target: ShipId,
    /// Predicted intercept point
    pub aim_point: Vec3,
    /// Unit firing direction
    pub direction: Vec3,
}

/// An intent transition made during reevaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentChange {
    /// Ship that changed intent
    pub ship: ShipId,
    /// Previous intent
    pub from: Intent,
    /// New intent
    pub to: Intent,
}

/// Summary of one `update_all_ships` call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number this report belongs to (0-based)
    pub tick: u64,
    /// Simulation time at the start of the tick
    pub time: f64,
    /// Shots requested by turrets, in ship then turret order
    pub fire_intents: Vec<FireIntent>,
    /// Intent transitions, in ship order
    pub intent_changes: Vec<IntentChange>,
    /// Ships skipped for non-finite data
    pub skipped_ships: Vec<ShipId>,
}

impl TickReport {
    /// True when the tick ran but nothing fired or changed intent.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.fire_intents.is_empty() && self.intent_changes.is_empty()
    }
}
