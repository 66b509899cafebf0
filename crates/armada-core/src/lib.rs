//! # Armada Core
//!
//! Steering and decision engine for ship-vs-ship battles in a bounded 3D
//! arena.
//!
//! Every tick the [`AiController`] decides what each ship wants to do (its
//! [`Intent`](ship::Intent)), steers toward that goal with same-team
//! separation, and hands the ship's turrets to a [`TurretAi`](turret::TurretAi)
//! collaborator. Spawning, hit resolution and death are left to the caller.
//!
//! ## Architecture
//!
//! - **Ships**: plain records owned by the caller ([`ship`])
//! - **Behavior**: per-class personalities, team modifiers and global
//!   tunables loaded from JSON ([`behavior`])
//! - **Controller**: the per-tick pipeline and team coordination
//!   ([`controller`])
//! - **Spatial index**: a uniform 3D grid ([`armada_grid`])
//!
//! Given the same seed, config and inputs, two controllers produce
//! bit-identical ship state; [`hash_ships`] checks this cheaply.
//!
//! ## Usage
//!
//! ```
//! use armada_core::behavior::BehaviorConfig;
//! use armada_core::ship::{Ship, ShipClass, ShipId, Team};
//! use armada_core::{AiController, SimulationBounds};
//! use glam::Vec3;
//!
//! let config = BehaviorConfig::from_json_str(r#"{ "global": { "separation_distance": 80.0 } }"#).unwrap();
//! let mut ai = AiController::new(SimulationBounds::new(2000.0, 2000.0, 600.0), &config, 42);
//!
//! let mut ships = vec![
//!     Ship::new(ShipId::new(1), Team::Red, ShipClass::Fighter, Vec3::new(400.0, 400.0, 300.0)),
//!     Ship::new(ShipId::new(2), Team::Blue, ShipClass::Destroyer, Vec3::new(1200.0, 400.0, 300.0)),
//! ];
//! for _ in 0..10 {
//!     ai.update_all_ships(&mut ships, 0.1);
//! }
//! assert_eq!(ai.tick(), 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export the grid for spatial queries
pub use armada_grid;

pub mod behavior;
pub mod bounds;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod hash;
pub mod output;
pub mod rng;
pub mod ship;
pub mod steering;
pub mod turret;

pub use bounds::{EdgePolicy, SimulationBounds};
pub use controller::AiController;
pub use diagnostics::{ShipDiagnostics, ShipFlags};
pub use error::ConfigError;
pub use hash::hash_ships;
pub use output::{FireIntent, IntentChange, TickReport};
pub use rng::SimRng;

#[cfg(test)]
mod tests;
