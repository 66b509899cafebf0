//! Ship data model.
//!
//! This module provides the types the controller reads and writes every tick:
//! - [`ShipId`]: Stable identifier for a ship
//! - [`Team`]: One of the two sides
//! - [`ShipClass`]: Hull class with base stats
//! - [`Orientation`]: Pitch, yaw and roll
//! - [`Ship`]: The complete ship record
//!
//! Ships are created by an external spawner and removed by an external death
//! step. The controller only keeps ids, never references, so ships may vanish
//! between ticks.
//!
//! # Example
//!
//! ```
//! use armada_core::ship::{Ship, ShipClass, ShipId, Team};
//! use glam::Vec3;
//!
//! let ship = Ship::new(ShipId::new(42), Team::Red, ShipClass::Frigate, Vec3::ZERO);
//!
//! assert_eq!(ship.id.as_u64(), 42);
//! assert_eq!(ship.turrets.len(), ShipClass::Frigate.stats().turret_count);
//! assert_eq!(ship.dir(), ship.orientation.yaw);
//! ```

mod ai_state;
mod class;

use armada_grid::{SpatialEntity, TeamId};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use ai_state::{AiState, Assignment, FormationId, FormationSlot, Intent};
pub use class::{ClassStats, ShipClass};

use crate::steering;

/// Unique identifier for a ship.
///
/// IDs are stable for the whole session and ordered by numeric value, which
/// the controller uses for every deterministic tie-break.
///
/// ```
/// use armada_core::ship::ShipId;
///
/// let id1 = ShipId::new(1);
/// let id2 = ShipId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShipId(u64);

impl ShipId {
    /// Creates a new `ShipId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShipId({})", self.0)
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ShipId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ShipId> for u64 {
    fn from(id: ShipId) -> Self {
        id.0
    }
}

/// One of the two sides in a battle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// First side
    Red,
    /// Second side
    Blue,
}

impl Team {
    /// Both teams in index order.
    pub const ALL: [Self; 2] = [Self::Red, Self::Blue];

    /// Dense index (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
        }
    }

    /// Tag used in the spatial grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn tag(self) -> TeamId {
        TeamId::new(self.index() as u8)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// Heading in radians. Yaw turns in the XY plane, pitch lifts toward +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Elevation above the XY plane
    pub pitch: f32,
    /// Heading within the XY plane (0 = +X)
    pub yaw: f32,
    /// Bank around the forward axis
    pub roll: f32,
}

impl Orientation {
    /// Orientation from pitch and yaw with zero roll.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32) -> Self {
        Self {
            pitch,
            yaw,
            roll: 0.0,
        }
    }

    /// Unit forward vector.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        steering::forward_vector(self.pitch, self.yaw)
    }
}

/// A turret mount, targeting independently of its ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    /// Closest range the turret will engage at
    pub min_range: f32,
    /// Maximum engagement range
    pub max_range: f32,
    /// Seconds between shots
    pub cooldown: f32,
    /// Seconds until the next shot is allowed
    pub cooldown_remaining: f32,
    /// Projectile speed used for lead prediction
    pub projectile_speed: f32,
    /// Current aim
    pub aim: Orientation,
    /// Ship the turret is tracking
    pub target_id: Option<ShipId>,
}

impl Turret {
    /// A turret with the given range band and fire rate.
    #[must_use]
    pub fn new(min_range: f32, max_range: f32, cooldown: f32, projectile_speed: f32) -> Self {
        Self {
            min_range,
            max_range,
            cooldown,
            cooldown_remaining: 0.0,
            projectile_speed,
            aim: Orientation::default(),
            target_id: None,
        }
    }

    /// True when `distance` lies inside the turret's range band.
    #[must_use]
    pub fn in_range(&self, distance: f32) -> bool {
        distance >= self.min_range && distance <= self.max_range
    }
}

/// A combat agent.
///
/// The legacy yaw alias [`Ship::dir`] is derived from `orientation`, so it
/// always equals `orientation.yaw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    /// Stable identifier
    pub id: ShipId,
    /// Owning side
    pub team: Team,
    /// Hull class
    pub class: ShipClass,
    /// World position
    pub position: Vec3,
    /// Velocity (units/s)
    pub velocity: Vec3,
    /// Heading
    pub orientation: Orientation,
    /// Hull points; the ship is dead at or below zero
    pub health: f32,
    /// Shield points
    pub shield: f32,
    /// Flat armor
    pub armor: f32,
    /// Cruise speed
    pub speed: f32,
    /// Maximum turn rate (rad/s)
    pub turn_rate: f32,
    /// Body radius
    pub radius: f32,
    /// Turret mounts
    pub turrets: Vec<Turret>,
    /// Current target
    pub target_id: Option<ShipId>,
    /// AI bookkeeping
    pub ai_state: AiState,
}

impl Ship {
    /// Spawn a ship with its class's base stats and turrets.
    #[must_use]
    pub fn new(id: ShipId, team: Team, class: ShipClass, position: Vec3) -> Self {
        let stats = class.stats();
        let turret_min = stats.radius * 2.0;
        let turrets = (0..stats.turret_count)
            .map(|_| Turret::new(turret_min, stats.weapon_range, stats.fire_cooldown, stats.projectile_speed))
            .collect();
        Self {
            id,
            team,
            class,
            position,
            velocity: Vec3::ZERO,
            orientation: Orientation::default(),
            health: stats.max_health,
            shield: stats.max_shield,
            armor: stats.armor,
            speed: stats.speed,
            turn_rate: stats.turn_rate,
            radius: stats.radius,
            turrets,
            target_id: None,
            ai_state: AiState::new(),
        }
    }

    /// Legacy scalar heading, always equal to `orientation.yaw`.
    #[must_use]
    pub const fn dir(&self) -> f32 {
        self.orientation.yaw
    }

    /// True while hull points remain.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Alive with finite position and velocity; only active ships are simulated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_alive() && self.position.is_finite() && self.velocity.is_finite()
    }

    /// Projection used by the spatial grid.
    #[must_use]
    pub fn spatial_entity(&self) -> SpatialEntity {
        SpatialEntity::new(self.id.as_u64(), self.position, self.radius, self.team.tag())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod ship_id_tests {
        use super::*;

        #[test]
        fn ordering() {
            let mut ids = vec![ShipId::new(3), ShipId::new(1), ShipId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![ShipId::new(1), ShipId::new(2), ShipId::new(3)]);
        }

        #[test]
        fn debug_and_display_format() {
            let id = ShipId::new(42);
            assert_eq!(format!("{id:?}"), "ShipId(42)");
            assert_eq!(format!("{id}"), "42");
        }

        #[test]
        fn conversions() {
            let id: ShipId = 7u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 7);
        }
    }

    mod team_tests {
        use super::*;

        #[test]
        fn tags_are_distinct() {
            assert_ne!(Team::Red.tag(), Team::Blue.tag());
            assert_eq!(Team::Blue.tag().raw(), 1);
        }
    }

    mod ship_tests {
        use super::*;

        #[test]
        fn new_applies_class_stats() {
            let ship = Ship::new(ShipId::new(1), Team::Blue, ShipClass::Destroyer, Vec3::ONE);
            let stats = ShipClass::Destroyer.stats();
            assert_eq!(ship.speed, stats.speed);
            assert_eq!(ship.health, stats.max_health);
            assert_eq!(ship.turrets.len(), stats.turret_count);
            assert_eq!(ship.ai_state.current_intent, Intent::Idle);
        }

        #[test]
        fn dir_tracks_yaw() {
            let mut ship = Ship::new(ShipId::new(1), Team::Red, ShipClass::Fighter, Vec3::ZERO);
            ship.orientation = Orientation::new(0.2, 1.25);
            assert_eq!(ship.dir(), 1.25);
        }

        #[test]
        fn activity_checks() {
            let mut ship = Ship::new(ShipId::new(1), Team::Red, ShipClass::Fighter, Vec3::ZERO);
            assert!(ship.is_active());
            ship.position.x = f32::NAN;
            assert!(ship.is_alive());
            assert!(!ship.is_active());
            ship.position.x = 0.0;
            ship.health = 0.0;
            assert!(!ship.is_active());
        }

        #[test]
        fn spatial_entity_projection() {
            let ship = Ship::new(ShipId::new(9), Team::Blue, ShipClass::Corvette, Vec3::new(1.0, 2.0, 3.0));
            let entity = ship.spatial_entity();
            assert_eq!(entity.id, 9);
            assert_eq!(entity.pos, Vec3::new(1.0, 2.0, 3.0));
            assert_eq!(entity.team, Team::Blue.tag());
        }

        #[test]
        fn turret_range_band() {
            let turret = Turret::new(20.0, 300.0, 0.5, 600.0);
            assert!(!turret.in_range(10.0));
            assert!(turret.in_range(20.0));
            assert!(turret.in_range(300.0));
            assert!(!turret.in_range(301.0));
        }

        #[test]
        fn serialization_roundtrip() {
            let ship = Ship::new(ShipId::new(5), Team::Red, ShipClass::Carrier, Vec3::new(10.0, 0.0, -4.0));
            let json = serde_json::to_string(&ship).unwrap();
            let back: Ship = serde_json::from_str(&json).unwrap();
            assert_eq!(ship, back);
        }
    }
}
