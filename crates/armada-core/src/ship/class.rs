//! Ship classes and their base stats.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hull class. Each class carries a fixed [`ClassStats`] row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipClass {
    /// Light, fast single-turret craft
    Fighter,
    /// Small escort
    Corvette,
    /// Line ship
    Frigate,
    /// Heavy line ship
    Destroyer,
    /// Capital ship
    Carrier,
}

/// Base stats shared by every ship of a class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Cruise speed (units/s)
    pub speed: f32,
    /// Body radius
    pub radius: f32,
    /// Maximum turn rate (rad/s), only enforced when turn limiting is enabled
    pub turn_rate: f32,
    /// Main weapon range, the basis of the preferred engagement range
    pub weapon_range: f32,
    /// Hull points at spawn
    pub max_health: f32,
    /// Shield points at spawn
    pub max_shield: f32,
    /// Flat armor
    pub armor: f32,
    /// Number of turrets mounted at spawn
    pub turret_count: usize,
    /// Seconds between turret shots
    pub fire_cooldown: f32,
    /// Turret projectile speed (units/s)
    pub projectile_speed: f32,
}

const STATS: [ClassStats; 5] = [
    ClassStats {
        speed: 160.0,
        radius: 8.0,
        turn_rate: 3.5,
        weapon_range: 300.0,
        max_health: 60.0,
        max_shield: 20.0,
        armor: 1.0,
        turret_count: 1,
        fire_cooldown: 0.4,
        projectile_speed: 600.0,
    },
    ClassStats {
        speed: 130.0,
        radius: 12.0,
        turn_rate: 2.6,
        weapon_range: 380.0,
        max_health: 120.0,
        max_shield: 40.0,
        armor: 2.0,
        turret_count: 2,
        fire_cooldown: 0.6,
        projectile_speed: 560.0,
    },
    ClassStats {
        speed: 100.0,
        radius: 18.0,
        turn_rate: 1.8,
        weapon_range: 480.0,
        max_health: 240.0,
        max_shield: 80.0,
        armor: 4.0,
        turret_count: 3,
        fire_cooldown: 0.8,
        projectile_speed: 520.0,
    },
    ClassStats {
        speed: 80.0,
        radius: 25.0,
        turn_rate: 1.2,
        weapon_range: 620.0,
        max_health: 420.0,
        max_shield: 140.0,
        armor: 6.0,
        turret_count: 4,
        fire_cooldown: 1.0,
        projectile_speed: 500.0,
    },
    ClassStats {
        speed: 50.0,
        radius: 40.0,
        turn_rate: 0.7,
        weapon_range: 800.0,
        max_health: 900.0,
        max_shield: 300.0,
        armor: 10.0,
        turret_count: 4,
        fire_cooldown: 1.2,
        projectile_speed: 480.0,
    },
];

impl ShipClass {
    /// All classes, smallest first.
    pub const ALL: [Self; 5] = [
        Self::Fighter,
        Self::Corvette,
        Self::Frigate,
        Self::Destroyer,
        Self::Carrier,
    ];

    /// Dense index (0-4), smallest first.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Fighter => 0,
            Self::Corvette => 1,
            Self::Frigate => 2,
            Self::Destroyer => 3,
            Self::Carrier => 4,
        }
    }

    /// Base stats for this class.
    #[must_use]
    pub const fn stats(self) -> &'static ClassStats {
        &STATS[self.index()]
    }
}

impl fmt::Display for ShipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fighter => write!(f, "fighter"),
            Self::Corvette => write!(f, "corvette"),
            Self::Frigate => write!(f, "frigate"),
            Self::Destroyer => write!(f, "destroyer"),
            Self::Carrier => write!(f, "carrier"),
        }
    }
}
