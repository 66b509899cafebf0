//! Per-ship AI state: current intent, timers and the roaming/formation
//! assignment.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ShipId;
use crate::behavior::PersonalityMode;

/// High-level behavior a ship is executing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Freshly spawned, no decision made yet
    #[default]
    Idle,
    /// Close on the target
    Pursue,
    /// Circle the target at preferred range
    Strafe,
    /// Run from threats along the best-scoring heading
    Evade,
    /// Move toward nearby teammates
    Group,
    /// No target; drift under separation only
    Patrol,
    /// Scout visiting exploration zones
    Explore,
    /// Hold around an assigned roaming anchor
    Roam,
    /// Hold an assigned formation slot
    FormationHold,
}

impl Intent {
    /// Intents that apply separation only and can be woken by an alarm.
    #[must_use]
    pub const fn is_idle_like(self) -> bool {
        matches!(self, Self::Idle | Self::Patrol)
    }

    /// Stable snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pursue => "pursue",
            Self::Strafe => "strafe",
            Self::Evade => "evade",
            Self::Group => "group",
            Self::Patrol => "patrol",
            Self::Explore => "explore",
            Self::Roam => "roam",
            Self::FormationHold => "formation_hold",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a formation, unique within one controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormationId(u32);

impl FormationId {
    /// Create a formation id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A ship's place in a formation.
///
/// `position` is the slot's offset from the formation origin. The triple never
/// changes while the ship stays in formation mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationSlot {
    /// Formation the slot belongs to
    pub formation_id: FormationId,
    /// Slot index within the formation (0 = origin)
    pub slot_index: usize,
    /// Offset from the formation origin
    pub position: Vec3,
}

/// Persistent movement assignment. A ship holds at most one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    /// No anchor or slot
    #[default]
    None,
    /// Roaming around a fixed anchor point
    Roaming {
        /// World-space anchor
        anchor: Vec3,
    },
    /// Holding a formation slot
    Formation(FormationSlot),
}

impl Assignment {
    /// Roaming anchor, if roaming.
    #[must_use]
    pub const fn roaming_anchor(&self) -> Option<Vec3> {
        match self {
            Self::Roaming { anchor } => Some(*anchor),
            _ => None,
        }
    }

    /// Formation slot, if in formation.
    #[must_use]
    pub const fn formation(&self) -> Option<&FormationSlot> {
        match self {
            Self::Formation(slot) => Some(slot),
            _ => None,
        }
    }

    /// True when no assignment is held.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// AI bookkeeping owned by a single ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiState {
    /// Intent being executed
    pub current_intent: Intent,
    /// Earliest time the intent may be replaced by a regular reevaluation
    pub intent_end_time: f64,
    /// Time of the last reevaluation (`None` before the first one)
    pub last_intent_reevaluation: Option<f64>,
    /// Preferred engagement distance; `0` means "derive from class and personality"
    pub preferred_range: f32,
    /// Decaying damage accumulator
    pub recent_damage: f32,
    /// Time the last damage was taken
    pub last_damage_time: Option<f64>,
    /// Who dealt the last damage
    pub last_attacker: Option<ShipId>,
    /// Roaming anchor or formation slot
    pub assignment: Assignment,
    /// Replaces the resolved personality mode when set
    pub mode_override: Option<PersonalityMode>,
}

impl AiState {
    /// Fresh state for a newly spawned ship.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_intent: Intent::Idle,
            intent_end_time: 0.0,
            last_intent_reevaluation: None,
            preferred_range: 0.0,
            recent_damage: 0.0,
            last_damage_time: None,
            last_attacker: None,
            assignment: Assignment::None,
            mode_override: None,
        }
    }

    /// Seconds since the last damage, if any was taken.
    #[must_use]
    pub fn time_since_damage(&self, now: f64) -> Option<f64> {
        self.last_damage_time.map(|t| now - t)
    }
}

impl Default for AiState {
    fn default() -> Self {
        Self::new()
    }
}
