//! Simulation arena bounds and per-axis edge policy.

use armada_grid::Bounds;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What the physics step does when a ship crosses a face of the arena.
///
/// The controller never applies this itself; it only reads the bounds when
/// scoring escape routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Reappear on the opposite face
    Wrap,
    /// Reflect velocity
    #[default]
    Bounce,
    /// Remove the ship
    Remove,
}

/// Arena volume plus the X, Y and Z edge policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationBounds {
    /// Arena volume
    pub bounds: Bounds,
    /// Edge policy per axis (x, y, z)
    pub edges: [EdgePolicy; 3],
}

impl SimulationBounds {
    /// An arena spanning `[0, width] x [0, height] x [0, depth]` that bounces
    /// on every axis.
    #[must_use]
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            bounds: Bounds::from_size(width, height, depth),
            edges: [EdgePolicy::Bounce; 3],
        }
    }

    /// Replace the edge policies.
    #[must_use]
    pub const fn with_edges(mut self, edges: [EdgePolicy; 3]) -> Self {
        self.edges = edges;
        self
    }

    /// Exploration zones visited by scouts: the centres of the eight octants
    /// of the arena inset by `margin`, in octant order.
    #[must_use]
    pub fn exploration_zones(&self, margin: f32) -> [Vec3; 8] {
        let inner = self.bounds.inset(margin);
        std::array::from_fn(|octant| inner.child_bounds(octant).center())
    }
}

impl Default for SimulationBounds {
    fn default() -> Self {
        Self::new(4000.0, 4000.0, 1000.0)
    }
}
