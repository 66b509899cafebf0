//! # Armada Grid
//!
//! Uniform 3D bucket grid for proximity queries in the Armada combat arena.
//!
//! The grid knows nothing about ships, intents or combat. It stores
//! [`SpatialEntity`] projections (id, position, radius, team) in fixed-size
//! cells laid over a [`Bounds`] volume and answers three kinds of queries:
//!
//! - **Radius**: every entity within `r` of a point
//! - **Neighbors**: same-team entities within `r`, optionally excluding one id
//! - **Enemies**: other-team entities within `r`
//!
//! Every query scans only the cells overlapping the query sphere's bounding
//! box and then filters by true squared distance, so results are set-equal to
//! the brute-force scans in [`scan`].
//!
//! ## Quick Start
//!
//! ```
//! use armada_grid::{Bounds, SpatialEntity, SpatialGrid, TeamId};
//! use glam::Vec3;
//!
//! let mut grid = SpatialGrid::new(Bounds::from_size(1000.0, 1000.0, 1000.0), 100.0);
//! grid.insert(SpatialEntity::new(1, Vec3::new(10.0, 10.0, 10.0), 5.0, TeamId::new(0)));
//! grid.insert(SpatialEntity::new(2, Vec3::new(40.0, 10.0, 10.0), 5.0, TeamId::new(1)));
//!
//! let enemies = grid.query_enemies(Vec3::new(10.0, 10.0, 10.0), 50.0, TeamId::new(0));
//! assert_eq!(enemies.len(), 1);
//! assert_eq!(enemies[0].id, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;
pub mod scan;
pub mod stats;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-exports for convenience
pub use grid::SpatialGrid;
pub use stats::GridStats;

/// Errors raised when a grid cannot be built from its configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Cell size must be finite and strictly positive.
    #[error("invalid cell size {0}: must be finite and > 0")]
    InvalidCellSize(f32),
    /// Bounds must be finite with `max >= min` on every axis.
    #[error("degenerate bounds: min {min:?}, max {max:?}")]
    InvalidBounds {
        /// Minimum corner
        min: glam::Vec3,
        /// Maximum corner
        max: glam::Vec3,
    },
}

/// Opaque team tag carried by spatial entities.
///
/// The grid only compares team tags for equality; what a team means is up to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(u8);

impl TeamId {
    /// Create a team tag from its raw value.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw team value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Projection of a simulated object used only for spatial queries.
///
/// The grid stores copies. Ownership of the object itself stays with the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialEntity {
    /// Stable identifier
    pub id: u64,
    /// World position
    pub pos: glam::Vec3,
    /// Body radius (carried for consumers, not used by distance filters)
    pub radius: f32,
    /// Team tag used by neighbor/enemy filters
    pub team: TeamId,
}

impl SpatialEntity {
    /// Create a new spatial entity.
    #[must_use]
    pub const fn new(id: u64, pos: glam::Vec3, radius: f32, team: TeamId) -> Self {
        Self {
            id,
            pos,
            radius,
            team,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: glam::Vec3,
    /// Maximum corner
    pub max: glam::Vec3,
}

impl Bounds {
    /// Create bounds spanning `[0, width] x [0, height] x [0, depth]`.
    #[must_use]
    pub fn from_size(width: f32, height: f32, depth: f32) -> Self {
        Self {
            min: glam::Vec3::ZERO,
            max: glam::Vec3::new(width, height, depth),
        }
    }

    /// Create bounds from min/max corners.
    #[must_use]
    pub fn from_min_max(min: glam::Vec3, max: glam::Vec3) -> Self {
        Self { min, max }
    }

    /// Check that the bounds are finite and not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBounds`] when any corner is non-finite or
    /// `max < min` on some axis.
    pub fn validate(&self) -> Result<(), GridError> {
        let finite = self.min.is_finite() && self.max.is_finite();
        if finite && self.max.cmpge(self.min).all() {
            Ok(())
        } else {
            Err(GridError::InvalidBounds {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> glam::Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the bounds.
    #[must_use]
    pub fn size(&self) -> glam::Vec3 {
        self.max - self.min
    }

    /// Check if a point is inside the bounds.
    #[must_use]
    pub fn contains(&self, point: glam::Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Distance from a point to the nearest face of the bounds.
    ///
    /// Positive inside, zero on a face, negative outside (by how far the point
    /// overshoots the worst axis).
    #[must_use]
    pub fn distance_to_boundary(&self, point: glam::Vec3) -> f32 {
        let to_min = point - self.min;
        let to_max = self.max - point;
        to_min.min(to_max).min_element()
    }

    /// Shrink the bounds by `margin` on every side.
    ///
    /// Axes too small to shrink collapse to their midpoint.
    #[must_use]
    pub fn inset(&self, margin: f32) -> Self {
        let center = self.center();
        let half = (self.size() * 0.5 - glam::Vec3::splat(margin.max(0.0))).max(glam::Vec3::ZERO);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Get the bounds of a child octant (0-7).
    #[must_use]
    pub fn child_bounds(&self, octant: usize) -> Self {
        let center = self.center();
        let min = glam::Vec3::new(
            if octant & 1 == 0 { self.min.x } else { center.x },
            if octant & 2 == 0 { self.min.y } else { center.y },
            if octant & 4 == 0 { self.min.z } else { center.z },
        );
        let max = glam::Vec3::new(
            if octant & 1 == 0 { center.x } else { self.max.x },
            if octant & 2 == 0 { center.y } else { self.max.y },
            if octant & 4 == 0 { center.z } else { self.max.z },
        );
        Self { min, max }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from_size(1000.0, 1000.0, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::from_min_max(Vec3::splat(-5.0), Vec3::splat(5.0));
        assert!(bounds.contains(Vec3::ZERO));
        assert!(bounds.contains(Vec3::new(4.0, 4.0, 4.0)));
        assert!(!bounds.contains(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_from_size_starts_at_origin() {
        let bounds = Bounds::from_size(100.0, 50.0, 20.0);
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.center(), Vec3::new(50.0, 25.0, 10.0));
    }

    #[test]
    fn test_distance_to_boundary() {
        let bounds = Bounds::from_size(100.0, 100.0, 100.0);
        assert_eq!(bounds.distance_to_boundary(Vec3::splat(50.0)), 50.0);
        assert_eq!(bounds.distance_to_boundary(Vec3::new(10.0, 50.0, 50.0)), 10.0);
        assert_eq!(bounds.distance_to_boundary(Vec3::new(-5.0, 50.0, 50.0)), -5.0);
    }

    #[test]
    fn test_child_bounds() {
        let bounds = Bounds::from_min_max(Vec3::splat(-5.0), Vec3::splat(5.0));
        let child = bounds.child_bounds(0);
        assert_eq!(child.min, Vec3::new(-5.0, -5.0, -5.0));
        assert_eq!(child.max, Vec3::new(0.0, 0.0, 0.0));
        let last = bounds.child_bounds(7);
        assert_eq!(last.max, Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_inset_collapses_small_axes() {
        let bounds = Bounds::from_size(100.0, 10.0, 100.0);
        let inset = bounds.inset(20.0);
        assert_eq!(inset.min.x, 20.0);
        assert_eq!(inset.min.y, 5.0);
        assert_eq!(inset.max.y, 5.0);
    }

    #[test]
    fn test_validate_rejects_inverted_and_nan() {
        assert!(Bounds::from_size(1.0, 1.0, 1.0).validate().is_ok());
        let inverted = Bounds::from_min_max(Vec3::ONE, Vec3::ZERO);
        assert!(matches!(inverted.validate(), Err(GridError::InvalidBounds { .. })));
        let nan = Bounds::from_min_max(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 1.0));
        assert!(nan.validate().is_err());
    }
}
