//! Brute-force linear scans.
//!
//! These are the O(n) reference versions of the grid queries. They apply the
//! exact same distance and team filters as [`SpatialGrid`](crate::SpatialGrid),
//! so for any entity set both return the same entities (order aside).

use glam::Vec3;

use crate::{SpatialEntity, TeamId};

fn within(entity: &SpatialEntity, center: Vec3, radius: f32) -> bool {
    center.is_finite() && radius >= 0.0 && entity.pos.distance_squared(center) <= radius * radius
}

/// Every entity within `radius` of `center`.
#[must_use]
pub fn radius(entities: &[SpatialEntity], center: Vec3, radius: f32) -> Vec<SpatialEntity> {
    entities
        .iter()
        .filter(|e| within(e, center, radius))
        .copied()
        .collect()
}

/// Same-team entities within `radius`, optionally excluding one id.
#[must_use]
pub fn neighbors(
    entities: &[SpatialEntity],
    center: Vec3,
    radius: f32,
    team: TeamId,
    exclude: Option<u64>,
) -> Vec<SpatialEntity> {
    entities
        .iter()
        .filter(|e| e.team == team && Some(e.id) != exclude && within(e, center, radius))
        .copied()
        .collect()
}

/// Other-team entities within `radius`.
#[must_use]
pub fn enemies(entities: &[SpatialEntity], center: Vec3, radius: f32, team: TeamId) -> Vec<SpatialEntity> {
    entities
        .iter()
        .filter(|e| e.team != team && within(e, center, radius))
        .copied()
        .collect()
}
