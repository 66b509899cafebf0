//! Stateless steering math.
//!
//! Conventions: Z is up, yaw turns in the XY plane starting at +X, pitch
//! lifts the forward vector toward +Z. Angles are radians.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use armada_grid::Bounds;
use glam::Vec3;

use crate::ship::Orientation;

/// Squared length below which a direction is treated as zero.
const MIN_DIRECTION_SQ: f32 = 1e-12;

/// Unit forward vector for a pitch/yaw pair.
///
/// ```
/// use armada_core::steering::forward_vector;
///
/// let f = forward_vector(0.0, std::f32::consts::FRAC_PI_2);
/// assert!(f.x.abs() < 1e-6 && (f.y - 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn forward_vector(pitch: f32, yaw: f32) -> Vec3 {
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    Vec3::new(cp * cy, cp * sy, sp)
}

/// Orientation that points from `from` toward `to`, with zero roll.
///
/// Returns `None` when the points coincide or either is non-finite; callers
/// keep their current heading in that case.
#[must_use]
pub fn look_at(from: Vec3, to: Vec3) -> Option<Orientation> {
    direction_to_orientation(to - from)
}

/// Orientation whose forward vector is parallel to `dir`.
#[must_use]
pub fn direction_to_orientation(dir: Vec3) -> Option<Orientation> {
    if !dir.is_finite() || dir.length_squared() < MIN_DIRECTION_SQ {
        return None;
    }
    let horizontal = dir.x.hypot(dir.y);
    let yaw = if horizontal > 0.0 { dir.y.atan2(dir.x) } else { 0.0 };
    let pitch = dir.z.atan2(horizontal);
    Some(Orientation::new(pitch, yaw))
}

/// Signed shortest rotation from `from` to `to`, in `(-PI, PI]`.
#[must_use]
pub fn angle_difference(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(TAU);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

/// Wrap an angle into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    angle_difference(0.0, angle)
}

/// Turn `current` toward `desired` by at most `max_step` radians per axis.
///
/// A non-positive or non-finite step snaps straight to `desired`.
#[must_use]
pub fn clamp_turn(current: Orientation, desired: Orientation, max_step: f32) -> Orientation {
    if !(max_step.is_finite() && max_step > 0.0) {
        return desired;
    }
    let dyaw = angle_difference(current.yaw, desired.yaw).clamp(-max_step, max_step);
    let dpitch = (desired.pitch - current.pitch).clamp(-max_step, max_step);
    Orientation {
        pitch: (current.pitch + dpitch).clamp(-FRAC_PI_2, FRAC_PI_2),
        yaw: wrap_angle(current.yaw + dyaw),
        roll: current.roll,
    }
}

/// Unit vector in the XY plane perpendicular to `dir` (rotated +90 degrees).
///
/// Falls back to +Y for directions with no horizontal component.
#[must_use]
pub fn perpendicular(dir: Vec3) -> Vec3 {
    Vec3::new(-dir.y, dir.x, 0.0).try_normalize().unwrap_or(Vec3::Y)
}

/// Angle between two directions in `[0, PI]`. Zero vectors give `PI`.
#[must_use]
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    match (a.try_normalize(), b.try_normalize()) {
        (Some(a), Some(b)) => a.dot(b).clamp(-1.0, 1.0).acos(),
        _ => PI,
    }
}

/// Weights used by [`calculate_escape_score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeParams {
    /// Distance scale of the threat penalty
    pub evade_distance: f32,
    /// Weight of each threat's proximity penalty
    pub threat_weight: f32,
    /// Distance from a face below which the boundary penalty applies
    pub boundary_margin: f32,
    /// Weight of the boundary penalty
    pub boundary_weight: f32,
}

/// Score a candidate escape point; higher is safer.
///
/// Each threat subtracts `threat_weight * evade_distance / d` (with `d`
/// floored at 1). Points closer than `boundary_margin` to an arena face lose
/// up to `boundary_weight`, growing linearly as the face nears and past it
/// once outside the arena.
#[must_use]
pub fn calculate_escape_score(candidate: Vec3, threats: &[Vec3], bounds: &Bounds, params: &EscapeParams) -> f32 {
    let threat_penalty: f32 = threats
        .iter()
        .map(|threat| params.threat_weight * params.evade_distance / candidate.distance(*threat).max(1.0))
        .sum();

    let to_edge = bounds.distance_to_boundary(candidate);
    let boundary_penalty = if params.boundary_margin > 0.0 {
        if to_edge < params.boundary_margin {
            (params.boundary_margin - to_edge) / params.boundary_margin * params.boundary_weight
        } else {
            0.0
        }
    } else if to_edge < 0.0 {
        params.boundary_weight
    } else {
        0.0
    };

    -(threat_penalty + boundary_penalty)
}
