//! Turret targeting collaborator.
//!
//! The controller hands every ship's turrets to a [`TurretAi`] once per tick,
//! after movement. Turrets pick targets independently of the ship's own
//! `target_id`.

use glam::Vec3;

use crate::output::FireIntent;
use crate::ship::{Ship, ShipId, Turret};
use crate::steering;

/// An enemy visible to a ship's turrets this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetTrack {
    /// Enemy id
    pub id: ShipId,
    /// Enemy position
    pub position: Vec3,
    /// Enemy velocity, for lead prediction
    pub velocity: Vec3,
}

/// Turret aiming and firing policy.
pub trait TurretAi: Send + Sync {
    /// Advance every turret on `ship` by `dt` and return the shots fired.
    fn update(&mut self, ship: &mut Ship, targets: &[TargetTrack], dt: f32) -> Vec<FireIntent>;
}

/// Default turret policy.
///
/// A turret keeps its target while it stays in range and within
/// `reevaluate_angle` of the current aim; otherwise it switches to the
/// in-range enemy needing the smallest turn (closest, then lowest id, on
/// ties). Shots lead the target assuming constant velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicTurretAi {
    /// Aim deviation (radians) beyond which a turret looks for a new target
    pub reevaluate_angle: f32,
    /// Iterations of the intercept-time refinement
    pub lead_iterations: usize,
}

impl BasicTurretAi {
    /// Policy with the given reevaluation angle.
    #[must_use]
    pub const fn new(reevaluate_angle: f32) -> Self {
        Self {
            reevaluate_angle,
            lead_iterations: 2,
        }
    }

    fn lead_point(&self, shooter: Vec3, target: &TargetTrack, projectile_speed: f32) -> Vec3 {
        if !(projectile_speed > 0.0) {
            return target.position;
        }
        let mut point = target.position;
        for _ in 0..self.lead_iterations {
            let t = shooter.distance(point) / projectile_speed;
            point = target.position + target.velocity * t;
        }
        if point.is_finite() {
            point
        } else {
            target.position
        }
    }

    fn keeps_target(&self, turret: &Turret, shooter: Vec3, track: &TargetTrack) -> bool {
        turret.in_range(shooter.distance(track.position))
            && steering::angle_between(turret.aim.forward(), track.position - shooter) <= self.reevaluate_angle
    }

    fn pick_target<'a>(turret: &Turret, shooter: Vec3, targets: &'a [TargetTrack]) -> Option<&'a TargetTrack> {
        let aim = turret.aim.forward();
        targets
            .iter()
            .filter(|t| turret.in_range(shooter.distance(t.position)))
            .map(|t| {
                let angle = steering::angle_between(aim, t.position - shooter);
                (angle, shooter.distance_squared(t.position), t)
            })
            .min_by(|a, b| {
                a.0.total_cmp(&b.0)
                    .then_with(|| a.1.total_cmp(&b.1))
                    .then_with(|| a.2.id.cmp(&b.2.id))
            })
            .map(|(_, _, t)| t)
    }
}

impl Default for BasicTurretAi {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl TurretAi for BasicTurretAi {
    fn update(&mut self, ship: &mut Ship, targets: &[TargetTrack], dt: f32) -> Vec<FireIntent> {
        let shooter = ship.position;
        let mut shots = Vec::new();

        for (index, turret) in ship.turrets.iter_mut().enumerate() {
            turret.cooldown_remaining = (turret.cooldown_remaining - dt).max(0.0);

            let current = turret
                .target_id
                .and_then(|id| targets.iter().find(|t| t.id == id))
                .filter(|t| self.keeps_target(turret, shooter, t));
            let Some(track) = current.or_else(|| Self::pick_target(turret, shooter, targets)) else {
                turret.target_id = None;
                continue;
            };
            turret.target_id = Some(track.id);

            let aim_point = self.lead_point(shooter, track, turret.projectile_speed);
            let Some(aim) = steering::look_at(shooter, aim_point) else {
                continue;
            };
            turret.aim = aim;

            if turret.cooldown_remaining <= 0.0 {
                turret.cooldown_remaining = turret.cooldown;
                shots.push(FireIntent {
                    shooter: ship.id,
                    turret: index,
                    target: track.id,
                    aim_point,
                    direction: aim.forward(),
                });
            }
        }
        shots
    }
}
