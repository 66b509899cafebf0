//! Intent execution: movement goals, steering and turret fire.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

use crate::behavior::GlobalSettings;
use crate::output::TickReport;
use crate::ship::{Intent, Orientation, Ship};
use crate::steering::{self, EscapeParams};
use crate::turret::TargetTrack;

use super::separation::apply_separation;
use super::AiController;

/// Where an intent wants the ship to go this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Goal {
    /// Steer toward a point
    Point(Vec3),
    /// No directed target; separation only
    Drift,
    /// The intent lost what it needed; end it and drift
    Expire,
}

/// Steer `ship` toward `target`.
///
/// Within `movement_close_enough_threshold` the ship holds its heading and
/// its velocity decays at `stop_decay_rate`. Otherwise the heading turns to
/// face the target (instantly, or limited by `turn_rate * dt` when
/// `enable_turn_rate_limit` is set) and velocity points along the new heading
/// at cruise speed. `dir()` reads the same yaw, so it stays in sync.
///
/// ```
/// use armada_core::behavior::GlobalSettings;
/// use armada_core::controller::move_towards;
/// use armada_core::ship::{Ship, ShipClass, ShipId, Team};
/// use glam::Vec3;
///
/// let mut ship = Ship::new(ShipId::new(1), Team::Red, ShipClass::Fighter, Vec3::ZERO);
/// move_towards(&mut ship, Vec3::new(0.0, 500.0, 0.0), 0.1, &GlobalSettings::default());
/// assert!((ship.orientation.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
/// assert_eq!(ship.dir(), ship.orientation.yaw);
/// assert!((ship.velocity.length() - ship.speed).abs() < 1e-3);
/// ```
pub fn move_towards(ship: &mut Ship, target: Vec3, dt: f32, settings: &GlobalSettings) {
    let distance = ship.position.distance(target);
    if !distance.is_finite() {
        return;
    }
    if distance <= settings.movement_close_enough_threshold {
        ship.velocity *= (-settings.stop_decay_rate * dt).exp();
        return;
    }
    let Some(desired) = steering::look_at(ship.position, target) else {
        return;
    };
    ship.orientation = if settings.enable_turn_rate_limit {
        steering::clamp_turn(ship.orientation, desired, ship.turn_rate * dt)
    } else {
        desired
    };
    ship.velocity = ship.orientation.forward() * ship.speed;
}

/// Let the ship coast: velocity decays, heading follows what remains.
fn drift(ship: &mut Ship, dt: f32, settings: &GlobalSettings) {
    ship.velocity *= (-settings.stop_decay_rate * dt).exp();
}

impl AiController {
    /// Run ship `i`'s current intent for one tick and integrate its position.
    pub(super) fn execute(&mut self, ships: &mut [Ship], i: usize, dt: f32, now: f64) {
        let goal = self.intent_goal(ships, i, now);
        let separation = self.calculate_separation_force_with_count(ships, i);
        self.neighbor_counts.insert(ships[i].id, separation.neighbor_count);

        let settings = self.behavior.settings();
        let ship = &mut ships[i];
        match goal {
            Goal::Point(point) => move_towards(ship, point, dt, settings),
            Goal::Drift => drift(ship, dt, settings),
            Goal::Expire => {
                ship.ai_state.intent_end_time = now;
                drift(ship, dt, settings);
            }
        }

        apply_separation(ship, &separation, settings);
        if !matches!(goal, Goal::Point(_)) {
            // Heading follows the drift so ships face where they move.
            if let Some(heading) = steering::direction_to_orientation(ship.velocity) {
                ship.orientation = Orientation {
                    roll: ship.orientation.roll,
                    ..heading
                };
            }
        }

        let next = ship.position + ship.velocity * dt;
        if next.is_finite() {
            ship.position = next;
        } else {
            // Hold position rather than poison the next snapshot.
            ship.velocity = Vec3::ZERO;
        }
    }

    /// Movement goal of ship `i`'s current intent.
    fn intent_goal(&mut self, ships: &[Ship], i: usize, now: f64) -> Goal {
        let ship = &ships[i];
        let target = ship.target_id.and_then(|id| self.live(ships, id));
        match ship.ai_state.current_intent {
            Intent::Idle | Intent::Patrol => Goal::Drift,
            Intent::Pursue => target.map_or(Goal::Expire, |t| Goal::Point(t.position)),
            Intent::Strafe => target.map_or(Goal::Expire, |t| Goal::Point(self.orbit_point(ship, t.position))),
            Intent::Evade => self.evade_point(ships, ship, target).map_or(Goal::Expire, Goal::Point),
            Intent::Group => {
                let radius = self.behavior.settings().group_radius;
                let mut mates = self.neighbors(ship.position, radius, ship.team, ship.id);
                if mates.is_empty() {
                    return Goal::Expire;
                }
                mates.sort_unstable_by_key(|m| m.id);
                #[allow(clippy::cast_precision_loss)]
                let centroid = mates.iter().map(|m| m.pos).sum::<Vec3>() / mates.len() as f32;
                Goal::Point(centroid)
            }
            Intent::Explore => {
                if self.registry.scout(ship.team) != Some(ship.id) {
                    return Goal::Expire;
                }
                let settings = self.behavior.settings();
                let zones = self.bounds.exploration_zones(settings.boundary_safety_margin);
                self.registry
                    .exploration_zone(ship.team, now, settings.exploration_zone_duration, &zones)
                    .map_or(Goal::Expire, Goal::Point)
            }
            Intent::Roam => ship
                .ai_state
                .assignment
                .roaming_anchor()
                .map_or(Goal::Expire, Goal::Point),
            Intent::FormationHold => self.formation_goal(ships, ship),
        }
    }

    /// Point on the circle of radius `preferred_range` around `target`, 45
    /// degrees ahead of the ship. Even ids circle counter-clockwise, odd ids
    /// clockwise.
    fn orbit_point(&self, ship: &Ship, target: Vec3) -> Vec3 {
        let away = (ship.position - target)
            .try_normalize()
            .unwrap_or_else(|| steering::perpendicular(ship.orientation.forward()));
        let sign = if ship.id.as_u64() % 2 == 0 { 1.0 } else { -1.0 };
        let tangent = steering::perpendicular(away) * sign;
        let direction = (away + tangent).try_normalize().unwrap_or(away);
        target + direction * ship.ai_state.preferred_range
    }

    /// Best-scoring escape point at `evade_distance`, or `None` with no
    /// known threat.
    ///
    /// The current heading is always a candidate; the others keep pitch
    /// within `evade_max_pitch` of it and sample yaw all the way round.
    fn evade_point(&mut self, ships: &[Ship], ship: &Ship, attacker: Option<&Ship>) -> Option<Vec3> {
        let settings = self.behavior.settings();
        let mut visible = self.enemies(ship.position, settings.detection_range, ship.team.tag());
        visible.sort_unstable_by_key(|e| e.id);
        let mut threats: Vec<Vec3> = visible
            .into_iter()
            .map(|e| self.live(ships, e.id.into()).map_or(e.pos, |s| s.position))
            .collect();
        if let Some(attacker) = attacker {
            if !threats.contains(&attacker.position) {
                threats.push(attacker.position);
            }
        }
        if threats.is_empty() {
            return None;
        }

        let params = EscapeParams {
            evade_distance: settings.evade_distance,
            threat_weight: settings.evade_threat_penalty_weight,
            boundary_margin: settings.boundary_safety_margin,
            boundary_weight: settings.boundary_penalty_weight,
        };
        let bounds = self.bounds.bounds;
        let heading = ship.orientation;
        let score = |point: Vec3| steering::calculate_escape_score(point, &threats, &bounds, &params);

        let mut best = ship.position + heading.forward() * params.evade_distance;
        let mut best_score = score(best);
        for _ in 0..settings.evade_sampling_count {
            let yaw = heading.yaw + self.rng.range(-PI, PI);
            let pitch = (heading.pitch + self.rng.range(-settings.evade_max_pitch, settings.evade_max_pitch))
                .clamp(-FRAC_PI_2, FRAC_PI_2);
            let candidate = ship.position + steering::forward_vector(pitch, yaw) * params.evade_distance;
            let candidate_score = score(candidate);
            if candidate_score > best_score {
                best = candidate;
                best_score = candidate_score;
            }
        }
        Some(best)
    }

    /// Slot position of a formation member. The leader drifts; members hold
    /// their offset from where the leader's slot would put the origin.
    fn formation_goal(&self, ships: &[Ship], ship: &Ship) -> Goal {
        let Some(slot) = ship.ai_state.assignment.formation() else {
            return Goal::Expire;
        };
        let Some((leader_index, leader_id)) = self.registry.formation_leader(slot.formation_id) else {
            return Goal::Expire;
        };
        if leader_id == ship.id {
            return Goal::Drift;
        }
        let Some(leader) = self.live(ships, leader_id) else {
            return Goal::Expire;
        };
        let spacing = self.behavior.settings().formation_spacing;
        let origin = leader.position - super::slot_offset(leader_index, spacing);
        Goal::Point(origin + slot.position)
    }

    /// Hand ship `i`'s turrets to the turret collaborator.
    pub(super) fn fire_turrets(&mut self, ships: &mut [Ship], i: usize, dt: f32, report: &mut TickReport) {
        let ship = &ships[i];
        let reach = ship
            .turrets
            .iter()
            .map(|t| t.max_range)
            .fold(0.0_f32, f32::max);
        if reach <= 0.0 {
            return;
        }
        let mut targets: Vec<TargetTrack> = self
            .enemies(ship.position, reach, ship.team.tag())
            .into_iter()
            .filter_map(|e| self.live(ships, e.id.into()))
            .map(|enemy| TargetTrack {
                id: enemy.id,
                position: enemy.position,
                velocity: enemy.velocity,
            })
            .collect();
        targets.sort_unstable_by_key(|t| t.id);

        let shots = self.turret_ai.update(&mut ships[i], &targets, dt);
        report.fire_intents.extend(shots);
    }
}
