//! Global behavior tunables.

use serde::{Deserialize, Serialize};

/// Flat set of engine-wide tunables.
///
/// Deserialization fills every missing key from [`GlobalSettings::default`],
/// so a config file only needs the keys it changes. Call
/// [`GlobalSettings::sanitized`] before use; the resolver does this once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    // --- separation -------------------------------------------------------
    /// Radius of same-team neighbor avoidance
    pub separation_distance: f32,
    /// Weight for small clusters
    pub separation_weight: f32,
    /// Neighbor count above which `separation_mild_weight` applies
    pub separation_mild_cluster: usize,
    /// Weight for mid-sized clusters
    pub separation_mild_weight: f32,
    /// Neighbor count above which `separation_moderate_weight` applies
    pub separation_moderate_cluster: usize,
    /// Weight for dense clusters
    pub separation_moderate_weight: f32,
    /// Fraction of cruise speed the separation force may contribute
    pub separation_steer_strength: f32,

    // --- evasion ----------------------------------------------------------
    /// Evade only after taking damage
    pub evade_only_on_damage: bool,
    /// Recent damage needed to trigger evasion
    pub damage_evade_threshold: f32,
    /// How long damage counts as recent
    pub evade_recent_damage_window_seconds: f32,
    /// Linear decay of the damage accumulator (points/s)
    pub damage_decay_per_second: f32,
    /// Candidate headings sampled per evade step
    pub evade_sampling_count: usize,
    /// Maximum pitch offset of sampled headings (rad)
    pub evade_max_pitch: f32,
    /// Distance of each candidate escape point
    pub evade_distance: f32,
    /// Penalty weight for candidates close to threats
    pub evade_threat_penalty_weight: f32,
    /// Proximity evade trigger, as a fraction of preferred range
    pub evade_proximity_multiplier: f32,
    /// Minimum caution for proximity-triggered evasion
    pub evade_caution_threshold: f32,
    /// Distance from the arena faces considered unsafe
    pub boundary_safety_margin: f32,
    /// Penalty for escape points inside the safety margin
    pub boundary_penalty_weight: f32,

    // --- movement ---------------------------------------------------------
    /// Distance at which a ship stops and holds instead of steering
    pub movement_close_enough_threshold: f32,
    /// Exponential velocity decay while holding (1/s)
    pub stop_decay_rate: f32,
    /// Clamp orientation changes to `turn_rate * dt`
    pub enable_turn_rate_limit: bool,

    // --- engagement -------------------------------------------------------
    /// Close band edge, as a fraction of preferred range
    pub close_range_multiplier: f32,
    /// Medium band edge, as a fraction of preferred range
    pub medium_range_multiplier: f32,
    /// Enemy detection radius
    pub detection_range: f32,
    /// Radius used to find teammates to group with
    pub group_radius: f32,

    // --- team coordination ------------------------------------------------
    /// Designate one scout per team
    pub enable_scouts: bool,
    /// Seconds a scout spends on each exploration zone
    pub exploration_zone_duration: f32,
    /// Broadcast damage to teammates
    pub enable_alarm_system: bool,
    /// How long an alarm stays active
    pub alarm_system_window_seconds: f32,
    /// Radius around the alarm within which teammates respond
    pub alarm_radius: f32,
    /// How long the last attacker keeps kill credit
    pub kill_credit_window_seconds: f32,

    // --- roaming / formation ----------------------------------------------
    /// Minimum distance between same-team roaming anchors
    pub roaming_anchor_min_separation: f32,
    /// Random candidates tried when placing an anchor
    pub roaming_anchor_attempts: usize,
    /// Roaming ships engage enemies within this multiple of preferred range
    pub roaming_engage_multiplier: f32,
    /// Distance between formation slots
    pub formation_spacing: f32,
    /// Slots per formation
    pub formation_max_size: usize,

    // --- spatial index ----------------------------------------------------
    /// Use the grid for neighbor/enemy queries instead of a linear scan
    pub enable_spatial_index: bool,
    /// Grid cell edge length
    pub spatial_cell_size: f32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            separation_distance: 60.0,
            separation_weight: 1.0,
            separation_mild_cluster: 3,
            separation_mild_weight: 0.85,
            separation_moderate_cluster: 6,
            separation_moderate_weight: 0.7,
            separation_steer_strength: 1.0,

            evade_only_on_damage: true,
            damage_evade_threshold: 20.0,
            evade_recent_damage_window_seconds: 5.0,
            damage_decay_per_second: 5.0,
            evade_sampling_count: 12,
            evade_max_pitch: 0.6,
            evade_distance: 300.0,
            evade_threat_penalty_weight: 1.0,
            evade_proximity_multiplier: 0.5,
            evade_caution_threshold: 0.6,
            boundary_safety_margin: 150.0,
            boundary_penalty_weight: 10.0,

            movement_close_enough_threshold: 20.0,
            stop_decay_rate: 4.0,
            enable_turn_rate_limit: false,

            close_range_multiplier: 0.6,
            medium_range_multiplier: 1.2,
            detection_range: 1500.0,
            group_radius: 400.0,

            enable_scouts: true,
            exploration_zone_duration: 8.0,
            enable_alarm_system: true,
            alarm_system_window_seconds: 4.0,
            alarm_radius: 800.0,
            kill_credit_window_seconds: 10.0,

            roaming_anchor_min_separation: 300.0,
            roaming_anchor_attempts: 24,
            roaming_engage_multiplier: 1.5,
            formation_spacing: 80.0,
            formation_max_size: 6,

            enable_spatial_index: true,
            spatial_cell_size: 120.0,
        }
    }
}

/// Replace a non-finite value with `fallback`, then clamp to `min`.
fn at_least(value: f32, min: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(min)
    } else {
        fallback
    }
}

impl GlobalSettings {
    /// Copy with every value forced into its valid range.
    ///
    /// Non-finite numbers fall back to the default; negative distances,
    /// weights and windows clamp to zero; band edges keep `close <= medium`;
    /// the mild cluster threshold never exceeds the moderate one.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let mut s = self.clone();

        s.separation_distance = at_least(s.separation_distance, 0.0, d.separation_distance);
        s.separation_weight = at_least(s.separation_weight, 0.0, d.separation_weight);
        s.separation_mild_weight = at_least(s.separation_mild_weight, 0.0, d.separation_mild_weight);
        s.separation_moderate_weight =
            at_least(s.separation_moderate_weight, 0.0, d.separation_moderate_weight);
        s.separation_moderate_cluster = s.separation_moderate_cluster.max(s.separation_mild_cluster);
        s.separation_steer_strength = at_least(s.separation_steer_strength, 0.0, d.separation_steer_strength);

        s.damage_evade_threshold = at_least(s.damage_evade_threshold, 0.0, d.damage_evade_threshold);
        s.evade_recent_damage_window_seconds = at_least(
            s.evade_recent_damage_window_seconds,
            0.0,
            d.evade_recent_damage_window_seconds,
        );
        s.damage_decay_per_second = at_least(s.damage_decay_per_second, 0.0, d.damage_decay_per_second);
        s.evade_sampling_count = s.evade_sampling_count.max(1);
        s.evade_max_pitch =
            at_least(s.evade_max_pitch, 0.0, d.evade_max_pitch).min(std::f32::consts::FRAC_PI_2);
        s.evade_distance = at_least(s.evade_distance, 1.0, d.evade_distance);
        s.evade_threat_penalty_weight =
            at_least(s.evade_threat_penalty_weight, 0.0, d.evade_threat_penalty_weight);
        s.evade_proximity_multiplier =
            at_least(s.evade_proximity_multiplier, 0.0, d.evade_proximity_multiplier);
        s.evade_caution_threshold = at_least(s.evade_caution_threshold, 0.0, d.evade_caution_threshold).min(1.0);
        s.boundary_safety_margin = at_least(s.boundary_safety_margin, 0.0, d.boundary_safety_margin);
        s.boundary_penalty_weight = at_least(s.boundary_penalty_weight, 0.0, d.boundary_penalty_weight);

        s.movement_close_enough_threshold =
            at_least(s.movement_close_enough_threshold, 0.0, d.movement_close_enough_threshold);
        s.stop_decay_rate = at_least(s.stop_decay_rate, 0.0, d.stop_decay_rate);

        s.close_range_multiplier = at_least(s.close_range_multiplier, 0.0, d.close_range_multiplier);
        s.medium_range_multiplier =
            at_least(s.medium_range_multiplier, 0.0, d.medium_range_multiplier).max(s.close_range_multiplier);
        s.detection_range = at_least(s.detection_range, 0.0, d.detection_range);
        s.group_radius = at_least(s.group_radius, 0.0, d.group_radius);

        s.exploration_zone_duration = at_least(s.exploration_zone_duration, 0.1, d.exploration_zone_duration);
        s.alarm_system_window_seconds =
            at_least(s.alarm_system_window_seconds, 0.0, d.alarm_system_window_seconds);
        s.alarm_radius = at_least(s.alarm_radius, 0.0, d.alarm_radius);
        s.kill_credit_window_seconds = at_least(s.kill_credit_window_seconds, 0.0, d.kill_credit_window_seconds);

        s.roaming_anchor_min_separation =
            at_least(s.roaming_anchor_min_separation, 0.0, d.roaming_anchor_min_separation);
        s.roaming_anchor_attempts = s.roaming_anchor_attempts.max(1);
        s.roaming_engage_multiplier = at_least(s.roaming_engage_multiplier, 0.0, d.roaming_engage_multiplier);
        s.formation_spacing = at_least(s.formation_spacing, 0.0, d.formation_spacing);
        s.formation_max_size = s.formation_max_size.max(1);

        if !(s.spatial_cell_size.is_finite() && s.spatial_cell_size > 0.0) {
            s.spatial_cell_size = d.spatial_cell_size;
        }

        if s != *self {
            tracing::warn!("global behavior settings contained out-of-range values; clamped");
        }
        s
    }
}
