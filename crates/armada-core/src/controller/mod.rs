//! Per-tick AI controller.
//!
//! [`AiController`] owns everything the AI needs between ticks: the resolved
//! behavior tables, the spatial grid, the seeded RNG, the team registry and
//! the simulation clock. Ships themselves stay with the caller and are passed
//! in as a slice every tick.
//!
//! # Tick phases
//!
//! 1. **Refresh**: snapshot every active ship and rebuild the grid from it.
//! 2. **Roster**: validate (or reassign) each team's scout.
//! 3. **Per ship**, in slice order:
//!    - advance timers and drop stale assignments and targets
//!    - reevaluate the intent when the gate opens or damage or an alarm
//!      overrides it
//!    - execute the intent, apply separation and integrate position
//!    - run the turret collaborator
//! 4. **Advance** the clock.
//!
//! All neighbour and enemy queries read the tick-start snapshot, so the grid
//! path and the linear-scan path see exactly the same entities.
//!
//! # Example
//!
//! ```
//! use armada_core::behavior::BehaviorConfig;
//! use armada_core::controller::AiController;
//! use armada_core::ship::{Ship, ShipClass, ShipId, Team};
//! use armada_core::SimulationBounds;
//! use glam::Vec3;
//!
//! let mut ai = AiController::new(SimulationBounds::default(), &BehaviorConfig::default(), 7);
//! let mut ships = vec![
//!     Ship::new(ShipId::new(1), Team::Red, ShipClass::Fighter, Vec3::new(500.0, 500.0, 500.0)),
//!     Ship::new(ShipId::new(2), Team::Blue, ShipClass::Frigate, Vec3::new(900.0, 500.0, 500.0)),
//! ];
//!
//! let report = ai.update_all_ships(&mut ships, 0.1);
//! assert_eq!(report.tick, 0);
//! assert!(ships.iter().all(|s| s.dir() == s.orientation.yaw));
//! ```

mod assignment;
mod execute;
mod intent;
mod registry;
mod separation;

use std::collections::{HashMap, HashSet};
use std::fmt;

use armada_grid::{scan, SpatialEntity, SpatialGrid, TeamId};
use glam::Vec3;
use tracing::{debug, info, trace, warn};

use crate::behavior::{BehaviorConfig, GlobalSettings, Personality, PersonalityMode, ResolvedBehavior};
use crate::bounds::SimulationBounds;
use crate::error::ConfigError;
use crate::output::{IntentChange, TickReport};
use crate::rng::SimRng;
use crate::ship::{Assignment, Intent, Ship, ShipId, Team};
use crate::turret::{BasicTurretAi, TurretAi};

pub use execute::move_towards;
pub use registry::{slot_offset, Alarm, Formation, TeamRegistry};
pub use separation::SeparationForce;

/// Number of exploration zones scouts rotate through.
const ZONE_COUNT: i64 = 8;

/// Per-simulation AI engine.
pub struct AiController {
    bounds: SimulationBounds,
    behavior: ResolvedBehavior,
    grid: SpatialGrid,
    /// Active ships at the start of the current tick, in slice order
    snapshot: Vec<SpatialEntity>,
    /// Ship id to slice index for the current tick
    index: HashMap<ShipId, usize>,
    registry: TeamRegistry,
    rng: SimRng,
    turret_ai: Box<dyn TurretAi>,
    neighbor_counts: HashMap<ShipId, usize>,
    time: f64,
    tick: u64,
}

impl fmt::Debug for AiController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiController")
            .field("bounds", &self.bounds)
            .field("seed", &self.rng.seed())
            .field("tick", &self.tick)
            .field("time", &self.time)
            .field("tracked", &self.snapshot.len())
            .finish_non_exhaustive()
    }
}

impl AiController {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Build a controller. A grid configuration that cannot be used falls
    /// back to safe values with a warning.
    #[must_use]
    pub fn new(bounds: SimulationBounds, config: &BehaviorConfig, seed: u64) -> Self {
        let behavior = ResolvedBehavior::new(config);
        let grid = SpatialGrid::new(bounds.bounds, behavior.settings().spatial_cell_size);
        Self::assemble(bounds, behavior, grid, seed)
    }

    /// Build a controller, rejecting bounds the grid cannot use.
    ///
    /// The cell size is taken from the sanitized settings, as in [`Self::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Grid`] for degenerate or non-finite bounds.
    pub fn try_new(bounds: SimulationBounds, config: &BehaviorConfig, seed: u64) -> Result<Self, ConfigError> {
        let behavior = ResolvedBehavior::new(config);
        let grid = SpatialGrid::try_new(bounds.bounds, behavior.settings().spatial_cell_size)?;
        Ok(Self::assemble(bounds, behavior, grid, seed))
    }

    /// Build a controller from a JSON behavior config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Grid`] for an unusable grid configuration.
    pub fn from_json(bounds: SimulationBounds, json: &str, seed: u64) -> Result<Self, ConfigError> {
        let config = BehaviorConfig::from_json_str(json)?;
        Self::try_new(bounds, &config, seed)
    }

    fn assemble(bounds: SimulationBounds, behavior: ResolvedBehavior, grid: SpatialGrid, seed: u64) -> Self {
        Self {
            bounds,
            behavior,
            grid,
            snapshot: Vec::new(),
            index: HashMap::new(),
            registry: TeamRegistry::new(),
            rng: SimRng::new(seed),
            turret_ai: Box::new(BasicTurretAi::default()),
            neighbor_counts: HashMap::new(),
            time: 0.0,
            tick: 0,
        }
    }

    /// Replace the turret collaborator.
    #[must_use]
    pub fn with_turret_ai(mut self, turret_ai: impl TurretAi + 'static) -> Self {
        self.turret_ai = Box::new(turret_ai);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Simulation time at the start of the next tick.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Arena bounds.
    #[must_use]
    pub fn bounds(&self) -> &SimulationBounds {
        &self.bounds
    }

    /// Sanitized global settings.
    #[must_use]
    pub fn settings(&self) -> &GlobalSettings {
        self.behavior.settings()
    }

    /// Resolved personality tables.
    #[must_use]
    pub fn behavior(&self) -> &ResolvedBehavior {
        &self.behavior
    }

    /// Team registry (scouts, alarms, formations).
    #[must_use]
    pub fn registry(&self) -> &TeamRegistry {
        &self.registry
    }

    /// Spatial grid as of the last refresh.
    #[must_use]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Switch between grid-backed and linear-scan queries.
    pub fn set_spatial_index_enabled(&mut self, enabled: bool) {
        self.behavior.settings_mut().enable_spatial_index = enabled;
    }

    /// Current scout of a team.
    #[must_use]
    pub fn scout_for(&self, team: Team) -> Option<ShipId> {
        self.registry.scout(team)
    }

    /// Same-team neighbour count computed for `id` during the last tick.
    #[must_use]
    pub fn neighbor_count(&self, id: ShipId) -> Option<usize> {
        self.neighbor_counts.get(&id).copied()
    }

    /// Current intent of a ship in `ships`.
    #[must_use]
    pub fn intent_of(ships: &[Ship], id: ShipId) -> Option<Intent> {
        ships.iter().find(|s| s.id == id).map(|s| s.ai_state.current_intent)
    }

    /// Effective personality of a ship, before the per-ship mode override.
    #[must_use]
    pub fn personality_of(&self, ship: &Ship) -> Personality {
        *self.behavior.personality(ship.class, ship.team)
    }

    /// Effective mode of a ship: its override if set, else its personality's.
    #[must_use]
    pub fn mode_of(&self, ship: &Ship) -> PersonalityMode {
        ship.ai_state
            .mode_override
            .unwrap_or_else(|| self.behavior.personality(ship.class, ship.team).mode)
    }

    /// Who gets credit if `ship` dies now: its last attacker, if it was hit
    /// within `kill_credit_window_seconds`.
    #[must_use]
    pub fn kill_credit(&self, ship: &Ship) -> Option<ShipId> {
        let window = f64::from(self.settings().kill_credit_window_seconds);
        let since = ship.ai_state.time_since_damage(self.time)?;
        if since <= window {
            ship.ai_state.last_attacker
        } else {
            None
        }
    }

    // ========================================================================
    // External events
    // ========================================================================

    /// Record damage dealt to `target` by `attacker`.
    ///
    /// Feeds the decaying damage accumulator and, with the alarm system on,
    /// broadcasts an alarm to the target's team. Hull points are left to the
    /// combat collaborator. Returns `false` if the target is unknown or the
    /// amount is not a positive finite number.
    pub fn record_damage(&mut self, ships: &mut [Ship], target: ShipId, amount: f32, attacker: Option<ShipId>) -> bool {
        if !(amount.is_finite() && amount > 0.0) {
            return false;
        }
        let Some(ship) = ships.iter_mut().find(|s| s.id == target) else {
            return false;
        };
        let now = self.time;
        let ai = &mut ship.ai_state;
        ai.recent_damage += amount;
        ai.last_damage_time = Some(now);
        ai.last_attacker = attacker;
        debug!(ship = %target, amount, attacker = ?attacker, "damage recorded");

        if self.behavior.settings().enable_alarm_system && ship.position.is_finite() {
            self.registry.raise_alarm(
                ship.team,
                Alarm {
                    time: now,
                    position: ship.position,
                    source: target,
                    attacker,
                },
            );
        }
        true
    }

    // ========================================================================
    // Spatial bookkeeping
    // ========================================================================

    /// Snapshot the active ships and rebuild the grid from them.
    ///
    /// Called at the start of every tick; exposed for callers that query the
    /// controller between ticks.
    pub fn refresh_spatial(&mut self, ships: &[Ship]) {
        self.snapshot.clear();
        self.index.clear();
        for (i, ship) in ships.iter().enumerate() {
            if ship.is_active() {
                self.snapshot.push(ship.spatial_entity());
                self.index.insert(ship.id, i);
            }
        }
        self.grid.rebuild(&self.snapshot);
        let live: HashSet<ShipId> = self.index.keys().copied().collect();
        self.registry.retain_live(&live);
        self.neighbor_counts.retain(|id, _| live.contains(id));
    }

    /// Drop grid entries, registry entries and cached counts for ships no
    /// longer in `ships`, without rebuilding the grid.
    ///
    /// Returns the number of grid entries removed.
    pub fn reconcile(&mut self, ships: &[Ship]) -> usize {
        let live: HashSet<ShipId> = ships.iter().filter(|s| s.is_active()).map(|s| s.id).collect();
        let raw: HashSet<u64> = live.iter().map(|id| id.as_u64()).collect();
        let removed = self.grid.gc_except(&raw);

        self.snapshot.retain(|e| raw.contains(&e.id));
        self.index.clear();
        for (i, ship) in ships.iter().enumerate() {
            if live.contains(&ship.id) {
                self.index.insert(ship.id, i);
            }
        }
        self.registry.retain_live(&live);
        self.neighbor_counts.retain(|id, _| live.contains(id));
        if removed > 0 {
            debug!(removed, "reconciled spatial grid after external removals");
        }
        removed
    }

    /// Active ship with `id`, looked up through the tick index.
    fn live<'a>(&self, ships: &'a [Ship], id: ShipId) -> Option<&'a Ship> {
        self.index
            .get(&id)
            .and_then(|&i| ships.get(i))
            .filter(|s| s.id == id && s.is_active())
    }

    /// Same-team snapshot entities within `radius`, excluding `exclude`.
    fn neighbors(&self, pos: Vec3, radius: f32, team: Team, exclude: ShipId) -> Vec<SpatialEntity> {
        let tag = team.tag();
        let exclude = Some(exclude.as_u64());
        if self.behavior.settings().enable_spatial_index {
            self.grid.query_neighbors(pos, radius, tag, exclude)
        } else {
            scan::neighbors(&self.snapshot, pos, radius, tag, exclude)
        }
    }

    /// Other-team snapshot entities within `radius`.
    fn enemies(&self, pos: Vec3, radius: f32, team: TeamId) -> Vec<SpatialEntity> {
        if self.behavior.settings().enable_spatial_index {
            self.grid.query_enemies(pos, radius, team)
        } else {
            scan::enemies(&self.snapshot, pos, radius, team)
        }
    }

    /// Nearest enemy within `radius` of `pos` and its distance; ties go to
    /// the lower id.
    fn nearest_enemy(&self, pos: Vec3, radius: f32, team: Team) -> Option<(ShipId, f32)> {
        self.enemies(pos, radius, team.tag())
            .into_iter()
            .map(|e| (ShipId::new(e.id), e.pos.distance(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance every ship by `dt` seconds.
    ///
    /// Inactive ships (dead, or with non-finite position or velocity) are left
    /// untouched. A non-finite or non-positive `dt` skips the whole tick.
    pub fn update_all_ships(&mut self, ships: &mut [Ship], dt: f32) -> TickReport {
        let mut report = TickReport {
            tick: self.tick,
            time: self.time,
            ..TickReport::default()
        };
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "skipping tick with invalid dt");
            return report;
        }
        let now = self.time;

        self.refresh_spatial(ships);
        self.validate_scouts(ships, now);

        for i in 0..ships.len() {
            if !ships[i].is_active() {
                if ships[i].is_alive() {
                    warn!(ship = %ships[i].id, "skipping ship with non-finite state");
                    report.skipped_ships.push(ships[i].id);
                }
                continue;
            }

            self.prepare(ships, i, dt, now);
            if self.should_reevaluate(&ships[i], now) {
                self.reevaluate(ships, i, now, &mut report);
            }
            self.execute(ships, i, dt, now);
            self.fire_turrets(ships, i, dt, &mut report);
        }

        self.time += f64::from(dt);
        self.tick += 1;
        trace!(
            tick = report.tick,
            ships = self.snapshot.len(),
            shots = report.fire_intents.len(),
            changes = report.intent_changes.len(),
            "tick complete"
        );
        report
    }

    /// Keep one eligible scout per team.
    ///
    /// A scout stays while it is alive and its effective mode is aggressive,
    /// defensive or mixed. Otherwise the fastest eligible ship (lowest id on
    /// ties) takes over.
    fn validate_scouts(&mut self, ships: &[Ship], now: f64) {
        let enabled = self.behavior.settings().enable_scouts;
        for team in Team::ALL {
            let current = self.registry.scout(team);
            if !enabled {
                if current.is_some() {
                    self.registry.set_scout(team, None, now, 0);
                }
                continue;
            }

            let eligible = |ship: &Ship| {
                ship.team == team
                    && ship.is_active()
                    && matches!(
                        self.mode_of(ship),
                        PersonalityMode::Aggressive | PersonalityMode::Defensive | PersonalityMode::Mixed
                    )
            };
            if current.and_then(|id| self.live(ships, id)).is_some_and(eligible) {
                continue;
            }

            let candidate = ships
                .iter()
                .filter(|&s| eligible(s))
                .max_by(|a, b| a.speed.total_cmp(&b.speed).then_with(|| b.id.cmp(&a.id)))
                .map(|s| s.id);

            match candidate {
                Some(id) => {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let offset = self.rng.int(0, ZONE_COUNT - 1) as usize;
                    info!(%team, scout = %id, previous = ?current, "scout assigned");
                    self.registry.set_scout(team, Some(id), now, offset);
                }
                None if current.is_some() => {
                    info!(%team, previous = ?current, "no eligible scout");
                    self.registry.set_scout(team, None, now, 0);
                }
                None => {}
            }
        }
    }

    /// Per-ship housekeeping before reevaluation.
    fn prepare(&mut self, ships: &mut [Ship], i: usize, dt: f32, now: f64) {
        let personality = self.personality_of(&ships[i]);
        let mode = self.mode_of(&ships[i]);
        let decay = self.behavior.settings().damage_decay_per_second;
        let target_valid = ships[i].target_id.is_some_and(|id| {
            self.live(ships, id)
                .is_some_and(|target| target.team != ships[i].team)
        });

        let ship = &mut ships[i];
        let ai = &mut ship.ai_state;
        ai.recent_damage = (ai.recent_damage - decay * dt).max(0.0);

        if !(ai.preferred_range.is_finite() && ai.preferred_range > 0.0) {
            ai.preferred_range = ship.class.stats().weapon_range * personality.preferred_range_multiplier;
        }

        let stale = match ai.assignment {
            Assignment::None => false,
            Assignment::Roaming { .. } => mode != PersonalityMode::Roaming,
            Assignment::Formation(slot) => {
                if mode == PersonalityMode::Formation {
                    false
                } else {
                    self.registry.release_slot(ship.id, &slot);
                    true
                }
            }
        };
        if stale {
            debug!(ship = %ship.id, %mode, "mode changed, assignment cleared");
            ai.assignment = Assignment::None;
            // A mode switch forces a fresh decision.
            ai.intent_end_time = now;
            ai.last_intent_reevaluation = None;
        }

        if !target_valid {
            ship.target_id = None;
        }
    }

    /// True when `ship` holds more than the evade threshold of damage taken
    /// within the recent-damage window.
    ///
    /// An accumulator written without a damage time counts as recent.
    fn damaged_recently(settings: &GlobalSettings, ship: &Ship, now: f64) -> bool {
        let ai = &ship.ai_state;
        ai.recent_damage > settings.damage_evade_threshold
            && ai
                .time_since_damage(now)
                .map_or(true, |since| since <= f64::from(settings.evade_recent_damage_window_seconds))
    }

    /// Alarm for `ship`'s team that reaches it at `now`, if any.
    fn alarm_for(&self, ship: &Ship, now: f64) -> Option<Alarm> {
        let settings = self.behavior.settings();
        if !settings.enable_alarm_system {
            return None;
        }
        self.registry
            .active_alarm(ship.team, now, settings.alarm_system_window_seconds)
            .filter(|alarm| alarm.source != ship.id)
            .filter(|alarm| alarm.position.distance(ship.position) <= settings.alarm_radius)
            .copied()
    }

    /// Reevaluation gate.
    ///
    /// Opens when both the reevaluation interval and the current intent's
    /// duration have elapsed. Fresh damage above the evade threshold, or a
    /// fresh alarm reaching an idle or patrolling ship, opens it early.
    fn should_reevaluate(&self, ship: &Ship, now: f64) -> bool {
        let ai = &ship.ai_state;
        let rate = f64::from(self.personality_of(ship).intent_reevaluation_rate);
        let last = ai.last_intent_reevaluation;

        let interval_elapsed = last.map_or(true, |t| now >= t + rate);
        if interval_elapsed && now >= ai.intent_end_time {
            return true;
        }

        let newer_than_last = |t: f64| last.map_or(true, |last| t > last);

        let damage_override = ai.current_intent != Intent::Evade
            && Self::damaged_recently(self.behavior.settings(), ship, now)
            && ai.last_damage_time.map_or(true, newer_than_last);
        if damage_override {
            return true;
        }

        ai.current_intent.is_idle_like()
            && self
                .alarm_for(ship, now)
                .is_some_and(|alarm| newer_than_last(alarm.time))
    }

    /// Choose and apply a new intent for ship `i`.
    fn reevaluate(&mut self, ships: &mut [Ship], i: usize, now: f64, report: &mut TickReport) {
        let decision = self.choose_intent(ships, i, now);
        let personality = self.personality_of(&ships[i]);
        let duration = self
            .rng
            .range(personality.min_intent_duration, personality.max_intent_duration);

        let ship = &mut ships[i];
        let from = ship.ai_state.current_intent;
        ship.ai_state.current_intent = decision.intent;
        ship.ai_state.last_intent_reevaluation = Some(now);
        ship.ai_state.intent_end_time = now + f64::from(duration);
        ship.target_id = decision.target;

        if from != decision.intent {
            debug!(ship = %ship.id, %from, to = %decision.intent, target = ?decision.target, "intent changed");
            report.intent_changes.push(IntentChange {
                ship: ship.id,
                from,
                to: decision.intent,
            });
        }
    }
}

/// Outcome of a reevaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decision {
    pub intent: Intent,
    pub target: Option<ShipId>,
}

impl Decision {
    pub const fn new(intent: Intent, target: Option<ShipId>) -> Self {
        Self { intent, target }
    }
}
