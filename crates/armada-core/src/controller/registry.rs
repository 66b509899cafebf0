//! Per-controller team bookkeeping: scouts, alarms and formation rosters.
//!
//! One registry lives inside each [`AiController`](super::AiController); there
//! is no process-wide state. Formations are keyed by [`FormationId`] in a
//! `BTreeMap` so every scan runs in id order.

use std::collections::{BTreeMap, HashSet};

use glam::Vec3;

use crate::ship::{FormationId, FormationSlot, ShipId, Team};

/// A damage report broadcast to a team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alarm {
    /// Time the damage was taken
    pub time: f64,
    /// Where the damaged ship was
    pub position: Vec3,
    /// Ship that was hit
    pub source: ShipId,
    /// Who fired, when known
    pub attacker: Option<ShipId>,
}

#[derive(Debug, Clone, Default)]
struct TeamEntry {
    scout: Option<ShipId>,
    exploration_start: f64,
    exploration_offset: usize,
    alarm: Option<Alarm>,
}

/// Slot holders of one formation. `slots[0]` is the origin slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Formation {
    team: Team,
    slots: Vec<Option<ShipId>>,
}

impl Formation {
    /// Owning team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Holder of a slot.
    #[must_use]
    pub fn holder(&self, slot_index: usize) -> Option<ShipId> {
        self.slots.get(slot_index).copied().flatten()
    }

    /// Lowest occupied slot and its holder.
    #[must_use]
    pub fn leader(&self) -> Option<(usize, ShipId)> {
        self.slots
            .iter()
            .enumerate()
            .find_map(|(index, holder)| holder.map(|id| (index, id)))
    }
}

/// Offset of a slot from the formation origin.
///
/// Slot 0 sits on the origin; later slots fan out behind it in a wedge,
/// alternating sides: slot `k` is `rank = (k + 1) / 2` rows back and on the
/// left for odd `k`, the right for even `k`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn slot_offset(slot_index: usize, spacing: f32) -> Vec3 {
    if slot_index == 0 {
        return Vec3::ZERO;
    }
    let rank = slot_index.div_ceil(2) as f32;
    let side = if slot_index % 2 == 1 { 1.0 } else { -1.0 };
    Vec3::new(-rank * spacing, side * rank * spacing, 0.0)
}

/// Team registry owned by a controller.
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: [TeamEntry; 2],
    formations: BTreeMap<FormationId, Formation>,
    next_formation: u32,
}

impl TeamRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Scouts and exploration
    // ========================================================================

    /// Current scout of a team.
    #[must_use]
    pub fn scout(&self, team: Team) -> Option<ShipId> {
        self.teams[team.index()].scout
    }

    /// Replace a team's scout. A new scout restarts the zone rotation at
    /// `zone_offset` from time `now`.
    pub fn set_scout(&mut self, team: Team, scout: Option<ShipId>, now: f64, zone_offset: usize) {
        let entry = &mut self.teams[team.index()];
        entry.scout = scout;
        entry.exploration_start = now;
        entry.exploration_offset = zone_offset;
    }

    /// Zone a team's scout should visit at `now`; advances one zone every
    /// `zone_duration` seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn exploration_zone(&self, team: Team, now: f64, zone_duration: f32, zones: &[Vec3]) -> Option<Vec3> {
        if zones.is_empty() {
            return None;
        }
        let entry = &self.teams[team.index()];
        let elapsed = (now - entry.exploration_start).max(0.0);
        let steps = (elapsed / f64::from(zone_duration.max(f32::EPSILON))).floor() as usize;
        let index = entry.exploration_offset.wrapping_add(steps) % zones.len();
        zones.get(index).copied()
    }

    // ========================================================================
    // Alarms
    // ========================================================================

    /// Record an alarm for a team, replacing the previous one.
    pub fn raise_alarm(&mut self, team: Team, alarm: Alarm) {
        self.teams[team.index()].alarm = Some(alarm);
    }

    /// Latest alarm of a team if raised within `window` seconds of `now`.
    #[must_use]
    pub fn active_alarm(&self, team: Team, now: f64, window: f32) -> Option<&Alarm> {
        self.teams[team.index()]
            .alarm
            .as_ref()
            .filter(|alarm| now - alarm.time <= f64::from(window))
    }

    // ========================================================================
    // Formations
    // ========================================================================

    /// Formation by id.
    #[must_use]
    pub fn formation(&self, id: FormationId) -> Option<&Formation> {
        self.formations.get(&id)
    }

    /// Number of formations with at least one member.
    #[must_use]
    pub fn formation_count(&self) -> usize {
        self.formations.len()
    }

    /// True when `ship` holds the slot described by `slot`.
    #[must_use]
    pub fn holds_slot(&self, ship: ShipId, slot: &FormationSlot) -> bool {
        self.formations
            .get(&slot.formation_id)
            .and_then(|f| f.holder(slot.slot_index))
            == Some(ship)
    }

    /// Give `ship` a slot: the lowest free slot of the lowest-id formation of
    /// its team with room, or slot 0 of a new formation.
    pub fn assign_slot(&mut self, team: Team, ship: ShipId, max_size: usize, spacing: f32) -> FormationSlot {
        let max_size = max_size.max(1);
        let open = self.formations.iter_mut().find_map(|(id, formation)| {
            if formation.team != team {
                return None;
            }
            let index = match formation.slots.iter().position(Option::is_none) {
                Some(index) => index,
                None if formation.slots.len() < max_size => {
                    formation.slots.push(None);
                    formation.slots.len() - 1
                }
                None => return None,
            };
            formation.slots[index] = Some(ship);
            Some((*id, index))
        });

        let (formation_id, slot_index) = match open {
            Some(found) => found,
            None => {
                let id = FormationId::new(self.next_formation);
                self.next_formation = self.next_formation.wrapping_add(1);
                self.formations.insert(
                    id,
                    Formation {
                        team,
                        slots: vec![Some(ship)],
                    },
                );
                (id, 0)
            }
        };

        FormationSlot {
            formation_id,
            slot_index,
            position: slot_offset(slot_index, spacing),
        }
    }

    /// Free a slot if `ship` holds it. Empty formations are dropped.
    pub fn release_slot(&mut self, ship: ShipId, slot: &FormationSlot) {
        let Some(formation) = self.formations.get_mut(&slot.formation_id) else {
            return;
        };
        if let Some(holder) = formation.slots.get_mut(slot.slot_index) {
            if *holder == Some(ship) {
                *holder = None;
            }
        }
        if formation.member_count() == 0 {
            self.formations.remove(&slot.formation_id);
        }
    }

    /// Leader of a formation: its lowest occupied slot.
    #[must_use]
    pub fn formation_leader(&self, id: FormationId) -> Option<(usize, ShipId)> {
        self.formations.get(&id).and_then(Formation::leader)
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Forget every ship not in `live`: scouts are cleared and slots freed.
    pub fn retain_live(&mut self, live: &HashSet<ShipId>) {
        for entry in &mut self.teams {
            if entry.scout.is_some_and(|id| !live.contains(&id)) {
                entry.scout = None;
            }
        }
        for formation in self.formations.values_mut() {
            for holder in &mut formation.slots {
                if holder.is_some_and(|id| !live.contains(&id)) {
                    *holder = None;
                }
            }
        }
        self.formations.retain(|_, f| f.member_count() > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ShipId {
        ShipId::new(n)
    }

    #[test]
    fn slot_offsets_alternate_sides() {
        assert_eq!(slot_offset(0, 10.0), Vec3::ZERO);
        assert_eq!(slot_offset(1, 10.0), Vec3::new(-10.0, 10.0, 0.0));
        assert_eq!(slot_offset(2, 10.0), Vec3::new(-10.0, -10.0, 0.0));
        assert_eq!(slot_offset(3, 10.0), Vec3::new(-20.0, 20.0, 0.0));
    }

    #[test]
    fn slots_fill_then_spill_into_new_formation() {
        let mut reg = TeamRegistry::new();
        let slots: Vec<_> = (1..=4).map(|n| reg.assign_slot(Team::Red, id(n), 3, 50.0)).collect();
        assert_eq!(slots[0].slot_index, 0);
        assert_eq!(slots[2].slot_index, 2);
        assert_eq!(slots[0].formation_id, slots[2].formation_id);
        assert_ne!(slots[3].formation_id, slots[0].formation_id);
        assert_eq!(slots[3].slot_index, 0);
        assert_eq!(reg.formation_count(), 2);
    }

    #[test]
    fn teams_never_share_formations() {
        let mut reg = TeamRegistry::new();
        let red = reg.assign_slot(Team::Red, id(1), 6, 50.0);
        let blue = reg.assign_slot(Team::Blue, id(2), 6, 50.0);
        assert_ne!(red.formation_id, blue.formation_id);
        assert_eq!(reg.formation(blue.formation_id).map(Formation::team), Some(Team::Blue));
    }

    #[test]
    fn released_slot_is_reused_without_moving_others() {
        let mut reg = TeamRegistry::new();
        let a = reg.assign_slot(Team::Red, id(1), 6, 50.0);
        let b = reg.assign_slot(Team::Red, id(2), 6, 50.0);
        let c = reg.assign_slot(Team::Red, id(3), 6, 50.0);
        reg.release_slot(id(2), &b);
        assert!(reg.holds_slot(id(1), &a));
        assert!(reg.holds_slot(id(3), &c));

        let d = reg.assign_slot(Team::Red, id(4), 6, 50.0);
        assert_eq!(d.slot_index, b.slot_index);
        assert_eq!(d.position, b.position);
    }

    #[test]
    fn release_by_non_holder_is_ignored() {
        let mut reg = TeamRegistry::new();
        let a = reg.assign_slot(Team::Red, id(1), 6, 50.0);
        reg.release_slot(id(9), &a);
        assert!(reg.holds_slot(id(1), &a));
    }

    #[test]
    fn leader_is_lowest_occupied_slot() {
        let mut reg = TeamRegistry::new();
        let a = reg.assign_slot(Team::Red, id(1), 6, 50.0);
        reg.assign_slot(Team::Red, id(2), 6, 50.0);
        assert_eq!(reg.formation_leader(a.formation_id), Some((0, id(1))));
        reg.release_slot(id(1), &a);
        assert_eq!(reg.formation_leader(a.formation_id), Some((1, id(2))));
    }

    #[test]
    fn retain_live_clears_dead_members() {
        let mut reg = TeamRegistry::new();
        let a = reg.assign_slot(Team::Red, id(1), 6, 50.0);
        reg.set_scout(Team::Red, Some(id(1)), 0.0, 0);
        reg.retain_live(&HashSet::new());
        assert!(reg.scout(Team::Red).is_none());
        assert!(reg.formation(a.formation_id).is_none());
    }

    #[test]
    fn alarm_expires_after_window() {
        let mut reg = TeamRegistry::new();
        reg.raise_alarm(
            Team::Blue,
            Alarm {
                time: 1.0,
                position: Vec3::ZERO,
                source: id(3),
                attacker: Some(id(4)),
            },
        );
        assert!(reg.active_alarm(Team::Blue, 4.0, 4.0).is_some());
        assert!(reg.active_alarm(Team::Blue, 5.5, 4.0).is_none());
        assert!(reg.active_alarm(Team::Red, 2.0, 4.0).is_none());
    }

    #[test]
    fn exploration_rotates_zones() {
        let mut reg = TeamRegistry::new();
        let zones = [Vec3::X, Vec3::Y, Vec3::Z];
        reg.set_scout(Team::Red, Some(id(1)), 10.0, 2);
        assert_eq!(reg.exploration_zone(Team::Red, 10.0, 5.0, &zones), Some(Vec3::Z));
        assert_eq!(reg.exploration_zone(Team::Red, 15.0, 5.0, &zones), Some(Vec3::X));
        assert_eq!(reg.exploration_zone(Team::Red, 21.0, 5.0, &zones), Some(Vec3::Y));
        assert_eq!(reg.exploration_zone(Team::Red, 0.0, 5.0, &[]), None);
    }
}
