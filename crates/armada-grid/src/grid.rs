//! Uniform bucket grid storage.
//!
//! The grid divides its bounds into cubic cells of a configurable size. Each
//! occupied cell stores the ids of the entities whose position falls into it;
//! the entity copies themselves live in a side table keyed by id so that
//! `remove` and `update` are O(1) amortized.
//!
//! Positions outside the bounds are clamped into the edge cells. Clamping is
//! monotone per axis, so a query whose sphere reaches an out-of-bounds entity
//! always overlaps that entity's (clamped) cell and stays exact.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::stats::GridStats;
use crate::{Bounds, GridError, SpatialEntity, TeamId};

/// Upper bound on cells per axis. Larger requests widen the effective cell.
pub const MAX_CELLS_PER_AXIS: u32 = 1024;

/// Initial capacity for entity vectors within cells
const CELL_INITIAL_CAPACITY: usize = 8;

/// Integer cell coordinates `(x, y, z)`.
pub type CellKey = (u32, u32, u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    entity: SpatialEntity,
    cell: CellKey,
}

/// Uniform 3D bucket grid over a bounded volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialGrid {
    bounds: Bounds,
    /// Effective cell edge length (may exceed the requested size on huge bounds)
    cell_size: f32,
    inv_cell_size: f32,
    dims: [u32; 3],
    cells: HashMap<CellKey, Vec<u64>>,
    entries: HashMap<u64, Slot>,
}

impl SpatialGrid {
    /// Create a grid, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidCellSize`] for a non-finite or non-positive
    /// cell size and [`GridError::InvalidBounds`] for degenerate bounds.
    pub fn try_new(bounds: Bounds, cell_size: f32) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        bounds.validate()?;

        let size = bounds.size();
        let widest = size.max_element();
        // Keep the per-axis cell count bounded on very large arenas.
        #[allow(clippy::cast_precision_loss)]
        let cell_size = cell_size.max(widest / MAX_CELLS_PER_AXIS as f32);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let axis = |extent: f32| ((extent / cell_size).ceil() as u32).clamp(1, MAX_CELLS_PER_AXIS);

        Ok(Self {
            bounds,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            dims: [axis(size.x), axis(size.y), axis(size.z)],
            cells: HashMap::new(),
            entries: HashMap::new(),
        })
    }

    /// Create a grid, falling back to safe values for a bad configuration.
    ///
    /// Invalid cell sizes fall back to the widest bounds extent (a single
    /// cell); invalid bounds fall back to [`Bounds::default`].
    #[must_use]
    pub fn new(bounds: Bounds, cell_size: f32) -> Self {
        match Self::try_new(bounds, cell_size) {
            Ok(grid) => grid,
            Err(err) => {
                tracing::warn!(%err, "spatial grid config rejected, using fallback");
                let bounds = if bounds.validate().is_ok() {
                    bounds
                } else {
                    Bounds::default()
                };
                let fallback = bounds.size().max_element().max(1.0);
                Self::try_new(bounds, fallback).unwrap_or_else(|_| Self::single_cell())
            }
        }
    }

    fn single_cell() -> Self {
        Self {
            bounds: Bounds::default(),
            cell_size: 1000.0,
            inv_cell_size: 1.0 / 1000.0,
            dims: [1, 1, 1],
            cells: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// Bounds covered by the grid.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Effective cell edge length.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of cells per axis.
    #[must_use]
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// Number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entity is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored copy of an entity, if present.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&SpatialEntity> {
        self.entries.get(&id).map(|slot| &slot.entity)
    }

    /// True when an entity with `id` is stored.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Convert a world position into clamped cell coordinates.
    #[must_use]
    pub fn cell_of(&self, pos: Vec3) -> CellKey {
        let local = (pos - self.bounds.min) * self.inv_cell_size;
        (
            Self::axis_index(local.x, self.dims[0]),
            Self::axis_index(local.y, self.dims[1]),
            Self::axis_index(local.z, self.dims[2]),
        )
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn axis_index(local: f32, dim: u32) -> u32 {
        // `as` saturates: -inf -> 0, +inf -> u32::MAX, NaN -> 0.
        let raw = local.floor().max(0.0) as u32;
        raw.min(dim - 1)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert an entity, replacing any entry with the same id.
    ///
    /// Returns `false` (and stores nothing) when the position is not finite.
    pub fn insert(&mut self, entity: SpatialEntity) -> bool {
        if !entity.pos.is_finite() {
            self.remove(entity.id);
            return false;
        }
        let cell = self.cell_of(entity.pos);
        match self.entries.get_mut(&entity.id) {
            Some(slot) => {
                let old = slot.cell;
                slot.entity = entity;
                slot.cell = cell;
                if old != cell {
                    Self::detach(&mut self.cells, old, entity.id);
                    Self::attach(&mut self.cells, cell, entity.id);
                }
            }
            None => {
                self.entries.insert(entity.id, Slot { entity, cell });
                Self::attach(&mut self.cells, cell, entity.id);
            }
        }
        true
    }

    /// Remove an entity by id, returning the stored copy.
    pub fn remove(&mut self, id: u64) -> Option<SpatialEntity> {
        let slot = self.entries.remove(&id)?;
        Self::detach(&mut self.cells, slot.cell, id);
        Some(slot.entity)
    }

    /// Update an existing entity, moving it between cells when needed.
    ///
    /// Returns `false` if the id is unknown. A non-finite position removes the
    /// entity and also returns `false`.
    pub fn update(&mut self, id: u64, pos: Vec3, radius: f32, team: TeamId) -> bool {
        if !self.entries.contains_key(&id) {
            return false;
        }
        self.insert(SpatialEntity::new(id, pos, radius, team))
    }

    /// Replace the whole contents with `entities`.
    pub fn rebuild<'a>(&mut self, entities: impl IntoIterator<Item = &'a SpatialEntity>) {
        self.clear();
        for entity in entities {
            self.insert(*entity);
        }
    }

    /// Remove every entity (cell allocations are kept for reuse).
    pub fn clear(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear();
        }
        self.entries.clear();
    }

    /// Drop every entry whose id is not in `active`.
    ///
    /// Returns the number of entries removed.
    pub fn gc_except(&mut self, active: &HashSet<u64>) -> usize {
        let mut stale: Vec<u64> = self
            .entries
            .keys()
            .filter(|id| !active.contains(id))
            .copied()
            .collect();
        stale.sort_unstable();
        for id in &stale {
            self.remove(*id);
        }
        stale.len()
    }

    fn attach(cells: &mut HashMap<CellKey, Vec<u64>>, cell: CellKey, id: u64) {
        cells
            .entry(cell)
            .or_insert_with(|| Vec::with_capacity(CELL_INITIAL_CAPACITY))
            .push(id);
    }

    fn detach(cells: &mut HashMap<CellKey, Vec<u64>>, cell: CellKey, id: u64) {
        if let Some(ids) = cells.get_mut(&cell) {
            if let Some(index) = ids.iter().position(|&other| other == id) {
                ids.swap_remove(index);
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Visit every entity within `radius` of `center`.
    ///
    /// Only cells overlapping the query sphere's bounding box are scanned.
    /// Visit order is deterministic for a given sequence of mutations.
    pub fn for_each_in_radius(&self, center: Vec3, radius: f32, mut visit: impl FnMut(&SpatialEntity)) {
        // NaN radius fails this comparison too.
        if !center.is_finite() || !(radius >= 0.0) {
            return;
        }
        let radius_sq = radius * radius;
        let lo = self.cell_of(center - Vec3::splat(radius));
        let hi = self.cell_of(center + Vec3::splat(radius));

        let mut check = |ids: &Vec<u64>| {
            for id in ids {
                if let Some(slot) = self.entries.get(id) {
                    if slot.entity.pos.distance_squared(center) <= radius_sq {
                        visit(&slot.entity);
                    }
                }
            }
        };

        let span = u64::from(hi.0 - lo.0 + 1) * u64::from(hi.1 - lo.1 + 1) * u64::from(hi.2 - lo.2 + 1);
        if span > self.cells.len() as u64 {
            // Sparse occupancy: walk occupied cells in key order instead.
            let mut keys: Vec<&CellKey> = self
                .cells
                .iter()
                .filter(|(key, ids)| !ids.is_empty() && Self::key_in(**key, lo, hi))
                .map(|(key, _)| key)
                .collect();
            keys.sort_unstable();
            for key in keys {
                check(&self.cells[key]);
            }
            return;
        }

        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    if let Some(ids) = self.cells.get(&(x, y, z)) {
                        check(ids);
                    }
                }
            }
        }
    }

    fn key_in(key: CellKey, lo: CellKey, hi: CellKey) -> bool {
        (lo.0..=hi.0).contains(&key.0) && (lo.1..=hi.1).contains(&key.1) && (lo.2..=hi.2).contains(&key.2)
    }

    /// Every entity within `radius` of `pos`.
    #[must_use]
    pub fn query_radius(&self, pos: Vec3, radius: f32) -> Vec<SpatialEntity> {
        let mut out = Vec::new();
        self.for_each_in_radius(pos, radius, |e| out.push(*e));
        out
    }

    /// Same-team entities within `radius` of `pos`, optionally excluding one id.
    #[must_use]
    pub fn query_neighbors(
        &self,
        pos: Vec3,
        radius: f32,
        team: TeamId,
        exclude: Option<u64>,
    ) -> Vec<SpatialEntity> {
        let mut out = Vec::new();
        self.for_each_in_radius(pos, radius, |e| {
            if e.team == team && Some(e.id) != exclude {
                out.push(*e);
            }
        });
        out
    }

    /// Entities of any other team within `radius` of `pos`.
    #[must_use]
    pub fn query_enemies(&self, pos: Vec3, radius: f32, team: TeamId) -> Vec<SpatialEntity> {
        let mut out = Vec::new();
        self.for_each_in_radius(pos, radius, |e| {
            if e.team != team {
                out.push(*e);
            }
        });
        out
    }

    /// Occupancy statistics.
    #[must_use]
    pub fn stats(&self) -> GridStats {
        let occupied = self.cells.values().filter(|ids| !ids.is_empty());
        let (occupied_cells, max_cell_occupancy) =
            occupied.fold((0, 0), |(count, max), ids| (count + 1, max.max(ids.len())));
        GridStats {
            entity_count: self.entries.len(),
            occupied_cells,
            max_cell_occupancy,
            dims: self.dims,
            cell_size: self.cell_size,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
