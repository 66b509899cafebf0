//! Grid occupancy statistics for telemetry.

use serde::{Deserialize, Serialize};

/// Snapshot of grid occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    /// Number of stored entities
    pub entity_count: usize,
    /// Number of cells holding at least one entity
    pub occupied_cells: usize,
    /// Largest number of entities in a single cell
    pub max_cell_occupancy: usize,
    /// Cells per axis
    pub dims: [u32; 3],
    /// Effective cell edge length
    pub cell_size: f32,
}

impl GridStats {
    /// Mean entities per occupied cell (0 for an empty grid).
    #[must_use]
    pub fn mean_occupancy(&self) -> f32 {
        if self.occupied_cells == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.entity_count as f32 / self.occupied_cells as f32;
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_occupancy_handles_empty() {
        let stats = GridStats {
            entity_count: 0,
            occupied_cells: 0,
            max_cell_occupancy: 0,
            dims: [1, 1, 1],
            cell_size: 10.0,
        };
        assert_eq!(stats.mean_occupancy(), 0.0);
    }

    #[test]
    fn stats_serialize() {
        let stats = GridStats {
            entity_count: 6,
            occupied_cells: 3,
            max_cell_occupancy: 4,
            dims: [2, 2, 2],
            cell_size: 50.0,
        };
        assert_eq!(stats.mean_occupancy(), 2.0);
        let json = serde_json::to_string(&stats).unwrap();
        let back: GridStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, back);
    }
}
