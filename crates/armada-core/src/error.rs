//! Error types for the fallible setup paths.
//!
//! Only construction and config loading can fail. The per-tick update never
//! returns an error; bad per-ship data is skipped and bad tunables are clamped.

use armada_grid::GridError;
use thiserror::Error;

/// Failure to build a controller from its configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Behavior config was not valid JSON for the expected shape.
    #[error("failed to parse behavior config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Bounds or cell size cannot back a spatial grid.
    #[error("invalid spatial grid configuration: {0}")]
    Grid(#[from] GridError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_errors_convert() {
        let err: ConfigError = GridError::InvalidCellSize(0.0).into();
        assert!(matches!(err, ConfigError::Grid(GridError::InvalidCellSize(_))));
        assert!(err.to_string().contains("invalid cell size"));
    }
}
