//! Configuration types for grid rasterization.

use super::KernelShape;
use crate::error::{NavError, Result};

/// Float slack when turning a radius into a whole number of cells
const CELL_ROUNDING_EPS: f64 = 1e-9;

/// Rasterization configuration
#[derive(Clone, Debug)]
pub struct RasterConfig {
    /// Meters per cell (e.g., 0.10 = 10cm cells)
    pub resolution: f64,

    /// Obstacle clearance radius in meters (0 disables inflation)
    pub inflation_radius: f64,

    /// Free cells added around the point bounding box on every side
    pub margin_cells: usize,

    /// Edge length of the square closing element (0 or 1 disables closing)
    pub closing_kernel: usize,

    /// Shape of the inflation kernel
    pub inflation_shape: KernelShape,

    /// Occupied ratios outside [low, high] raise a warning
    pub occupied_ratio_warn: (f64, f64),

    /// Mark cells from point batches in parallel
    pub parallel: bool,

    /// Largest grid (width x height) a build may allocate
    pub max_cells: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            resolution: 0.10,    // 10cm cells
            inflation_radius: 0.30,
            margin_cells: 2,
            closing_kernel: 3,
            inflation_shape: KernelShape::Square,
            occupied_ratio_warn: (0.01, 0.9),
            parallel: true,
            max_cells: 50_000_000, // ~700 m square at 10cm
        }
    }
}

impl RasterConfig {
    /// Builder-style setter for resolution.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Builder-style setter for inflation radius.
    pub fn with_inflation_radius(mut self, radius: f64) -> Self {
        self.inflation_radius = radius;
        self
    }

    /// Builder-style setter for the grid size limit.
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Builder-style setter for inflation kernel shape.
    pub fn with_inflation_shape(mut self, shape: KernelShape) -> Self {
        self.inflation_shape = shape;
        self
    }

    /// Inflation radius in whole cells, `ceil(radius / resolution)`
    pub fn inflation_cells(&self) -> usize {
        if self.inflation_radius <= 0.0 {
            return 0;
        }
        (self.inflation_radius / self.resolution - CELL_ROUNDING_EPS).ceil() as usize
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if !(self.inflation_radius.is_finite() && self.inflation_radius >= 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "inflation_radius must be non-negative, got {}",
                self.inflation_radius
            )));
        }
        if self.margin_cells < 1 {
            return Err(NavError::InvalidConfig(
                "margin_cells must be at least 1".into(),
            ));
        }
        if self.max_cells == 0 {
            return Err(NavError::InvalidConfig(
                "max_cells must be at least 1".into(),
            ));
        }
        let (low, high) = self.occupied_ratio_warn;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
            return Err(NavError::InvalidConfig(format!(
                "occupied_ratio_warn must be an ordered range in [0, 1], got [{}, {}]",
                low, high
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflation_cells_rounds_up() {
        let config = RasterConfig::default();
        assert_eq!(config.inflation_cells(), 3);
        assert_eq!(config.clone().with_inflation_radius(0.25).inflation_cells(), 3);
        assert_eq!(config.clone().with_inflation_radius(0.0).inflation_cells(), 0);
        let coarse = RasterConfig::default()
            .with_resolution(0.3)
            .with_inflation_radius(0.9);
        assert_eq!(coarse.inflation_cells(), 3);
    }

    #[test]
    fn test_validation() {
        assert!(RasterConfig::default().validate().is_ok());
        assert!(RasterConfig::default().with_resolution(0.0).validate().is_err());
        assert!(
            RasterConfig::default()
                .with_inflation_radius(-1.0)
                .validate()
                .is_err()
        );
        let config = RasterConfig {
            margin_cells: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(RasterConfig::default().with_max_cells(0).validate().is_err());
    }
}
