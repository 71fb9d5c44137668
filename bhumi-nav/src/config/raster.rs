//! Rasterization configuration section.

use serde::{Deserialize, Serialize};

use crate::grid::{KernelShape, RasterConfig};

use super::defaults;

/// Raster settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RasterSection {
    /// Cell size (meters)
    #[serde(default = "defaults::resolution")]
    pub resolution: f64,

    /// Obstacle clearance (meters, 0 = no inflation)
    #[serde(default = "defaults::inflation_radius")]
    pub inflation_radius: f64,

    /// Free border around the points (cells)
    #[serde(default = "defaults::margin_cells")]
    pub margin_cells: usize,

    /// Closing element edge (cells)
    #[serde(default = "defaults::closing_kernel")]
    pub closing_kernel: usize,

    /// "square" or "disk"
    #[serde(default = "defaults::inflation_shape")]
    pub inflation_shape: KernelShape,

    /// Occupied ratio range outside which a warning is raised
    #[serde(default = "defaults::occupied_ratio_warn")]
    pub occupied_ratio_warn: [f64; 2],

    /// Parallel cell marking
    #[serde(default = "defaults::enabled")]
    pub parallel: bool,

    /// Grid size limit (cells)
    #[serde(default = "defaults::max_cells")]
    pub max_cells: usize,
}

impl Default for RasterSection {
    fn default() -> Self {
        Self {
            resolution: 0.10,
            inflation_radius: 0.30,
            margin_cells: 2,
            closing_kernel: 3,
            inflation_shape: KernelShape::Square,
            occupied_ratio_warn: [0.01, 0.9],
            parallel: true,
            max_cells: defaults::max_cells(),
        }
    }
}

impl RasterSection {
    /// Convert to RasterConfig
    pub fn to_raster_config(&self) -> RasterConfig {
        RasterConfig {
            resolution: self.resolution,
            inflation_radius: self.inflation_radius,
            margin_cells: self.margin_cells,
            closing_kernel: self.closing_kernel,
            inflation_shape: self.inflation_shape,
            occupied_ratio_warn: (self.occupied_ratio_warn[0], self.occupied_ratio_warn[1]),
            parallel: self.parallel,
            max_cells: self.max_cells,
        }
    }
}
