//! Cloud cleaning configuration section.

use serde::{Deserialize, Serialize};

use crate::cloud::CleaningConfig;

use super::defaults;

/// Cleaning settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CleaningSection {
    /// Run voxel downsampling and outlier removal
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Voxel edge length (meters, 0 = no downsampling)
    #[serde(default = "defaults::voxel_size")]
    pub voxel_size: f64,

    /// Neighbors for the outlier statistic (0 = no outlier removal)
    #[serde(default = "defaults::outlier_neighbors")]
    pub outlier_neighbors: usize,

    /// Standard deviations above the mean neighbor distance to keep
    #[serde(default = "defaults::outlier_std_ratio")]
    pub outlier_std_ratio: f64,
}

impl Default for CleaningSection {
    fn default() -> Self {
        Self {
            enabled: true,
            voxel_size: 0.03,
            outlier_neighbors: 20,
            outlier_std_ratio: 2.5,
        }
    }
}

impl CleaningSection {
    /// Convert to CleaningConfig
    pub fn to_cleaning_config(&self) -> CleaningConfig {
        CleaningConfig {
            enabled: self.enabled,
            voxel_size: self.voxel_size,
            outlier_neighbors: self.outlier_neighbors,
            outlier_std_ratio: self.outlier_std_ratio,
        }
    }
}
