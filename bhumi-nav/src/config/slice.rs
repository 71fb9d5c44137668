//! Height band configuration section.

use serde::{Deserialize, Serialize};

use crate::slice::SliceConfig;

use super::defaults;

/// Slice settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SliceSection {
    /// Lowest kept height above the floor (meters)
    #[serde(default = "defaults::z_min")]
    pub z_min: f64,

    /// Highest kept height above the floor (meters)
    #[serde(default = "defaults::z_max")]
    pub z_max: f64,

    /// Fewer points in the band fails the build
    #[serde(default = "defaults::slice_min_points")]
    pub min_points: usize,
}

impl Default for SliceSection {
    fn default() -> Self {
        Self {
            z_min: 0.10,
            z_max: 2.20,
            min_points: 10,
        }
    }
}

impl SliceSection {
    /// Convert to SliceConfig
    pub fn to_slice_config(&self) -> SliceConfig {
        SliceConfig {
            z_min: self.z_min,
            z_max: self.z_max,
            min_points: self.min_points,
        }
    }
}
