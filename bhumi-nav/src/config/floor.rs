//! Floor detection configuration section.

use serde::{Deserialize, Serialize};

use crate::floor::{FloorConfig, RansacConfig, RansacPass};

use super::defaults;

/// One RANSAC pass
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RansacPassSettings {
    /// Inlier distance (meters)
    pub distance_threshold: f64,
    /// Trials
    pub iterations: usize,
    /// Required inlier fraction (0-1)
    pub min_inlier_fraction: f64,
}

impl Default for RansacPassSettings {
    fn default() -> Self {
        Self {
            distance_threshold: defaults::primary_distance(),
            iterations: defaults::primary_iterations(),
            min_inlier_fraction: defaults::primary_min_fraction(),
        }
    }
}

impl From<RansacPassSettings> for RansacPass {
    fn from(s: RansacPassSettings) -> Self {
        RansacPass::new(s.distance_threshold, s.iterations, s.min_inlier_fraction)
    }
}

/// Floor settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FloorSection {
    /// Fewer input points than this fails the build
    #[serde(default = "defaults::floor_min_points")]
    pub min_points: usize,

    /// Strict pass
    #[serde(default)]
    pub primary: RansacPassSettings,

    /// Fallback pass (null = no fallback)
    #[serde(default = "defaults::relaxed_pass")]
    pub relaxed: Option<RansacPassSettings>,

    /// Height percentile placed at z = 0
    #[serde(default = "defaults::floor_percentile")]
    pub floor_percentile: f64,

    /// Steeper candidate planes are ignored (degrees)
    #[serde(default = "defaults::max_tilt_degrees")]
    pub max_tilt_degrees: f64,

    /// Fixed RNG seed for reproducible builds
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for FloorSection {
    fn default() -> Self {
        Self {
            min_points: 100,
            primary: RansacPassSettings::default(),
            relaxed: defaults::relaxed_pass(),
            floor_percentile: 5.0,
            max_tilt_degrees: 45.0,
            seed: None,
        }
    }
}

impl FloorSection {
    /// Convert to FloorConfig
    pub fn to_floor_config(&self) -> FloorConfig {
        let mut ransac = RansacConfig::default()
            .with_primary(self.primary.into())
            .with_relaxed(self.relaxed.map(Into::into))
            .with_max_tilt_degrees(self.max_tilt_degrees);
        ransac.seed = self.seed;
        FloorConfig {
            min_points: self.min_points,
            ransac,
            floor_percentile: self.floor_percentile,
        }
    }
}
