//! Height-band slicing of a floor-normalized cloud.

use crate::cloud::PointCloud;
use crate::error::{NavError, Result};
use log::{debug, info};

/// Height band configuration
#[derive(Clone, Debug)]
pub struct SliceConfig {
    /// Lowest kept height above the floor (meters)
    pub z_min: f64,
    /// Highest kept height above the floor (meters)
    pub z_max: f64,
    /// Fewer survivors than this fails the build
    pub min_points: usize,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            z_min: 0.10,
            z_max: 2.20,
            min_points: 10,
        }
    }
}

impl SliceConfig {
    /// Band [z_min, z_max] with the default minimum count
    pub fn band(z_min: f64, z_max: f64) -> Self {
        Self {
            z_min,
            z_max,
            ..Default::default()
        }
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.z_min.is_finite() && self.z_max.is_finite()) {
            return Err(NavError::InvalidConfig("slice bounds must be finite".into()));
        }
        if self.z_min > self.z_max {
            return Err(NavError::InvalidConfig(format!(
                "slice z_min {} is above z_max {}",
                self.z_min, self.z_max
            )));
        }
        Ok(())
    }
}

/// Keeps points whose height lies inside a band
#[derive(Clone, Debug)]
pub struct HeightSlicer {
    config: SliceConfig,
}

impl HeightSlicer {
    /// Create a slicer, validating the configuration
    pub fn new(config: SliceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Points with `z_min ≤ z ≤ z_max`
    pub fn slice(&self, cloud: &PointCloud) -> Result<PointCloud> {
        let (lo, hi) = (self.config.z_min, self.config.z_max);
        let sliced = cloud.filtered(|p| p.z >= lo && p.z <= hi);
        if sliced.len() < self.config.min_points {
            debug!(
                "[Slice] FAILED: {} points in [{:.2}, {:.2}], need {}",
                sliced.len(),
                lo,
                hi,
                self.config.min_points
            );
            return Err(NavError::Validation {
                stage: "slice",
                count: sliced.len(),
                minimum: self.config.min_points,
            });
        }
        info!(
            "[Slice] {} of {} points in [{:.2}, {:.2}] m",
            sliced.len(),
            cloud.len(),
            lo,
            hi
        );
        Ok(sliced)
    }
}
