//! Floor normalization: level the cloud and put the floor at z = 0.

use super::PlaneModel;
use super::ransac::{RansacConfig, fit_plane};
use crate::cloud::PointCloud;
use crate::core::CancelToken;
use crate::error::{NavError, Result};
use log::{debug, info};
use nalgebra::{Matrix3, Vector3};

/// Below this |n × z| the normal is treated as already vertical.
const PARALLEL_EPS: f64 = 1e-12;

/// Floor normalization configuration
#[derive(Clone, Debug)]
pub struct FloorConfig {
    /// Reject clouds smaller than this
    pub min_points: usize,
    /// Plane fitting parameters
    pub ransac: RansacConfig,
    /// Height percentile (0-100) that becomes z = 0 after leveling
    pub floor_percentile: f64,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            min_points: 100,
            ransac: RansacConfig::default(),
            floor_percentile: 5.0,
        }
    }
}

impl FloorConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.min_points < 3 {
            return Err(NavError::InvalidConfig(format!(
                "floor min_points must be at least 3, got {}",
                self.min_points
            )));
        }
        if !(0.0..=100.0).contains(&self.floor_percentile) {
            return Err(NavError::InvalidConfig(format!(
                "floor_percentile must be in [0, 100], got {}",
                self.floor_percentile
            )));
        }
        self.ransac.validate()
    }
}

/// How a cloud was leveled
#[derive(Clone, Debug)]
pub struct FloorAlignment {
    /// Detected floor plane in the input frame
    pub plane: PlaneModel,
    /// Rotation taking the plane normal onto +Z
    pub rotation: Matrix3<f64>,
    /// Vertical shift applied after rotation
    pub z_offset: f64,
    /// Points supporting the plane
    pub inlier_count: usize,
    /// Whether the relaxed RANSAC pass was needed
    pub relaxed: bool,
}

impl FloorAlignment {
    /// Rotation angle in radians
    pub fn rotation_angle(&self) -> f64 {
        ((self.rotation.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
    }
}

/// Detects the floor and levels the cloud onto it
#[derive(Clone, Debug)]
pub struct FloorNormalizer {
    config: FloorConfig,
}

impl FloorNormalizer {
    /// Create a normalizer, validating the configuration
    pub fn new(config: FloorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fit the floor, rotate it onto z = 0 and shift the low percentile to 0.
    pub fn normalize(
        &self,
        cloud: &PointCloud,
        cancel: &CancelToken,
    ) -> Result<(PointCloud, FloorAlignment)> {
        if cloud.len() < self.config.min_points {
            debug!(
                "[Floor] FAILED: {} points, need {}",
                cloud.len(),
                self.config.min_points
            );
            return Err(NavError::Validation {
                stage: "floor",
                count: cloud.len(),
                minimum: self.config.min_points,
            });
        }

        let fit = fit_plane(cloud.points(), &self.config.ransac, cancel)?;
        let rotation = rotation_to_z(&fit.plane.normal);

        let mut heights: Vec<f64> = cloud
            .points()
            .iter()
            .map(|p| (rotation * p.coords).z)
            .collect();
        let floor_z = percentile(&mut heights, self.config.floor_percentile);
        let z_offset = -floor_z;

        let normalized = cloud.transformed(&rotation, &Vector3::new(0.0, 0.0, z_offset));

        let alignment = FloorAlignment {
            inlier_count: fit.plane.inliers.len(),
            plane: fit.plane,
            rotation,
            z_offset,
            relaxed: fit.relaxed,
        };
        info!(
            "[Floor] Leveled by {:.2}°, shifted z by {:.3} m",
            alignment.rotation_angle().to_degrees(),
            z_offset
        );
        Ok((normalized, alignment))
    }
}

/// Rotation taking unit vector `normal` onto +Z.
///
/// Rodrigues form `R = I + [v]× + [v]×² (1 − c) / s²` with `v = n × z`,
/// `s = |v|`, `c = n · z`.
pub fn rotation_to_z(normal: &Vector3<f64>) -> Matrix3<f64> {
    let n = normal.normalize();
    let z = Vector3::z();
    let v = n.cross(&z);
    let s2 = v.norm_squared();
    let c = n.dot(&z);
    if s2 < PARALLEL_EPS {
        return if c > 0.0 {
            Matrix3::identity()
        } else {
            Matrix3::from_diagonal(&Vector3::new(1.0, -1.0, -1.0))
        };
    }
    let vx = v.cross_matrix();
    Matrix3::identity() + vx + vx * vx * ((1.0 - c) / s2)
}

/// Linear-interpolated percentile (0-100). Sorts `values` in place.
///
/// Rank `p/100 · (n − 1)` between the neighboring order statistics.
pub fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let rank = (p / 100.0).clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    values[lo] + (values[hi] - values[lo]) * frac
}
