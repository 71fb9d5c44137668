//! Voxel downsampling and statistical outlier removal.
//!
//! Raw scans are dense and noisy. Downsampling evens out the density so a
//! single wall patch cannot dominate RANSAC, and outlier removal drops the
//! isolated returns that would otherwise rasterize into phantom obstacles.

use super::PointCloud;
use crate::error::{NavError, Result};
use log::{debug, info};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::Serialize;
use std::collections::HashMap;

/// Cloud cleaning configuration
#[derive(Clone, Debug)]
pub struct CleaningConfig {
    /// Run the cleaning stage at all
    pub enabled: bool,
    /// Voxel edge length in meters (≤ 0 disables downsampling)
    pub voxel_size: f64,
    /// Neighbors used for the mean-distance statistic (0 disables outlier removal)
    pub outlier_neighbors: usize,
    /// Keep points whose mean neighbor distance is within μ + ratio·σ
    pub outlier_std_ratio: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            voxel_size: 0.03,
            outlier_neighbors: 20,
            outlier_std_ratio: 2.5,
        }
    }
}

impl CleaningConfig {
    /// Set the voxel size
    pub fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Set outlier removal parameters
    pub fn with_outlier_removal(mut self, neighbors: usize, std_ratio: f64) -> Self {
        self.outlier_neighbors = neighbors;
        self.outlier_std_ratio = std_ratio;
        self
    }

    /// Configuration that passes clouds through untouched
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !self.voxel_size.is_finite() {
            return Err(NavError::InvalidConfig("voxel_size must be finite".into()));
        }
        if self.outlier_neighbors > 0
            && !(self.outlier_std_ratio.is_finite() && self.outlier_std_ratio > 0.0)
        {
            return Err(NavError::InvalidConfig(format!(
                "outlier_std_ratio must be positive, got {}",
                self.outlier_std_ratio
            )));
        }
        Ok(())
    }
}

/// Point counts through the cleaning stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    /// Points entering the stage
    pub input: usize,
    /// Points after voxel downsampling
    pub after_voxel: usize,
    /// Points after outlier removal
    pub after_outliers: usize,
}

/// Cloud cleaner
#[derive(Clone, Debug)]
pub struct CloudCleaner {
    config: CleaningConfig,
}

type IndexedPoint = GeomWithData<[f64; 3], usize>;

impl CloudCleaner {
    /// Create a cleaner, validating the configuration
    pub fn new(config: CleaningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run downsampling then outlier removal
    pub fn clean(&self, cloud: &PointCloud) -> (PointCloud, CleaningStats) {
        let mut stats = CleaningStats {
            input: cloud.len(),
            after_voxel: cloud.len(),
            after_outliers: cloud.len(),
        };
        if !self.config.enabled {
            return (cloud.clone(), stats);
        }

        let down = if self.config.voxel_size > 0.0 {
            voxel_downsample(cloud, self.config.voxel_size)
        } else {
            cloud.clone()
        };
        stats.after_voxel = down.len();

        let cleaned = if self.config.outlier_neighbors > 0 {
            remove_statistical_outliers(
                &down,
                self.config.outlier_neighbors,
                self.config.outlier_std_ratio,
            )
        } else {
            down
        };
        stats.after_outliers = cleaned.len();

        info!(
            "[Clean] {} -> {} (voxel) -> {} (outliers)",
            stats.input, stats.after_voxel, stats.after_outliers
        );
        (cleaned, stats)
    }
}

#[derive(Default)]
struct VoxelAccum {
    sum: Vector3<f64>,
    color_sum: [u32; 3],
    count: u32,
}

/// Replace the points of every occupied voxel by their centroid.
///
/// Voxels are emitted in order of first appearance; colors are averaged.
pub fn voxel_downsample(cloud: &PointCloud, voxel_size: f64) -> PointCloud {
    let mut slots: HashMap<(i64, i64, i64), usize> = HashMap::new();
    let mut accums: Vec<VoxelAccum> = Vec::new();
    let colors = cloud.colors();

    for (i, p) in cloud.points().iter().enumerate() {
        let key = (
            (p.x / voxel_size).floor() as i64,
            (p.y / voxel_size).floor() as i64,
            (p.z / voxel_size).floor() as i64,
        );
        let slot = *slots.entry(key).or_insert_with(|| {
            accums.push(VoxelAccum::default());
            accums.len() - 1
        });
        let acc = &mut accums[slot];
        acc.sum += p.coords;
        acc.count += 1;
        if let Some(c) = colors {
            for k in 0..3 {
                acc.color_sum[k] += c[i][k] as u32;
            }
        }
    }

    let points: Vec<Point3<f64>> = accums
        .iter()
        .map(|a| Point3::from(a.sum / a.count as f64))
        .collect();

    debug!(
        "[Clean] voxel {:.3} m: {} -> {} points",
        voxel_size,
        cloud.len(),
        points.len()
    );

    match colors {
        Some(_) => {
            let avg: Vec<[u8; 3]> = accums
                .iter()
                .map(|a| a.color_sum.map(|s| (s / a.count) as u8))
                .collect();
            PointCloud {
                points,
                colors: Some(avg),
            }
        }
        None => PointCloud::new(points),
    }
}

/// Drop points whose mean distance to their `k` nearest neighbors exceeds
/// the global mean by more than `std_ratio` standard deviations.
pub fn remove_statistical_outliers(cloud: &PointCloud, k: usize, std_ratio: f64) -> PointCloud {
    if cloud.len() <= k + 1 {
        return cloud.clone();
    }

    let tree: RTree<IndexedPoint> = RTree::bulk_load(
        cloud
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.x, p.y, p.z], i))
            .collect(),
    );

    let mean_dists: Vec<f64> = cloud
        .points()
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let (sum, n) = tree
                .nearest_neighbor_iter_with_distance_2(&[p.x, p.y, p.z])
                .filter(|(item, _)| item.data != i)
                .take(k)
                .fold((0.0, 0usize), |(s, n), (_, d2)| (s + d2.sqrt(), n + 1));
            if n == 0 { 0.0 } else { sum / n as f64 }
        })
        .collect();

    let n = mean_dists.len() as f64;
    let mean = mean_dists.iter().sum::<f64>() / n;
    let var = mean_dists.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let threshold = mean + std_ratio * var.sqrt();

    let keep: Vec<usize> = mean_dists
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d <= threshold)
        .map(|(i, _)| i)
        .collect();

    debug!(
        "[Clean] outliers: k={} mean={:.4} std={:.4} removed {}",
        k,
        mean,
        var.sqrt(),
        cloud.len() - keep.len()
    );
    cloud.select(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dense_patch() -> Vec<[f64; 3]> {
        let mut pts = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                pts.push([i as f64 * 0.05, j as f64 * 0.05, 0.0]);
            }
        }
        pts
    }

    #[test]
    fn test_voxel_centroid() {
        let cloud = PointCloud::from_xyz(&[[0.01, 0.01, 0.0], [0.03, 0.05, 0.0], [0.5, 0.5, 0.5]]);
        let down = voxel_downsample(&cloud, 0.1);
        assert_eq!(down.len(), 2);
        assert_relative_eq!(down.points()[0], Point3::new(0.02, 0.03, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_voxel_averages_colors() {
        let cloud = PointCloud::with_colors(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.01, 0.0, 0.0)],
            vec![[10, 20, 30], [20, 40, 50]],
        )
        .unwrap();
        let down = voxel_downsample(&cloud, 0.1);
        assert_eq!(down.colors(), Some(&[[15, 30, 40]][..]));
    }

    #[test]
    fn test_far_point_removed() {
        let mut pts = dense_patch();
        pts.push([10.0, 10.0, 10.0]);
        let cloud = PointCloud::from_xyz(&pts);
        let cleaned = remove_statistical_outliers(&cloud, 8, 2.0);
        assert_eq!(cleaned.len(), 400);
        assert!(cleaned.points().iter().all(|p| p.x < 5.0));
    }

    #[test]
    fn test_disabled_passthrough() {
        let cloud = PointCloud::from_xyz(&dense_patch());
        let cleaner = CloudCleaner::new(CleaningConfig::disabled()).unwrap();
        let (out, stats) = cleaner.clean(&cloud);
        assert_eq!(out, cloud);
        assert_eq!(stats.after_outliers, 400);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let config = CleaningConfig::default().with_outlier_removal(10, -1.0);
        assert!(CloudCleaner::new(config).is_err());
    }
}
