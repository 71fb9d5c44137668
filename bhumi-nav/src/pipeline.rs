//! Map build pipeline: raw points to occupancy grid.
//!
//! ```text
//! cloud -> clean -> level floor -> slice band -> rasterize -> GridMap
//! ```
//!
//! Each stage is a pure transformation. A stage failure aborts the build and
//! carries the counts that caused it.

use crate::cloud::{CleaningConfig, CloudCleaner, PointCloud};
use crate::core::CancelToken;
use crate::diagnostics::{BuildDiagnostics, BuildWarning};
use crate::error::{NavError, Result};
use crate::floor::{FloorAlignment, FloorConfig, FloorNormalizer};
use crate::grid::{GridMap, GridRasterizer, RasterConfig};
use crate::slice::{HeightSlicer, SliceConfig};
use log::{info, warn};

/// Runtime configuration of every build stage
#[derive(Clone, Debug, Default)]
pub struct BuildConfig {
    /// Voxel downsampling and outlier removal
    pub cleaning: CleaningConfig,
    /// Floor detection and leveling
    pub floor: FloorConfig,
    /// Height band
    pub slice: SliceConfig,
    /// Rasterization and inflation
    pub raster: RasterConfig,
}

/// Output of a successful build
#[derive(Clone, Debug)]
pub struct MapBuild {
    /// Final inflated grid
    pub grid: GridMap,
    /// Counts and settings for operators
    pub diagnostics: BuildDiagnostics,
    /// How the cloud was leveled
    pub alignment: FloorAlignment,
}

impl MapBuild {
    /// Non-fatal issues raised during the build
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.diagnostics.warnings
    }
}

/// Runs the build stages in order
#[derive(Clone, Debug)]
pub struct MapBuilder {
    config: BuildConfig,
    cleaner: CloudCleaner,
    normalizer: FloorNormalizer,
    slicer: HeightSlicer,
    rasterizer: GridRasterizer,
}

impl MapBuilder {
    /// Create a builder, validating every stage configuration
    pub fn new(config: BuildConfig) -> Result<Self> {
        Ok(Self {
            cleaner: CloudCleaner::new(config.cleaning.clone())?,
            normalizer: FloorNormalizer::new(config.floor.clone())?,
            slicer: HeightSlicer::new(config.slice.clone())?,
            rasterizer: GridRasterizer::new(config.raster.clone())?,
            config,
        })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(BuildConfig::default())
    }

    /// Configuration in use
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build a grid from a raw cloud
    pub fn build(&self, cloud: &PointCloud, cancel: &CancelToken) -> Result<MapBuild> {
        let initial_point_count = cloud.len();
        let cloud = cloud.finite_only();
        if cloud.len() < initial_point_count {
            warn!(
                "[Build] Dropped {} non-finite points",
                initial_point_count - cloud.len()
            );
        }
        if cloud.len() < self.config.floor.min_points {
            return Err(NavError::Validation {
                stage: "ingest",
                count: cloud.len(),
                minimum: self.config.floor.min_points,
            });
        }

        let (cleaned, cleaning) = self.cleaner.clean(&cloud);
        cancel.check("cleaning")?;

        let (leveled, alignment) = self.normalizer.normalize(&cleaned, cancel)?;
        let sliced = self.slicer.slice(&leveled)?;
        cancel.check("slicing")?;

        let raster = self.rasterizer.rasterize(&sliced)?;
        let grid = raster.grid;

        let mut warnings = Vec::new();
        if alignment.relaxed {
            warnings.push(BuildWarning::RelaxedFloorFit {
                inlier_ratio: alignment.inlier_count as f64 / cleaned.len() as f64,
            });
        }
        warnings.extend(raster.warnings);

        let (min, max) = grid.bounds();
        let diagnostics = BuildDiagnostics {
            initial_point_count,
            points_after_cleaning: cleaning.after_outliers,
            floor_inlier_count: alignment.inlier_count,
            points_in_slice: sliced.len(),
            grid_width: grid.width(),
            grid_height: grid.height(),
            occupied_ratio: raster.stats.occupied_ratio,
            resolution: grid.resolution(),
            inflation_radius: self.config.raster.inflation_radius,
            z_slice: [self.config.slice.z_min, self.config.slice.z_max],
            origin: [min.x, min.y],
            extent_m: [max.x - min.x, max.y - min.y],
            clipped_points: raster.stats.clipped_points,
            raw_occupied_cells: raster.stats.raw_occupied,
            floor_tilt_degrees: alignment.rotation_angle().to_degrees(),
            z_offset: alignment.z_offset,
            floor_relaxed: alignment.relaxed,
            warnings,
        };

        info!(
            "[Build] {} points -> {} cleaned -> {} floor inliers -> {} in slice -> {}x{} grid ({:.1}% occupied, {} warnings)",
            diagnostics.initial_point_count,
            diagnostics.points_after_cleaning,
            diagnostics.floor_inlier_count,
            diagnostics.points_in_slice,
            diagnostics.grid_width,
            diagnostics.grid_height,
            diagnostics.occupied_ratio * 100.0,
            diagnostics.warnings.len()
        );

        Ok(MapBuild {
            grid,
            diagnostics,
            alignment,
        })
    }
}
