//! Point cloud to occupancy grid rasterization.
//!
//! Marking is a monotone OR over cells: a point can only turn a cell
//! occupied, never free. That makes it safe to mark from point batches in
//! parallel with one atomic OR per cell.

use super::morphology::{close, dilate, inflation_kernel, square_kernel};
use super::{GridMap, OccupancyMask, RasterConfig};
use crate::cloud::PointCloud;
use crate::core::WorldPoint;
use crate::diagnostics::BuildWarning;
use crate::error::{NavError, Result};
use log::{debug, info, warn};
use nalgebra::Point3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Placement of a grid in the world
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridFrame {
    /// Lower-left corner
    pub origin: WorldPoint,
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
}

impl GridFrame {
    /// Cell for (x, y) clamped into the frame, with whether clamping was
    /// needed. `None` for non-finite coordinates.
    #[inline]
    fn locate(&self, x: f64, y: f64, resolution: f64) -> Option<(usize, bool)> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let col = ((x - self.origin.x) / resolution).floor();
        let up = ((y - self.origin.y) / resolution).floor();
        let max_col = (self.width - 1) as f64;
        let max_up = (self.height - 1) as f64;
        let clipped = !(0.0..=max_col).contains(&col) || !(0.0..=max_up).contains(&up);
        let col = col.clamp(0.0, max_col) as usize;
        let row = self.height - 1 - up.clamp(0.0, max_up) as usize;
        Some((row * self.width + col, clipped))
    }
}

/// Counts from one rasterization
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterStats {
    /// Points offered
    pub points: usize,
    /// Points outside the frame, marked on its nearest edge cell
    pub clipped_points: usize,
    /// Cells marked directly by points
    pub raw_occupied: usize,
    /// Occupied cells after closing
    pub closed_occupied: usize,
    /// Occupied cells after inflation
    pub inflated_occupied: usize,
    /// Inflation radius in cells
    pub inflation_cells: usize,
    /// Occupied fraction of the final grid
    pub occupied_ratio: f64,
}

/// Rasterized grid with its statistics
#[derive(Clone, Debug)]
pub struct RasterOutput {
    /// Final inflated grid
    pub grid: GridMap,
    /// Mask before closing and inflation
    pub raw: OccupancyMask,
    /// Counts
    pub stats: RasterStats,
    /// Non-fatal issues
    pub warnings: Vec<BuildWarning>,
}

/// Projects a sliced cloud onto a 2D occupancy grid
#[derive(Clone, Debug)]
pub struct GridRasterizer {
    config: RasterConfig,
}

impl GridRasterizer {
    /// Create a rasterizer, validating the configuration
    pub fn new(config: RasterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Frame covering the XY bounds of `cloud` plus the configured margin
    pub fn frame_for(&self, cloud: &PointCloud) -> Result<GridFrame> {
        let (min, max) = cloud.bounds().ok_or(NavError::Validation {
            stage: "rasterize",
            count: 0,
            minimum: 1,
        })?;
        let res = self.config.resolution;
        let margin = self.config.margin_cells as f64;
        let width = (((max.x - min.x) / res).ceil() + 2.0 * margin).max(1.0);
        let height = (((max.y - min.y) / res).ceil() + 2.0 * margin).max(1.0);
        // An infinite extent fails the comparison too
        if !(width * height <= self.config.max_cells as f64) {
            return Err(NavError::InvalidConfig(format!(
                "{:.1} x {:.1} m extent needs {:.0}x{:.0} cells at {} m, above max_cells {}",
                max.x - min.x,
                max.y - min.y,
                width,
                height,
                res,
                self.config.max_cells
            )));
        }
        Ok(GridFrame {
            origin: WorldPoint::new(min.x - margin * res, min.y - margin * res),
            width: width as usize,
            height: height as usize,
        })
    }

    /// Rasterize into a frame fitted to the cloud
    pub fn rasterize(&self, cloud: &PointCloud) -> Result<RasterOutput> {
        let frame = self.frame_for(cloud)?;
        self.rasterize_in_frame(cloud, frame)
    }

    /// Rasterize into a fixed frame. Points outside it are clamped onto the
    /// nearest edge cell and counted as clipped.
    pub fn rasterize_in_frame(&self, cloud: &PointCloud, frame: GridFrame) -> Result<RasterOutput> {
        if frame.width == 0 || frame.height == 0 {
            return Err(NavError::InvalidConfig(format!(
                "grid frame must be non-empty, got {}x{}",
                frame.width, frame.height
            )));
        }
        let within_limit = frame
            .width
            .checked_mul(frame.height)
            .is_some_and(|n| n <= self.config.max_cells);
        if !within_limit {
            return Err(NavError::InvalidConfig(format!(
                "{}x{} grid exceeds max_cells {}",
                frame.width, frame.height, self.config.max_cells
            )));
        }
        let res = self.config.resolution;

        let (raw, clipped) = if self.config.parallel {
            mark_parallel(cloud.points(), &frame, res)
        } else {
            mark_sequential(cloud.points(), &frame, res)
        };
        let raw_occupied = raw.occupied_count();
        debug!(
            "[Raster] {}x{} grid, {} points -> {} cells, {} clipped",
            frame.width,
            frame.height,
            cloud.len(),
            raw_occupied,
            clipped
        );

        let closed = if self.config.closing_kernel > 1 {
            close(&raw, &square_kernel(self.config.closing_kernel))
        } else {
            raw.clone()
        };
        let closed_occupied = closed.occupied_count();

        let inflation_cells = self.config.inflation_cells();
        let inflated = if inflation_cells > 0 {
            dilate(
                &closed,
                &inflation_kernel(self.config.inflation_shape, inflation_cells),
            )
        } else {
            closed
        };
        let inflated_occupied = inflated.occupied_count();

        let grid = inflated.freeze(res, frame.origin)?;
        let occupied_ratio = grid.occupied_ratio();

        let mut warnings = Vec::new();
        if clipped > 0 {
            warn!(
                "[Raster] {} points outside the grid were clipped to its edge",
                clipped
            );
            warnings.push(BuildWarning::PointsClipped { count: clipped });
        }
        let (low, high) = self.config.occupied_ratio_warn;
        if occupied_ratio < low {
            warn!(
                "[Raster] Occupied ratio {:.3} is below {:.3}, check the slice band",
                occupied_ratio, low
            );
            warnings.push(BuildWarning::OccupiedRatioLow {
                ratio: occupied_ratio,
                threshold: low,
            });
        } else if occupied_ratio > high {
            warn!(
                "[Raster] Occupied ratio {:.3} is above {:.3}, check the inflation radius",
                occupied_ratio, high
            );
            warnings.push(BuildWarning::OccupiedRatioHigh {
                ratio: occupied_ratio,
                threshold: high,
            });
        }

        info!(
            "[Raster] {}x{} @ {:.3} m: raw {} closed {} inflated {} ({:.1}% occupied)",
            grid.width(),
            grid.height(),
            res,
            raw_occupied,
            closed_occupied,
            inflated_occupied,
            occupied_ratio * 100.0
        );

        Ok(RasterOutput {
            grid,
            raw,
            stats: RasterStats {
                points: cloud.len(),
                clipped_points: clipped,
                raw_occupied,
                closed_occupied,
                inflated_occupied,
                inflation_cells,
                occupied_ratio,
            },
            warnings,
        })
    }
}

fn mark_sequential(points: &[Point3<f64>], frame: &GridFrame, res: f64) -> (OccupancyMask, usize) {
    let mut cells = vec![false; frame.width * frame.height];
    let mut clipped = 0;
    for p in points {
        match frame.locate(p.x, p.y, res) {
            Some((i, edge)) => {
                cells[i] = true;
                clipped += usize::from(edge);
            }
            None => clipped += 1,
        }
    }
    (
        OccupancyMask::from_cells(frame.width, frame.height, cells),
        clipped,
    )
}

fn mark_parallel(points: &[Point3<f64>], frame: &GridFrame, res: f64) -> (OccupancyMask, usize) {
    let cells: Vec<AtomicBool> = (0..frame.width * frame.height)
        .map(|_| AtomicBool::new(false))
        .collect();
    let clipped = points
        .par_iter()
        .filter(|p| match frame.locate(p.x, p.y, res) {
            Some((i, edge)) => {
                cells[i].fetch_or(true, Ordering::Relaxed);
                edge
            }
            None => true,
        })
        .count();
    let cells = cells.into_iter().map(AtomicBool::into_inner).collect();
    (
        OccupancyMask::from_cells(frame.width, frame.height, cells),
        clipped,
    )
}
