//! Per-build diagnostics and warnings for operators.

use serde::Serialize;
use std::fmt;

/// Condition worth a manual look that did not fail the build
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// Almost nothing is occupied: slice band or resolution is probably off
    OccupiedRatioLow {
        /// Observed ratio
        ratio: f64,
        /// Warning threshold
        threshold: f64,
    },
    /// Almost everything is occupied: inflation is probably too large
    OccupiedRatioHigh {
        /// Observed ratio
        ratio: f64,
        /// Warning threshold
        threshold: f64,
    },
    /// Points fell outside the grid frame and were marked on its edge
    PointsClipped {
        /// Number of clamped points
        count: usize,
    },
    /// Floor was only found with the relaxed RANSAC thresholds
    RelaxedFloorFit {
        /// Inlier fraction of the accepted plane
        inlier_ratio: f64,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::OccupiedRatioLow { ratio, threshold } => write!(
                f,
                "occupied ratio {:.3} below {:.3}: map may be nearly empty",
                ratio, threshold
            ),
            BuildWarning::OccupiedRatioHigh { ratio, threshold } => write!(
                f,
                "occupied ratio {:.3} above {:.3}: map may be nearly solid",
                ratio, threshold
            ),
            BuildWarning::PointsClipped { count } => {
                write!(
                    f,
                    "{} points fell outside the grid and were clipped to its edge",
                    count
                )
            }
            BuildWarning::RelaxedFloorFit { inlier_ratio } => write!(
                f,
                "floor found only with relaxed thresholds ({:.1}% inliers)",
                inlier_ratio * 100.0
            ),
        }
    }
}

/// Counts and settings recorded for one map build
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BuildDiagnostics {
    /// Points handed to the pipeline
    pub initial_point_count: usize,
    /// Points after voxel downsampling and outlier removal
    pub points_after_cleaning: usize,
    /// Points supporting the floor plane
    pub floor_inlier_count: usize,
    /// Points inside the height band
    pub points_in_slice: usize,
    /// Grid width in cells
    pub grid_width: usize,
    /// Grid height in cells
    pub grid_height: usize,
    /// Fraction of occupied cells in the final grid
    pub occupied_ratio: f64,

    /// Meters per cell
    pub resolution: f64,
    /// Obstacle inflation radius (meters)
    pub inflation_radius: f64,
    /// Height band [z_min, z_max]
    pub z_slice: [f64; 2],
    /// World position of the lower-left map corner
    pub origin: [f64; 2],
    /// Map extent in meters [width, height]
    pub extent_m: [f64; 2],
    /// Points outside the grid frame, clamped onto its edge
    pub clipped_points: usize,
    /// Cells marked directly by points
    pub raw_occupied_cells: usize,
    /// Floor tilt that was removed (degrees)
    pub floor_tilt_degrees: f64,
    /// Vertical shift applied after leveling (meters)
    pub z_offset: f64,
    /// Relaxed RANSAC pass was needed
    pub floor_relaxed: bool,
    /// Non-fatal issues
    pub warnings: Vec<BuildWarning>,
}

impl BuildDiagnostics {
    /// Any warnings raised?
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
