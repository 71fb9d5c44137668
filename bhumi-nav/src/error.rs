//! Error types for bhumi-nav

use crate::core::GridCoord;
use std::fmt;

/// Result type alias
pub type Result<T> = std::result::Result<T, NavError>;

/// Which end of a path query an error refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Query start
    Start,
    /// Query goal
    Goal,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

/// Why a path endpoint was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionFault {
    /// Cell lies outside the grid
    OutOfBounds,
    /// Cell is an obstacle
    Occupied,
}

impl fmt::Display for PositionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionFault::OutOfBounds => write!(f, "out of bounds"),
            PositionFault::Occupied => write!(f, "occupied"),
        }
    }
}

/// bhumi-nav error types
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Too few points to continue a pipeline stage
    #[error("Validation failed in {stage}: {count} points, need at least {minimum}")]
    Validation {
        /// Stage that rejected the cloud
        stage: &'static str,
        /// Points available
        count: usize,
        /// Points required
        minimum: usize,
    },

    /// No adequate floor plane, even after relaxing thresholds
    #[error(
        "No floor plane found: best {best_inliers} of {total_points} inliers, thresholds tried: {thresholds}"
    )]
    Geometry {
        /// Inliers of the best candidate across all passes
        best_inliers: usize,
        /// Points in the cloud
        total_points: usize,
        /// Human readable summary of the passes attempted
        thresholds: String,
    },

    /// Path start or goal is unusable
    #[error("Invalid {endpoint} position ({}, {}): {reason}", coord.col, coord.row)]
    InvalidPosition {
        /// Which endpoint
        endpoint: Endpoint,
        /// Offending cell
        coord: GridCoord,
        /// Why it was rejected
        reason: PositionFault,
    },

    /// World endpoint with a NaN or infinite coordinate
    #[error("Invalid {endpoint} position ({x}, {y}): coordinates must be finite")]
    NonFinitePosition {
        /// Which endpoint
        endpoint: Endpoint,
        /// World x
        x: f64,
        /// World y
        y: f64,
    },

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cancel token fired or deadline passed
    #[error("Cancelled during {stage}")]
    Cancelled {
        /// Stage that observed the cancellation
        stage: &'static str,
    },

    /// Grid map image or metadata problem
    #[error("Map file error: {0}")]
    MapFile(String),

    /// Named location registry problem
    #[error("Location registry error: {0}")]
    Registry(String),

    /// Malformed point cloud file
    #[error("Point cloud format error: {0}")]
    PointCloudFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigLoadError),
}

impl NavError {
    /// Is this a stage failure that aborts a map build?
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, NavError::Validation { .. } | NavError::Geometry { .. })
    }
}
