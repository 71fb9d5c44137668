//! Point and coordinate types for the occupancy grid.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Offsets of the 4 straight neighbors as (d_col, d_row).
const STRAIGHT_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Offsets of the 4 diagonal neighbors as (d_col, d_row).
const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Grid coordinates (integer cell indices).
///
/// Rows grow downward: row 0 is the top row of the map image, which is the
/// highest world Y. See [`crate::grid::GridMap::world_to_grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    /// Column index
    pub col: i32,
    /// Row index
    pub row: i32,
}

impl GridCoord {
    /// Create a new grid coordinate
    #[inline]
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance to another coordinate
    #[inline]
    pub fn manhattan_distance(&self, other: &GridCoord) -> i32 {
        (self.col - other.col).abs() + (self.row - other.row).abs()
    }

    /// Chebyshev distance (max of column and row distance)
    #[inline]
    pub fn chebyshev_distance(&self, other: &GridCoord) -> i32 {
        (self.col - other.col)
            .abs()
            .max((self.row - other.row).abs())
    }

    /// Euclidean distance in cell units
    #[inline]
    pub fn euclidean_distance(&self, other: &GridCoord) -> f64 {
        let dc = (self.col - other.col) as f64;
        let dr = (self.row - other.row) as f64;
        (dc * dc + dr * dr).sqrt()
    }

    /// True if `other` is one straight or diagonal step away.
    #[inline]
    pub fn is_adjacent(&self, other: &GridCoord) -> bool {
        self.chebyshev_distance(other) == 1
    }

    /// True if the step to `other` changes both column and row.
    #[inline]
    pub fn is_diagonal_step(&self, other: &GridCoord) -> bool {
        self.col != other.col && self.row != other.row
    }

    /// Get the 4 straight neighbors (N, E, S, W in image orientation)
    #[inline]
    pub fn neighbors_4(&self) -> [GridCoord; 4] {
        STRAIGHT_OFFSETS.map(|(dc, dr)| GridCoord::new(self.col + dc, self.row + dr))
    }

    /// Get the 4 diagonal neighbors (NE, SE, SW, NW in image orientation)
    #[inline]
    pub fn neighbors_diagonal(&self) -> [GridCoord; 4] {
        DIAGONAL_OFFSETS.map(|(dc, dr)| GridCoord::new(self.col + dc, self.row + dr))
    }

    /// Get the 8 neighbors: the 4 straight ones first, then the 4 diagonals
    #[inline]
    pub fn neighbors_8(&self) -> [GridCoord; 8] {
        let s = self.neighbors_4();
        let d = self.neighbors_diagonal();
        [s[0], s[1], s[2], s[3], d[0], d[1], d[2], d[3]]
    }
}

impl Add for GridCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        GridCoord::new(self.col + other.col, self.row + other.row)
    }
}

impl Sub for GridCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        GridCoord::new(self.col - other.col, self.row - other.row)
    }
}

/// World coordinates on the floor plane (meters)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// X coordinate in meters
    pub x: f64,
    /// Y coordinate in meters (up in map images)
    pub y: f64,
}

impl WorldPoint {
    /// Create a new world point
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero point (origin)
    pub const ZERO: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &WorldPoint) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &WorldPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Both coordinates are finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for WorldPoint {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        WorldPoint::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for WorldPoint {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        WorldPoint::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for WorldPoint {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        WorldPoint::new(self.x * scalar, self.y * scalar)
    }
}
