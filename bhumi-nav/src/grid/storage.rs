//! Immutable georeferenced occupancy grid.
//!
//! [`GridMap`] is the data product of a map build and the only input the
//! planner reads. It never changes after construction, so it can be shared
//! behind an `Arc` by any number of concurrent queries.

use crate::core::{CellState, GridCoord, WorldPoint};
use crate::error::{NavError, Result};

/// Occupancy grid with a world frame.
///
/// The grid uses an image-style coordinate system:
/// - `origin` is the world position of the lower-left corner of the map
/// - columns grow with world X
/// - rows grow downward, so row 0 is the top of the map (highest world Y)
///
/// ```text
/// col = floor((x - origin.x) / resolution)
/// row = (height - 1) - floor((y - origin.y) / resolution)
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap {
    /// Row-major cell states, row 0 first
    cells: Vec<CellState>,
    /// Grid width in cells
    width: usize,
    /// Grid height in cells
    height: usize,
    /// Resolution in meters per cell
    resolution: f64,
    /// World coordinates of the lower-left map corner
    origin: WorldPoint,
}

impl GridMap {
    /// Create a grid from row-major cell states.
    pub fn new(
        width: usize,
        height: usize,
        resolution: f64,
        origin: WorldPoint,
        cells: Vec<CellState>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(NavError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }
        if !origin.is_finite() {
            return Err(NavError::InvalidConfig("origin must be finite".into()));
        }
        if cells.len() != width * height {
            return Err(NavError::InvalidConfig(format!(
                "expected {} cells for {}x{} grid, got {}",
                width * height,
                width,
                height,
                cells.len()
            )));
        }
        Ok(Self {
            cells,
            width,
            height,
            resolution,
            origin,
        })
    }

    /// Create an all-free grid
    pub fn empty(width: usize, height: usize, resolution: f64, origin: WorldPoint) -> Result<Self> {
        Self::new(
            width,
            height,
            resolution,
            origin,
            vec![CellState::Free; width * height],
        )
    }

    /// Parse a text picture: `#` is occupied, anything else is free.
    ///
    /// Lines are rows, first line is row 0. All lines must have equal length.
    pub fn from_ascii(text: &str, resolution: f64, origin: WorldPoint) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(NavError::InvalidConfig(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    width
                )));
            }
            cells.extend(line.chars().map(|c| {
                if c == '#' {
                    CellState::Occupied
                } else {
                    CellState::Free
                }
            }));
        }
        Self::new(width, height, resolution, origin, cells)
    }

    /// Grid width in cells
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolution in meters per cell
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// World coordinates of the lower-left corner
    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Row-major cell states
    #[inline]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// World bounds: (min_point, max_point)
    pub fn bounds(&self) -> (WorldPoint, WorldPoint) {
        let min = self.origin;
        let max = WorldPoint::new(
            self.origin.x + self.width as f64 * self.resolution,
            self.origin.y + self.height as f64 * self.resolution,
        );
        (min, max)
    }

    /// Convert world coordinates to grid coordinates (may be out of bounds)
    #[inline]
    pub fn world_to_grid(&self, point: WorldPoint) -> GridCoord {
        let col = ((point.x - self.origin.x) / self.resolution).floor();
        let up = ((point.y - self.origin.y) / self.resolution).floor();
        GridCoord::new(saturate_cell(col), saturate_cell(self.height as f64 - 1.0 - up))
    }

    /// Convert grid coordinates to world coordinates (cell center)
    #[inline]
    pub fn grid_to_world(&self, coord: GridCoord) -> WorldPoint {
        let up = self.height as f64 - 1.0 - coord.row as f64;
        WorldPoint::new(
            self.origin.x + (coord.col as f64 + 0.5) * self.resolution,
            self.origin.y + (up + 0.5) * self.resolution,
        )
    }

    /// Check if grid coordinates are within bounds
    #[inline]
    pub fn is_valid_coord(&self, coord: GridCoord) -> bool {
        coord.col >= 0
            && coord.row >= 0
            && (coord.col as usize) < self.width
            && (coord.row as usize) < self.height
    }

    /// Convert grid coordinates to flat array index
    #[inline]
    pub fn coord_to_index(&self, coord: GridCoord) -> Option<usize> {
        if self.is_valid_coord(coord) {
            Some(coord.row as usize * self.width + coord.col as usize)
        } else {
            None
        }
    }

    /// Convert flat array index to grid coordinates
    #[inline]
    pub fn index_to_coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Cell state, `None` out of bounds
    #[inline]
    pub fn state(&self, coord: GridCoord) -> Option<CellState> {
        self.coord_to_index(coord).map(|i| self.cells[i])
    }

    /// In bounds and free
    #[inline]
    pub fn is_free(&self, coord: GridCoord) -> bool {
        self.state(coord).is_some_and(CellState::is_free)
    }

    /// Cell state at world coordinates
    #[inline]
    pub fn state_world(&self, point: WorldPoint) -> Option<CellState> {
        self.state(self.world_to_grid(point))
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Number of free cells
    pub fn free_count(&self) -> usize {
        self.cell_count() - self.occupied_count()
    }

    /// Fraction of cells that are occupied
    pub fn occupied_ratio(&self) -> f64 {
        self.occupied_count() as f64 / self.cell_count() as f64
    }

    /// Nearest free cell to `coord` within `max_radius` cells.
    ///
    /// Searches square rings of growing radius and returns the free cell with
    /// the smallest Euclidean distance from the first ring that has one.
    pub fn nearest_free(&self, coord: GridCoord, max_radius: u32) -> Option<GridCoord> {
        if self.is_free(coord) {
            return Some(coord);
        }
        let max_radius = i32::try_from(max_radius).unwrap_or(i32::MAX);
        for r in 1..=max_radius {
            let mut best: Option<(i64, GridCoord)> = None;
            for dr in -r..=r {
                for dc in -r..=r {
                    if dr.abs() != r && dc.abs() != r {
                        continue;
                    }
                    let (Some(col), Some(row)) =
                        (coord.col.checked_add(dc), coord.row.checked_add(dr))
                    else {
                        continue;
                    };
                    let candidate = GridCoord::new(col, row);
                    if !self.is_free(candidate) {
                        continue;
                    }
                    let d2 = i64::from(dc).pow(2) + i64::from(dr).pow(2);
                    if best.is_none_or(|(bd, _)| d2 < bd) {
                        best = Some((d2, candidate));
                    }
                }
            }
            if let Some((_, found)) = best {
                return Some(found);
            }
        }
        None
    }

    /// Text picture of the grid (inverse of [`from_ascii`](Self::from_ascii))
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width) {
            out.extend(row.iter().map(|c| c.as_char()));
            out.push('\n');
        }
        out
    }
}

/// Cell index from a floored coordinate. Values past the `i32` range
/// saturate, and NaN lands far off the grid.
#[inline]
fn saturate_cell(value: f64) -> i32 {
    if value.is_nan() {
        i32::MIN
    } else {
        value as i32
    }
}
