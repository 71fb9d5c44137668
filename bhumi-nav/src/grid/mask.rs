//! Mutable binary occupancy mask used while a grid is being built.

use super::GridMap;
use crate::core::{CellState, GridCoord, WorldPoint};
use crate::error::Result;

/// Row-major binary mask, `true` = occupied.
///
/// Rasterization and morphology work on a mask; [`OccupancyMask::freeze`]
/// turns the finished mask into an immutable [`GridMap`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMask {
    cells: Vec<bool>,
    width: usize,
    height: usize,
}

impl OccupancyMask {
    /// All-free mask
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![false; width * height],
            width,
            height,
        }
    }

    /// Wrap existing row-major cells
    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            cells,
            width,
            height,
        }
    }

    /// Copy the occupancy of a finished grid
    pub fn from_grid(grid: &GridMap) -> Self {
        Self {
            cells: grid.cells().iter().map(|c| c.is_occupied()).collect(),
            width: grid.width(),
            height: grid.height(),
        }
    }

    /// Mask width in cells
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height in cells
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cells
    #[inline]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Occupied? Out-of-bounds reads as free.
    #[inline]
    pub fn get(&self, coord: GridCoord) -> bool {
        self.index(coord).is_some_and(|i| self.cells[i])
    }

    /// Mark a cell occupied. Returns false if out of bounds.
    #[inline]
    pub fn mark(&mut self, coord: GridCoord) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.cells[i] = true;
                true
            }
            None => false,
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Every cell occupied here is also occupied in `other`
    pub fn is_subset_of(&self, other: &OccupancyMask) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.cells.iter().zip(&other.cells).all(|(&a, &b)| !a || b)
    }

    /// Cell-wise OR with another mask of the same size
    pub fn union_with(&mut self, other: &OccupancyMask) {
        debug_assert_eq!(self.cells.len(), other.cells.len());
        for (a, &b) in self.cells.iter_mut().zip(&other.cells) {
            *a |= b;
        }
    }

    /// Freeze into an immutable grid
    pub fn freeze(self, resolution: f64, origin: WorldPoint) -> Result<GridMap> {
        let cells = self
            .cells
            .into_iter()
            .map(|occupied| {
                if occupied {
                    CellState::Occupied
                } else {
                    CellState::Free
                }
            })
            .collect();
        GridMap::new(self.width, self.height, resolution, origin, cells)
    }

    #[inline]
    fn index(&self, coord: GridCoord) -> Option<usize> {
        if coord.col >= 0
            && coord.row >= 0
            && (coord.col as usize) < self.width
            && (coord.row as usize) < self.height
        {
            Some(coord.row as usize * self.width + coord.col as usize)
        } else {
            None
        }
    }
}
