//! Cell states for the occupancy grid.
//!
//! The navigation grid is binary: a cell is either traversable floor or an
//! obstacle (raw evidence, closed gap or inflation margin).

use serde::{Deserialize, Serialize};

/// Occupancy state of a single grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    /// Traversable
    #[default]
    Free = 0,

    /// Obstacle or inside the inflation margin
    Occupied = 1,
}

impl CellState {
    /// Can the agent stand in this cell?
    #[inline]
    pub fn is_free(self) -> bool {
        self == CellState::Free
    }

    /// Is this cell an obstacle?
    #[inline]
    pub fn is_occupied(self) -> bool {
        self == CellState::Occupied
    }

    /// Pixel value used in map images (FREE low, OCCUPIED high)
    #[inline]
    pub fn to_pixel(self) -> u8 {
        match self {
            CellState::Free => 0,
            CellState::Occupied => 255,
        }
    }

    /// Convert from u8 (non-zero is occupied)
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        if value == 0 {
            CellState::Free
        } else {
            CellState::Occupied
        }
    }

    /// Single character representation for debugging
    pub fn as_char(self) -> char {
        match self {
            CellState::Free => '.',
            CellState::Occupied => '#',
        }
    }
}
