//! Real-world measures of cell paths.

use crate::core::{GridCoord, WorldPoint};
use crate::grid::GridMap;

/// Path length in meters: the sum of Euclidean steps between consecutive
/// cells (in cell units) times `resolution`. Zero for fewer than 2 cells.
pub fn path_length_meters(cells: &[GridCoord], resolution: f64) -> f64 {
    if cells.len() < 2 {
        return 0.0;
    }
    let cell_units: f64 = cells
        .windows(2)
        .map(|w| w[0].euclidean_distance(&w[1]))
        .sum();
    cell_units * resolution
}

/// Cell centers of a path in world coordinates
pub fn path_to_world(grid: &GridMap, cells: &[GridCoord]) -> Vec<WorldPoint> {
    cells.iter().map(|c| grid.grid_to_world(*c)).collect()
}
