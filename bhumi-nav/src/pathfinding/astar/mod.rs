//! A* pathfinding algorithm.
//!
//! Implements A* search on the occupancy grid with:
//! - 4- or 8-connected movement with configurable step costs
//! - Octile / Manhattan heuristic, validated to be admissible
//! - Duplicate heap entries instead of decrease-key (stale entries are
//!   skipped when popped)

mod planner;
mod types;

pub use planner::AStarPlanner;
pub use types::{AStarConfig, PathOutcome, PlannedPath};

use crate::core::WorldPoint;
use crate::error::Result;
use crate::grid::GridMap;

/// Quick path finding with default configuration
pub fn find_path(grid: &GridMap, start: WorldPoint, goal: WorldPoint) -> Result<PathOutcome> {
    AStarPlanner::with_defaults(grid).find_path_world(start, goal)
}

/// Check if a path exists between two free positions
pub fn path_exists(grid: &GridMap, start: WorldPoint, goal: WorldPoint) -> Result<bool> {
    Ok(find_path(grid, start, goal)?.is_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellState, GridCoord};

    fn create_test_grid(wall_rows: std::ops::Range<usize>) -> GridMap {
        // 5m x 5m at 10cm resolution, wall down column 25
        let mut cells = vec![CellState::Free; 50 * 50];
        for row in wall_rows {
            cells[row * 50 + 25] = CellState::Occupied;
        }
        GridMap::new(50, 50, 0.1, WorldPoint::new(-2.5, -2.5), cells).unwrap()
    }

    #[test]
    fn test_simple_path() {
        let grid = create_test_grid(0..0);
        let planner = AStarPlanner::with_defaults(&grid);
        let start = GridCoord::new(10, 25);
        let goal = GridCoord::new(40, 25);

        let outcome = planner.find_path(start, goal).unwrap();
        let path = outcome.path().unwrap();
        assert_eq!(path.cells[0], start);
        assert_eq!(path.goal(), Some(goal));
        assert_eq!(path.len(), 31);
    }

    #[test]
    fn test_path_around_wall() {
        let grid = create_test_grid(15..35);
        let outcome = find_path(
            &grid,
            WorldPoint::new(-1.45, 0.05),
            WorldPoint::new(1.55, 0.05),
        )
        .unwrap();
        let path = outcome.into_path().unwrap();
        assert!(path.cost > 30.0);
        assert!(path.cells.iter().all(|c| grid.is_free(*c)));
    }

    #[test]
    fn test_no_path_through_full_wall() {
        let grid = create_test_grid(0..50);
        assert!(
            !path_exists(
                &grid,
                WorldPoint::new(-1.45, 0.05),
                WorldPoint::new(1.55, 0.05)
            )
            .unwrap()
        );
    }

    #[test]
    fn test_4_connected_path() {
        let grid = create_test_grid(0..0);
        let planner = AStarPlanner::new(&grid, AStarConfig::four_connected()).unwrap();
        let outcome = planner
            .find_path(GridCoord::new(10, 10), GridCoord::new(40, 40))
            .unwrap();
        let path = outcome.into_path().unwrap();
        // Manhattan: dx + dy = 60 steps, 61 cells
        assert_eq!(path.len(), 61);
        assert!((path.cost - 60.0).abs() < 1e-9);
    }
}
