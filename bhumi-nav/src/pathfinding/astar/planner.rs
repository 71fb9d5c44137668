//! A* planner implementation.

use crate::core::{CancelToken, GridCoord, WorldPoint};
use crate::error::{Endpoint, NavError, PositionFault, Result};
use crate::grid::GridMap;
use log::{debug, trace};
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::types::{AStarConfig, AStarNode, PathOutcome, PlannedPath};

/// Pops between deadline reads; the cancel flag is read on every pop.
const DEADLINE_POLL_INTERVAL: usize = 256;

/// A* pathfinder.
///
/// Borrows the grid read-only; every search owns its own open set, closed
/// set and parent table, so one grid can serve concurrent planners.
pub struct AStarPlanner<'a> {
    grid: &'a GridMap,
    config: AStarConfig,
}

impl<'a> AStarPlanner<'a> {
    /// Create a new A* planner, rejecting inadmissible costs
    pub fn new(grid: &'a GridMap, config: AStarConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { grid, config })
    }

    /// Create with default configuration
    pub fn with_defaults(grid: &'a GridMap) -> Self {
        Self {
            grid,
            config: AStarConfig::default(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &AStarConfig {
        &self.config
    }

    /// Find a path from start to goal (grid coordinates)
    pub fn find_path(&self, start: GridCoord, goal: GridCoord) -> Result<PathOutcome> {
        self.find_path_with_cancel(start, goal, &CancelToken::new())
    }

    /// Find a path from start to goal (world coordinates)
    pub fn find_path_world(&self, start: WorldPoint, goal: WorldPoint) -> Result<PathOutcome> {
        let start_grid = self.grid.world_to_grid(start);
        let goal_grid = self.grid.world_to_grid(goal);
        self.find_path(start_grid, goal_grid)
    }

    /// Find a path, polling `cancel` before every pop (its deadline every
    /// [`DEADLINE_POLL_INTERVAL`] pops)
    pub fn find_path_with_cancel(
        &self,
        start: GridCoord,
        goal: GridCoord,
        cancel: &CancelToken,
    ) -> Result<PathOutcome> {
        trace!(
            "[AStar] find_path: start=({},{}) goal=({},{})",
            start.col, start.row, goal.col, goal.row
        );

        self.check_endpoint(Endpoint::Start, start)?;
        self.check_endpoint(Endpoint::Goal, goal)?;

        // A* search
        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();
        let mut g_scores: HashMap<GridCoord, f64> = HashMap::new();

        open_set.push(AStarNode {
            coord: start,
            g_cost: 0.0,
            f_cost: self.config.heuristic(start, goal),
        });
        g_scores.insert(start, 0.0);

        let mut nodes_expanded = 0;
        let mut pops = 0usize;

        while let Some(current) = open_set.pop() {
            let cancelled = if pops % DEADLINE_POLL_INTERVAL == 0 {
                cancel.is_cancelled()
            } else {
                cancel.is_flagged()
            };
            if cancelled {
                return Err(NavError::Cancelled {
                    stage: "path search",
                });
            }
            pops += 1;

            // Stale duplicate of a cell that was already finalized
            if !closed_set.insert(current.coord) {
                continue;
            }
            nodes_expanded += 1;

            // Goal reached
            if current.coord == goal {
                return Ok(self.reconstruct_path(&came_from, goal, current.g_cost, nodes_expanded));
            }

            for neighbor in self.neighbors(current.coord) {
                if closed_set.contains(&neighbor) || !self.grid.is_free(neighbor) {
                    continue;
                }

                let tentative_g =
                    current.g_cost + self.config.step_cost(current.coord, neighbor);
                let known_g = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative_g < known_g {
                    came_from.insert(neighbor, current.coord);
                    g_scores.insert(neighbor, tentative_g);
                    open_set.push(AStarNode {
                        coord: neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + self.config.heuristic(neighbor, goal),
                    });
                }
            }
        }

        debug!(
            "[AStar] FAILED: NoPath after expanding {} nodes",
            nodes_expanded
        );
        Ok(PathOutcome::NoPath { nodes_expanded })
    }

    fn check_endpoint(&self, endpoint: Endpoint, coord: GridCoord) -> Result<()> {
        let reason = match self.grid.state(coord) {
            None => PositionFault::OutOfBounds,
            Some(state) if state.is_occupied() => PositionFault::Occupied,
            Some(_) => return Ok(()),
        };
        debug!(
            "[AStar] FAILED: {} ({},{}) is {}",
            endpoint, coord.col, coord.row, reason
        );
        Err(NavError::InvalidPosition {
            endpoint,
            coord,
            reason,
        })
    }

    fn neighbors(&self, coord: GridCoord) -> impl Iterator<Item = GridCoord> {
        let straight = coord.neighbors_4().into_iter();
        let diagonal = self
            .config
            .allow_diagonal
            .then(|| coord.neighbors_diagonal().into_iter())
            .into_iter()
            .flatten();
        straight.chain(diagonal)
    }

    /// Reconstruct the path from came_from map
    fn reconstruct_path(
        &self,
        came_from: &HashMap<GridCoord, GridCoord>,
        goal: GridCoord,
        cost: f64,
        nodes_expanded: usize,
    ) -> PathOutcome {
        let mut cells = vec![goal];
        let mut current = goal;
        while let Some(&prev) = came_from.get(&current) {
            cells.push(prev);
            current = prev;
        }
        cells.reverse();

        trace!(
            "[AStar] SUCCESS: path length={} cells, cost={:.2}, nodes_expanded={}",
            cells.len(),
            cost,
            nodes_expanded
        );

        PathOutcome::Found(PlannedPath {
            cells,
            cost,
            nodes_expanded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;
    use approx::assert_relative_eq;

    fn grid(text: &str) -> GridMap {
        GridMap::from_ascii(text, 0.1, WorldPoint::ZERO).unwrap()
    }

    #[test]
    fn test_start_equals_goal() {
        let g = grid("...\n...\n");
        let planner = AStarPlanner::with_defaults(&g);
        let outcome = planner
            .find_path(GridCoord::new(1, 1), GridCoord::new(1, 1))
            .unwrap();
        let path = outcome.into_path().unwrap();
        assert_eq!(path.cells, vec![GridCoord::new(1, 1)]);
        assert_relative_eq!(path.cost, 0.0);
    }

    #[test]
    fn test_path_around_obstacle() {
        let g = grid(
            "
            .....
            .###.
            .#...
            .#.#.
            ...#.
            ",
        );
        let planner = AStarPlanner::new(&g, AStarConfig::four_connected()).unwrap();
        let outcome = planner
            .find_path(GridCoord::new(2, 3), GridCoord::new(4, 4))
            .unwrap();
        let path = outcome.path().unwrap();
        assert_eq!(path.start(), Some(GridCoord::new(2, 3)));
        assert_eq!(path.goal(), Some(GridCoord::new(4, 4)));
        for pair in path.cells.windows(2) {
            assert_eq!(pair[0].manhattan_distance(&pair[1]), 1);
            assert!(g.is_free(pair[1]));
        }
        // (2,3) -> (2,2) -> (3,2) -> (4,2) -> (4,3) -> (4,4)
        assert_relative_eq!(path.cost, 5.0);
    }

    #[test]
    fn test_goal_out_of_bounds() {
        let g = grid("...\n");
        let planner = AStarPlanner::with_defaults(&g);
        let err = planner
            .find_path(GridCoord::new(0, 0), GridCoord::new(3, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            NavError::InvalidPosition {
                endpoint: Endpoint::Goal,
                reason: PositionFault::OutOfBounds,
                ..
            }
        ));
    }

    #[test]
    fn test_occupied_goal() {
        let g = grid("..#\n");
        let planner = AStarPlanner::with_defaults(&g);
        let err = planner
            .find_path(GridCoord::new(0, 0), GridCoord::new(2, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            NavError::InvalidPosition {
                endpoint: Endpoint::Goal,
                reason: PositionFault::Occupied,
                ..
            }
        ));
    }

    #[test]
    fn test_cancelled_search() {
        let g = grid("....\n....\n");
        let planner = AStarPlanner::with_defaults(&g);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = planner
            .find_path_with_cancel(GridCoord::new(0, 0), GridCoord::new(3, 1), &cancel)
            .unwrap_err();
        assert!(matches!(err, NavError::Cancelled { .. }));
    }

    #[test]
    fn test_expired_deadline_stops_search() {
        let g = GridMap::empty(50, 50, 1.0, WorldPoint::ZERO).unwrap();
        let planner = AStarPlanner::with_defaults(&g);
        let cancel = CancelToken::with_deadline(std::time::Duration::ZERO);
        let err = planner
            .find_path_with_cancel(GridCoord::new(0, 0), GridCoord::new(49, 49), &cancel)
            .unwrap_err();
        assert!(matches!(err, NavError::Cancelled { stage: "path search" }));
    }

    #[test]
    fn test_cancel_through_other_handle() {
        let g = GridMap::empty(200, 200, 1.0, WorldPoint::ZERO).unwrap();
        let planner = AStarPlanner::with_defaults(&g);
        let cancel = CancelToken::with_deadline(std::time::Duration::from_secs(3600));
        let worker = cancel.clone();
        cancel.cancel();
        let err = planner
            .find_path_with_cancel(GridCoord::new(0, 0), GridCoord::new(199, 0), &worker)
            .unwrap_err();
        assert!(matches!(err, NavError::Cancelled { .. }));
    }

    #[test]
    fn test_world_coordinates() {
        let g = GridMap::empty(20, 20, 0.1, WorldPoint::new(-1.0, -1.0)).unwrap();
        let planner = AStarPlanner::with_defaults(&g);
        let outcome = planner
            .find_path_world(WorldPoint::new(-0.95, 0.05), WorldPoint::new(0.95, 0.05))
            .unwrap();
        let path = outcome.into_path().unwrap();
        assert_eq!(path.len(), 20);
        assert_relative_eq!(path.cost, 19.0);
    }

    #[test]
    fn test_inadmissible_config_rejected() {
        let g = grid("...\n");
        let config = AStarConfig::default().with_costs(1.0, 3.0);
        assert!(AStarPlanner::new(&g, config).is_err());
    }
}
