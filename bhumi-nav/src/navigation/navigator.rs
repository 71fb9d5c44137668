//! Route queries against a built grid.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::registry::LocationRegistry;
use crate::core::{CancelToken, GridCoord, WorldPoint};
use crate::error::{Endpoint, NavError, Result};
use crate::grid::GridMap;
use crate::pathfinding::{
    AStarConfig, AStarPlanner, PathOutcome, path_length_meters, path_to_world,
    simplify_path_on_grid,
};

/// Route service settings
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationConfig {
    /// Ring radius (cells) searched for a free cell when an endpoint is
    /// occupied. Zero disables snapping.
    pub snap_radius_cells: u32,
    /// Douglas-Peucker tolerance in meters. Zero disables simplification.
    pub simplify_epsilon: f64,
    /// Planner settings
    pub astar: AStarConfig,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            snap_radius_cells: 0,
            simplify_epsilon: 0.0,
            astar: AStarConfig::default(),
        }
    }
}

impl NavigationConfig {
    /// Builder-style setter for snapping.
    pub fn with_snap_radius(mut self, cells: u32) -> Self {
        self.snap_radius_cells = cells;
        self
    }

    /// Builder-style setter for simplification.
    pub fn with_simplify_epsilon(mut self, epsilon: f64) -> Self {
        self.simplify_epsilon = epsilon;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.simplify_epsilon.is_finite() || self.simplify_epsilon < 0.0 {
            return Err(NavError::InvalidConfig(format!(
                "simplify_epsilon must be a finite value >= 0, got {}",
                self.simplify_epsilon
            )));
        }
        self.astar.validate()
    }
}

/// Route endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waypoint {
    /// World coordinates in meters
    World(WorldPoint),
    /// Grid cell
    Cell(GridCoord),
    /// Registry identifier
    Named(String),
}

/// A start/goal pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub start: Waypoint,
    pub goal: Waypoint,
}

impl RouteQuery {
    pub fn new(start: Waypoint, goal: Waypoint) -> Self {
        Self { start, goal }
    }
}

/// A found route
#[derive(Clone, Debug, Serialize)]
pub struct Route {
    /// Cell centers in meters
    pub path_world: Vec<WorldPoint>,
    /// Cells from start to goal
    pub path_cells: Vec<GridCoord>,
    /// Reduced polyline, present when simplification is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplified: Option<Vec<WorldPoint>>,
    pub length_meters: f64,
    pub waypoint_count: usize,
    pub cost: f64,
    pub nodes_expanded: usize,
    /// Endpoints actually planned between, after snapping
    pub start_cell: GridCoord,
    pub goal_cell: GridCoord,
}

/// Answer to a [`RouteQuery`]
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteResponse {
    Found(Route),
    NotFound {
        start_cell: GridCoord,
        goal_cell: GridCoord,
        nodes_expanded: usize,
    },
}

impl RouteResponse {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteResponse::Found(_))
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteResponse::Found(route) => Some(route),
            RouteResponse::NotFound { .. } => None,
        }
    }
}

/// Plans routes on a shared grid, resolving named endpoints through a
/// registry.
#[derive(Clone, Debug)]
pub struct Navigator {
    grid: Arc<GridMap>,
    registry: LocationRegistry,
    config: NavigationConfig,
}

impl Navigator {
    /// Create a navigator, validating `config`
    pub fn new(
        grid: Arc<GridMap>,
        registry: LocationRegistry,
        config: NavigationConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid,
            registry,
            config,
        })
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Plan a route.
    ///
    /// Unreachable goals give `Ok(RouteResponse::NotFound)`. Unknown names,
    /// and endpoints that are off the grid or occupied (after snapping, if
    /// enabled), give errors.
    pub fn route(&self, query: &RouteQuery, cancel: &CancelToken) -> Result<RouteResponse> {
        let start = self.snap(self.resolve(&query.start, Endpoint::Start)?);
        let goal = self.snap(self.resolve(&query.goal, Endpoint::Goal)?);

        let planner = AStarPlanner::new(&self.grid, self.config.astar.clone())?;
        let outcome = planner.find_path_with_cancel(start, goal, cancel)?;

        let path = match outcome {
            PathOutcome::Found(path) => path,
            PathOutcome::NoPath { nodes_expanded } => {
                info!(
                    "[Nav] No route ({},{}) -> ({},{}) after {} expansions",
                    start.col, start.row, goal.col, goal.row, nodes_expanded
                );
                return Ok(RouteResponse::NotFound {
                    start_cell: start,
                    goal_cell: goal,
                    nodes_expanded,
                });
            }
        };

        let path_world = path_to_world(&self.grid, &path.cells);
        let simplified = (self.config.simplify_epsilon > 0.0)
            .then(|| simplify_path_on_grid(&self.grid, &path_world, self.config.simplify_epsilon));
        let length_meters = path_length_meters(&path.cells, self.grid.resolution());

        info!(
            "[Nav] Route ({},{}) -> ({},{}): {} cells, {:.2} m",
            start.col,
            start.row,
            goal.col,
            goal.row,
            path.len(),
            length_meters
        );

        Ok(RouteResponse::Found(Route {
            waypoint_count: path.cells.len(),
            cost: path.cost,
            nodes_expanded: path.nodes_expanded,
            path_world,
            path_cells: path.cells,
            simplified,
            length_meters,
            start_cell: start,
            goal_cell: goal,
        }))
    }

    fn resolve(&self, waypoint: &Waypoint, endpoint: Endpoint) -> Result<GridCoord> {
        Ok(match waypoint {
            Waypoint::World(p) if !p.is_finite() => {
                return Err(NavError::NonFinitePosition {
                    endpoint,
                    x: p.x,
                    y: p.y,
                });
            }
            Waypoint::World(p) => self.grid.world_to_grid(*p),
            Waypoint::Cell(c) => *c,
            Waypoint::Named(id) => self.grid.world_to_grid(self.registry.resolve(id)?),
        })
    }

    /// Move a blocked endpoint to the nearest free cell. Endpoints that cannot
    /// be snapped pass through unchanged so the planner reports them.
    fn snap(&self, coord: GridCoord) -> GridCoord {
        if self.config.snap_radius_cells == 0 || self.grid.is_free(coord) {
            return coord;
        }
        match self.grid.nearest_free(coord, self.config.snap_radius_cells) {
            Some(snapped) => {
                debug!(
                    "[Nav] Snapped ({},{}) -> ({},{})",
                    coord.col, coord.row, snapped.col, snapped.row
                );
                snapped
            }
            None => coord,
        }
    }
}
