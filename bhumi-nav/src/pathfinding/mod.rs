//! Path planning on the occupancy grid.
//!
//! - **A\* Search**: shortest collision-free cell paths
//! - **Metrics**: cell paths to meters
//! - **Simplification**: Douglas-Peucker waypoint reduction
//!
//! ```rust,ignore
//! use bhumi_nav::pathfinding::{AStarConfig, AStarPlanner, path_length_meters};
//!
//! let planner = AStarPlanner::new(&grid, AStarConfig::default())?;
//! if let Some(path) = planner.find_path(start, goal)?.into_path() {
//!     println!("{:.2} m", path_length_meters(&path.cells, grid.resolution()));
//! }
//! ```

pub mod astar;
pub mod metrics;
pub mod smoothing;

pub use astar::{AStarConfig, AStarPlanner, PathOutcome, PlannedPath, find_path, path_exists};
pub use metrics::{path_length_meters, path_to_world};
pub use smoothing::{line_of_sight, path_length, simplify_path, simplify_path_on_grid};
