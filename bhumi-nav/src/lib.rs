//! # Bhumi-Nav: Floor Maps and Routing from 3D Scans
//!
//! Turns a raw 3D point cloud of an indoor space into a 2D occupancy grid
//! and answers shortest-path queries on it.
//!
//! ## Features
//!
//! - **Floor leveling**: RANSAC plane fit, rotation onto z = 0
//! - **Height slicing**: keeps only points an obstacle could be made of
//! - **Rasterization**: occupancy grid with gap closing and obstacle inflation
//! - **A\* routing**: 4- or 8-connected, optimal for admissible costs
//! - **Route service**: named locations, endpoint snapping, path simplification
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bhumi_nav::{CancelToken, MapBuilder};
//! use bhumi_nav::core::WorldPoint;
//! use bhumi_nav::io::load_point_cloud;
//! use bhumi_nav::pathfinding::{AStarConfig, AStarPlanner};
//! use std::path::Path;
//!
//! # fn main() -> bhumi_nav::Result<()> {
//! let cloud = load_point_cloud(Path::new("scan.ply"))?;
//! let build = MapBuilder::with_defaults()?.build(&cloud, &CancelToken::new())?;
//!
//! let planner = AStarPlanner::new(&build.grid, AStarConfig::default())?;
//! let outcome = planner.find_path_world(WorldPoint::new(1.0, 1.0), WorldPoint::new(6.0, 3.5))?;
//! if let Some(path) = outcome.path() {
//!     println!("{} cells, cost {:.2}", path.len(), path.cost);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Coordinate Frame
//!
//! - **World**: meters, Z-up after leveling, floor at z = 0
//! - **Grid**: `(col, row)`, row 0 is the TOP of the map (largest y)
//! - `col = floor((x - origin.x) / res)`,
//!   `row = (height - 1) - floor((y - origin.y) / res)`
//! - Cell → world returns the cell center
//!
//! ## Data Flow
//!
//! ```text
//!          ┌──────────────┐
//!          │  PointCloud  │  PLY / XYZ
//!          └──────┬───────┘
//!                 │ clean (voxel + outliers)
//!                 ▼
//!          ┌──────────────┐
//!          │    Floor     │  RANSAC → rotate → shift
//!          └──────┬───────┘
//!                 │ slice [z_min, z_max]
//!                 ▼
//!          ┌──────────────┐
//!          │  Rasterizer  │  mark → close → inflate
//!          └──────┬───────┘
//!                 ▼
//!          ┌──────────────┐
//!          │   GridMap    │──► A* / Navigator
//!          └──────────────┘──► grid.png + grid.yaml
//! ```

pub mod cloud;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod floor;
pub mod grid;
pub mod io;
pub mod navigation;
pub mod pathfinding;
pub mod pipeline;
pub mod slice;

// Re-export main types at crate root
pub use config::{ConfigLoadError, NavConfig};
pub use core::{CancelToken, CellState, GridCoord, WorldPoint};
pub use diagnostics::{BuildDiagnostics, BuildWarning};
pub use error::{NavError, Result};
pub use grid::GridMap;
pub use pipeline::{BuildConfig, MapBuild, MapBuilder};

// Re-export routing types
pub use navigation::{LocationRegistry, NavigationConfig, Navigator, RouteQuery, RouteResponse};
pub use pathfinding::{AStarConfig, AStarPlanner, PathOutcome, PlannedPath};
