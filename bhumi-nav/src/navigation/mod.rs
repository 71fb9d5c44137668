//! Route service over a built grid.
//!
//! Resolves endpoints given as world points, cells or registry names,
//! optionally snaps blocked endpoints to free space, plans with A* and
//! reports the route in both cell and world coordinates.

mod navigator;
mod registry;

pub use navigator::{NavigationConfig, Navigator, Route, RouteQuery, RouteResponse, Waypoint};
pub use registry::{LocationRegistry, NamedLocation};
