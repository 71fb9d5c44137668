//! Core types for the bhumi-nav pipeline.
//!
//! - [`CellState`]: binary occupancy of a grid cell
//! - [`GridCoord`] and [`WorldPoint`]: coordinate types
//! - [`CancelToken`]: cooperative cancellation shared by long-running stages

mod cancel;
mod cell;
mod point;

pub use cancel::CancelToken;
pub use cell::CellState;
pub use point::{GridCoord, WorldPoint};
