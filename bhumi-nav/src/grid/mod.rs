//! Occupancy grid construction and storage.
//!
//! - [`GridMap`]: immutable grid with coordinate conversion
//! - [`OccupancyMask`]: mutable binary mask used while building
//! - [`morphology`]: closing and inflation kernels
//! - [`GridRasterizer`]: point cloud to grid projection

mod config;
mod mask;
pub mod morphology;
mod rasterize;
mod storage;

pub use config::RasterConfig;
pub use mask::OccupancyMask;
pub use morphology::KernelShape;
pub use rasterize::{GridFrame, GridRasterizer, RasterOutput, RasterStats};
pub use storage::GridMap;
