//! Unified configuration loading for bhumi-nav.
//!
//! Loads all configuration from a single YAML file. Every field has a
//! default, so partial files are fine.

mod cleaning;
mod defaults;
mod error;
mod floor;
mod nav;
mod navigation;
mod pathfinding;
mod persistence;
mod raster;
mod slice;

// Re-export main types
pub use error::ConfigLoadError;
pub use nav::NavConfig;

// Re-export section types
pub use cleaning::CleaningSection;
pub use floor::{FloorSection, RansacPassSettings};
pub use navigation::NavigationSection;
pub use pathfinding::{AStarSettings, PathfindingSection};
pub use persistence::PersistenceSection;
pub use raster::RasterSection;
pub use slice::SliceSection;
