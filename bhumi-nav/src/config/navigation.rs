//! Route service configuration section.

use serde::{Deserialize, Serialize};

/// Navigation settings section
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct NavigationSection {
    /// Snap occupied endpoints to free cells within this many cells (0 = off)
    #[serde(default)]
    pub snap_radius_cells: u32,

    /// Douglas-Peucker tolerance for the simplified path (meters, 0 = off)
    #[serde(default)]
    pub simplify_epsilon: f64,
}
