//! Pathfinding configuration section.

use serde::{Deserialize, Serialize};

use crate::pathfinding::AStarConfig;

use super::defaults;

/// Pathfinding settings section
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PathfindingSection {
    /// A* algorithm settings
    #[serde(default)]
    pub astar: AStarSettings,
}

/// A* algorithm settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AStarSettings {
    /// Enable 8-directional movement
    #[serde(default = "defaults::enabled")]
    pub allow_diagonal: bool,

    /// Cost of a horizontal or vertical step
    #[serde(default = "defaults::straight_cost")]
    pub straight_cost: f64,

    /// Cost of a diagonal step (sqrt(2))
    #[serde(default = "defaults::diagonal_cost")]
    pub diagonal_cost: f64,
}

impl Default for AStarSettings {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            straight_cost: 1.0,
            diagonal_cost: std::f64::consts::SQRT_2,
        }
    }
}

impl AStarSettings {
    /// Convert to AStarConfig
    pub fn to_astar_config(&self) -> AStarConfig {
        AStarConfig {
            allow_diagonal: self.allow_diagonal,
            straight_cost: self.straight_cost,
            diagonal_cost: self.diagonal_cost,
        }
    }
}
