//! Main NavConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cloud::CleaningConfig;
use crate::floor::FloorConfig;
use crate::grid::RasterConfig;
use crate::io::MapFileSettings;
use crate::navigation::NavigationConfig;
use crate::pathfinding::AStarConfig;
use crate::pipeline::BuildConfig;
use crate::slice::SliceConfig;

use super::cleaning::CleaningSection;
use super::error::ConfigLoadError;
use super::floor::FloorSection;
use super::navigation::NavigationSection;
use super::pathfinding::PathfindingSection;
use super::persistence::PersistenceSection;
use super::raster::RasterSection;
use super::slice::SliceSection;

/// Full bhumi-nav configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct NavConfig {
    /// Cloud cleaning settings
    #[serde(default)]
    pub cleaning: CleaningSection,

    /// Floor detection settings
    #[serde(default)]
    pub floor: FloorSection,

    /// Height band settings
    #[serde(default)]
    pub slice: SliceSection,

    /// Rasterization settings
    #[serde(default)]
    pub raster: RasterSection,

    /// Pathfinding settings
    #[serde(default)]
    pub pathfinding: PathfindingSection,

    /// Route service settings
    #[serde(default)]
    pub navigation: NavigationSection,

    /// Persistence settings
    #[serde(default)]
    pub persistence: PersistenceSection,
}

impl NavConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/config.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/config.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Convert to CleaningConfig
    pub fn to_cleaning_config(&self) -> CleaningConfig {
        self.cleaning.to_cleaning_config()
    }

    /// Convert to FloorConfig
    pub fn to_floor_config(&self) -> FloorConfig {
        self.floor.to_floor_config()
    }

    /// Convert to SliceConfig
    pub fn to_slice_config(&self) -> SliceConfig {
        self.slice.to_slice_config()
    }

    /// Convert to RasterConfig
    pub fn to_raster_config(&self) -> RasterConfig {
        self.raster.to_raster_config()
    }

    /// Convert to BuildConfig for MapBuilder
    pub fn to_build_config(&self) -> BuildConfig {
        BuildConfig {
            cleaning: self.to_cleaning_config(),
            floor: self.to_floor_config(),
            slice: self.to_slice_config(),
            raster: self.to_raster_config(),
        }
    }

    /// Convert to AStarConfig
    pub fn to_astar_config(&self) -> AStarConfig {
        self.pathfinding.astar.to_astar_config()
    }

    /// Convert to NavigationConfig for Navigator
    pub fn to_navigation_config(&self) -> NavigationConfig {
        NavigationConfig {
            snap_radius_cells: self.navigation.snap_radius_cells,
            simplify_epsilon: self.navigation.simplify_epsilon,
            astar: self.to_astar_config(),
        }
    }

    /// Convert to MapFileSettings
    pub fn to_map_file_settings(&self) -> MapFileSettings {
        self.persistence.to_map_file_settings()
    }
}
