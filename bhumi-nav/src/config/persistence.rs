//! Persistence configuration section.

use serde::{Deserialize, Serialize};

use crate::io::MapFileSettings;

use super::defaults;

/// Persistence settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceSection {
    /// Raster file name inside the output directory
    #[serde(default = "defaults::image_file")]
    pub image_file: String,

    /// Metadata file name inside the output directory
    #[serde(default = "defaults::yaml_file")]
    pub yaml_file: String,

    /// Diagnostics report file name inside the output directory
    #[serde(default = "defaults::report_file")]
    pub report_file: String,

    /// Pixel probability above which a loaded cell is occupied
    #[serde(default = "defaults::occupied_thresh")]
    pub occupied_thresh: f64,

    /// Pixel probability below which a loaded cell is free
    #[serde(default = "defaults::free_thresh")]
    pub free_thresh: f64,
}

impl Default for PersistenceSection {
    fn default() -> Self {
        Self {
            image_file: defaults::image_file(),
            yaml_file: defaults::yaml_file(),
            report_file: defaults::report_file(),
            occupied_thresh: 0.65,
            free_thresh: 0.196,
        }
    }
}

impl PersistenceSection {
    /// Convert to MapFileSettings
    pub fn to_map_file_settings(&self) -> MapFileSettings {
        MapFileSettings {
            image_file: self.image_file.clone(),
            yaml_file: self.yaml_file.clone(),
            occupied_thresh: self.occupied_thresh,
            free_thresh: self.free_thresh,
        }
    }
}
