//! Grid map file pair: single-channel raster plus YAML metadata.
//!
//! Pixel 0 is free, 255 is occupied, row 0 is the top of the map. The YAML
//! follows the common navigation-stack layout:
//!
//! ```yaml
//! image: grid.png
//! mode: trinary
//! resolution: 0.1
//! origin: [-1.2, -0.8, 0.0]
//! negate: 0
//! occupied_thresh: 0.65
//! free_thresh: 0.196
//! ```

use std::path::{Path, PathBuf};

use image::GrayImage;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::{CellState, WorldPoint};
use crate::error::{NavError, Result};
use crate::grid::GridMap;

/// File names and thresholds used when writing a map
#[derive(Clone, Debug, PartialEq)]
pub struct MapFileSettings {
    /// Raster file name; the extension picks the format (png or pgm)
    pub image_file: String,
    /// Metadata file name
    pub yaml_file: String,
    /// Written to the metadata for readers
    pub occupied_thresh: f64,
    /// Written to the metadata for readers
    pub free_thresh: f64,
}

impl Default for MapFileSettings {
    fn default() -> Self {
        Self {
            image_file: "grid.png".to_string(),
            yaml_file: "grid.yaml".to_string(),
            occupied_thresh: 0.65,
            free_thresh: 0.196,
        }
    }
}

/// Map metadata (YAML side of the pair)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    /// Raster filename (relative to the YAML file)
    pub image: String,

    /// Interpretation mode, informational
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Meters per pixel
    pub resolution: f64,

    /// World pose [x, y, theta] of the bottom-left pixel corner
    pub origin: [f64; 3],

    /// 1 inverts pixel interpretation
    #[serde(default)]
    pub negate: u8,

    /// Probability above which a pixel is occupied
    #[serde(default = "default_occupied_thresh")]
    pub occupied_thresh: f64,

    /// Probability below which a pixel is free
    #[serde(default = "default_free_thresh")]
    pub free_thresh: f64,
}

fn default_mode() -> String {
    "trinary".to_string()
}

fn default_occupied_thresh() -> f64 {
    0.65
}

fn default_free_thresh() -> f64 {
    0.196
}

impl MapMetadata {
    fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(NavError::MapFile(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.origin.iter().any(|v| !v.is_finite()) {
            return Err(NavError::MapFile("origin must be finite".into()));
        }
        if self.negate > 1 {
            return Err(NavError::MapFile(format!(
                "negate must be 0 or 1, got {}",
                self.negate
            )));
        }
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.free_thresh)
            || !in_unit(self.occupied_thresh)
            || self.free_thresh > self.occupied_thresh
        {
            return Err(NavError::MapFile(format!(
                "thresholds must satisfy 0 <= free ({}) <= occupied ({}) <= 1",
                self.free_thresh, self.occupied_thresh
            )));
        }
        Ok(())
    }

    /// Cell state of a pixel. Pixels between the thresholds count as
    /// occupied.
    pub fn classify(&self, pixel: u8) -> CellState {
        let p = if self.negate == 1 {
            (255 - pixel) as f64 / 255.0
        } else {
            pixel as f64 / 255.0
        };
        if p > self.occupied_thresh {
            CellState::Occupied
        } else if p < self.free_thresh {
            CellState::Free
        } else {
            CellState::Occupied
        }
    }
}

/// Write `grid` as an image + YAML pair into `dir`, creating it if needed.
///
/// Returns the path of the YAML file.
pub fn save_map(grid: &GridMap, dir: &Path, settings: &MapFileSettings) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let pixels: Vec<u8> = grid.cells().iter().map(|c| c.to_pixel()).collect();
    let image = GrayImage::from_raw(grid.width() as u32, grid.height() as u32, pixels)
        .ok_or_else(|| NavError::MapFile("pixel buffer does not match grid size".into()))?;
    let image_path = dir.join(&settings.image_file);
    image.save(&image_path).map_err(|e| {
        NavError::MapFile(format!(
            "Failed to write map image {}: {}",
            image_path.display(),
            e
        ))
    })?;

    let origin = grid.origin();
    let metadata = MapMetadata {
        image: settings.image_file.clone(),
        mode: default_mode(),
        resolution: grid.resolution(),
        origin: [origin.x, origin.y, 0.0],
        negate: 0,
        occupied_thresh: settings.occupied_thresh,
        free_thresh: settings.free_thresh,
    };
    let yaml = serde_yaml::to_string(&metadata)
        .map_err(|e| NavError::MapFile(format!("Failed to encode map YAML: {}", e)))?;
    let yaml_path = dir.join(&settings.yaml_file);
    std::fs::write(&yaml_path, yaml)?;

    info!(
        "[MapFile] Saved {}x{} map to {}",
        grid.width(),
        grid.height(),
        yaml_path.display()
    );
    Ok(yaml_path)
}

/// Read a map pair given the path of its YAML file
pub fn load_map(yaml_path: &Path) -> Result<GridMap> {
    let yaml_content = std::fs::read_to_string(yaml_path).map_err(|e| {
        NavError::MapFile(format!(
            "Failed to read map YAML {}: {}",
            yaml_path.display(),
            e
        ))
    })?;
    let metadata: MapMetadata = serde_yaml::from_str(&yaml_content)
        .map_err(|e| NavError::MapFile(format!("Failed to parse map YAML: {}", e)))?;
    metadata.validate()?;

    if metadata.origin[2] != 0.0 {
        warn!(
            "[MapFile] Ignoring map yaw {:.3} rad; grids are axis-aligned",
            metadata.origin[2]
        );
    }

    let yaml_dir = yaml_path.parent().unwrap_or(Path::new("."));
    let image_path = yaml_dir.join(&metadata.image);
    let image = image::open(&image_path)
        .map_err(|e| {
            NavError::MapFile(format!(
                "Failed to load map image {}: {}",
                image_path.display(),
                e
            ))
        })?
        .into_luma8();

    let cells = image.pixels().map(|p| metadata.classify(p.0[0])).collect();
    GridMap::new(
        image.width() as usize,
        image.height() as usize,
        metadata.resolution,
        WorldPoint::new(metadata.origin[0], metadata.origin[1]),
        cells,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridCoord;
    use image::Luma;

    fn sample_grid() -> GridMap {
        GridMap::from_ascii(
            "
            #####
            #...#
            #.#.#
            #####
            ",
            0.05,
            WorldPoint::new(-1.0, 2.5),
        )
        .unwrap()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let grid = sample_grid();
        let yaml = save_map(&grid, dir.path(), &MapFileSettings::default()).unwrap();
        assert!(dir.path().join("grid.png").exists());

        let loaded = load_map(&yaml).unwrap();
        assert_eq!(loaded.width(), 5);
        assert_eq!(loaded.height(), 4);
        assert_eq!(loaded.cells(), grid.cells());
        assert_eq!(loaded.origin(), grid.origin());
        assert_eq!(loaded.resolution(), 0.05);
    }

    #[test]
    fn test_pgm_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = MapFileSettings {
            image_file: "map.pgm".into(),
            yaml_file: "map.yaml".into(),
            ..Default::default()
        };
        let yaml = save_map(&sample_grid(), dir.path(), &settings).unwrap();
        assert_eq!(load_map(&yaml).unwrap().to_ascii(), sample_grid().to_ascii());
    }

    #[test]
    fn test_threshold_rule() {
        let meta = MapMetadata {
            image: "x.png".into(),
            mode: default_mode(),
            resolution: 1.0,
            origin: [0.0; 3],
            negate: 0,
            occupied_thresh: 0.65,
            free_thresh: 0.196,
        };
        assert_eq!(meta.classify(0), CellState::Free);
        assert_eq!(meta.classify(255), CellState::Occupied);
        // Between thresholds
        assert_eq!(meta.classify(128), CellState::Occupied);

        let negated = MapMetadata { negate: 1, ..meta };
        assert_eq!(negated.classify(255), CellState::Free);
        assert_eq!(negated.classify(0), CellState::Occupied);
    }

    #[test]
    fn test_hand_written_pair_with_yaw() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = GrayImage::new(3, 2);
        image.put_pixel(2, 0, Luma([254]));
        image.put_pixel(0, 1, Luma([100]));
        image.save(dir.path().join("m.png")).unwrap();
        let yaml = dir.path().join("m.yaml");
        std::fs::write(
            &yaml,
            "image: m.png\nresolution: 0.5\norigin: [1.0, 2.0, 0.3]\n",
        )
        .unwrap();

        let grid = load_map(&yaml).unwrap();
        assert_eq!(grid.state(GridCoord::new(2, 0)), Some(CellState::Occupied));
        assert_eq!(grid.state(GridCoord::new(0, 1)), Some(CellState::Occupied));
        assert_eq!(grid.state(GridCoord::new(1, 1)), Some(CellState::Free));
        assert_eq!(grid.origin(), WorldPoint::new(1.0, 2.0));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("bad.yaml");
        std::fs::write(&yaml, "image: m.png\norigin: [0, 0, 0]\n").unwrap();
        assert!(matches!(load_map(&yaml), Err(NavError::MapFile(_))));

        std::fs::write(&yaml, "image: m.png\nresolution: -1\norigin: [0, 0, 0]\n").unwrap();
        assert!(matches!(load_map(&yaml), Err(NavError::MapFile(_))));

        std::fs::write(&yaml, "image: missing.png\nresolution: 1\norigin: [0, 0, 0]\n").unwrap();
        assert!(matches!(load_map(&yaml), Err(NavError::MapFile(_))));
    }
}
