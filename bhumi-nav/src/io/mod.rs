//! File formats: point cloud input, map file pair and build reports.

pub mod map_file;
pub mod ply;
pub mod report;
pub mod xyz;

pub use map_file::{MapFileSettings, MapMetadata, load_map, save_map};
pub use ply::{load_ply, read_ply, write_ply};
pub use report::save_report;
pub use xyz::{load_xyz, read_xyz};

use std::path::Path;

use crate::cloud::PointCloud;
use crate::error::{NavError, Result};

/// Load a point cloud, picking the reader from the file extension
/// (`.ply`, or `.xyz` / `.txt` / `.pts`).
pub fn load_point_cloud(path: &Path) -> Result<PointCloud> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let cloud = match extension.as_deref() {
        Some("ply") => load_ply(path)?,
        Some("xyz") | Some("txt") | Some("pts") => load_xyz(path)?,
        _ => {
            return Err(NavError::PointCloudFormat(format!(
                "unsupported point cloud file {}",
                path.display()
            )));
        }
    };
    log::info!("[Io] Loaded {} points from {}", cloud.len(), path.display());
    Ok(cloud)
}
