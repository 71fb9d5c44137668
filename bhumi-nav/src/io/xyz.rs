//! Plain-text `x y z [r g b]` point clouds.
//!
//! One point per line, whitespace or comma separated. Blank lines and lines
//! starting with `#` or `//` are skipped. Colors are kept only when every
//! point has them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;

use crate::cloud::PointCloud;
use crate::error::{NavError, Result};

/// Read an XYZ cloud from a reader
pub fn read_xyz<R: BufRead>(reader: R) -> Result<PointCloud> {
    let mut points = Vec::new();
    let mut colors = Vec::new();
    let mut all_colored = true;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let values = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<f64>().map_err(|_| {
                    NavError::PointCloudFormat(format!(
                        "XYZ line {}: invalid number '{}'",
                        index + 1,
                        t
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.len() < 3 {
            return Err(NavError::PointCloudFormat(format!(
                "XYZ line {}: expected at least 3 values, got {}",
                index + 1,
                values.len()
            )));
        }
        points.push(Point3::new(values[0], values[1], values[2]));
        if values.len() >= 6 {
            colors.push([values[3], values[4], values[5]].map(|v| v.round().clamp(0.0, 255.0) as u8));
        } else {
            all_colored = false;
        }
    }

    if all_colored && !points.is_empty() {
        PointCloud::with_colors(points, colors)
    } else {
        Ok(PointCloud::new(points))
    }
}

/// Read an XYZ cloud from a file
pub fn load_xyz(path: &Path) -> Result<PointCloud> {
    read_xyz(BufReader::new(File::open(path)?))
}
