//! 3D point clouds and pre-processing.
//!
//! Every transformation returns a new [`PointCloud`]; the input is never
//! mutated in place.

mod cleaning;

pub use cleaning::{CleaningConfig, CleaningStats, CloudCleaner};

use crate::error::{NavError, Result};
use nalgebra::{Matrix3, Point3, Vector3};

/// Ordered collection of 3D points with optional per-point RGB color
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Point3<f64>>,
    colors: Option<Vec<[u8; 3]>>,
}

impl PointCloud {
    /// Cloud without colors
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            colors: None,
        }
    }

    /// Cloud with one color per point
    pub fn with_colors(points: Vec<Point3<f64>>, colors: Vec<[u8; 3]>) -> Result<Self> {
        if points.len() != colors.len() {
            return Err(NavError::PointCloudFormat(format!(
                "{} points but {} colors",
                points.len(),
                colors.len()
            )));
        }
        Ok(Self {
            points,
            colors: Some(colors),
        })
    }

    /// Build from (x, y, z) tuples
    pub fn from_xyz(coords: &[[f64; 3]]) -> Self {
        Self::new(
            coords
                .iter()
                .map(|&[x, y, z]| Point3::new(x, y, z))
                .collect(),
        )
    }

    /// Number of points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// No points?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in input order
    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Per-point colors, if present
    #[inline]
    pub fn colors(&self) -> Option<&[[u8; 3]]> {
        self.colors.as_deref()
    }

    /// Apply `p' = R·p + t` to every point
    pub fn transformed(&self, rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point3::from(rotation * p.coords + translation))
                .collect(),
            colors: self.colors.clone(),
        }
    }

    /// Keep points matching `predicate` (colors follow their points)
    pub fn filtered<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Point3<f64>) -> bool,
    {
        let keep: Vec<usize> = (0..self.points.len())
            .filter(|&i| predicate(&self.points[i]))
            .collect();
        self.select(&keep)
    }

    /// Points at the given indices, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            points: indices.iter().map(|&i| self.points[i]).collect(),
            colors: self
                .colors
                .as_ref()
                .map(|c| indices.iter().map(|&i| c[i]).collect()),
        }
    }

    /// Drop points with NaN or infinite coordinates
    pub fn finite_only(&self) -> Self {
        self.filtered(|p| p.coords.iter().all(|v| v.is_finite()))
    }

    /// Axis-aligned bounds (min, max), `None` when empty
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }
        Some((min, max))
    }
}
