//! Default value functions for serde deserialization.

use crate::grid::KernelShape;

pub fn enabled() -> bool {
    true
}

pub fn voxel_size() -> f64 {
    0.03
}

pub fn outlier_neighbors() -> usize {
    20
}

pub fn outlier_std_ratio() -> f64 {
    2.5
}

pub fn floor_min_points() -> usize {
    100
}

pub fn floor_percentile() -> f64 {
    5.0
}

pub fn max_tilt_degrees() -> f64 {
    45.0
}

pub fn primary_distance() -> f64 {
    0.02
}

pub fn primary_iterations() -> usize {
    1000
}

pub fn primary_min_fraction() -> f64 {
    0.10
}

pub fn relaxed_pass() -> Option<super::floor::RansacPassSettings> {
    Some(super::floor::RansacPassSettings {
        distance_threshold: 0.05,
        iterations: 2000,
        min_inlier_fraction: 0.05,
    })
}

pub fn z_min() -> f64 {
    0.10
}

pub fn z_max() -> f64 {
    2.20
}

pub fn slice_min_points() -> usize {
    10
}

pub fn resolution() -> f64 {
    0.10
}

pub fn inflation_radius() -> f64 {
    0.30
}

pub fn margin_cells() -> usize {
    2
}

pub fn closing_kernel() -> usize {
    3
}

pub fn inflation_shape() -> KernelShape {
    KernelShape::Square
}

pub fn occupied_ratio_warn() -> [f64; 2] {
    [0.01, 0.9]
}

pub fn max_cells() -> usize {
    50_000_000
}

pub fn straight_cost() -> f64 {
    1.0
}

pub fn diagonal_cost() -> f64 {
    std::f64::consts::SQRT_2
}

pub fn image_file() -> String {
    "grid.png".to_string()
}

pub fn yaml_file() -> String {
    "grid.yaml".to_string()
}

pub fn report_file() -> String {
    "report.json".to_string()
}

pub fn occupied_thresh() -> f64 {
    0.65
}

pub fn free_thresh() -> f64 {
    0.196
}
