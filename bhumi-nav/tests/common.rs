//! Test utilities for bhumi-nav.
//!
//! Synthetic scenes and a brute-force shortest-path reference.

#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bhumi_nav::cloud::PointCloud;
use bhumi_nav::core::{GridCoord, WorldPoint};
use bhumi_nav::{CellState, GridMap};
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Floor plus four walls of a `width` x `depth` room, sampled every
/// `spacing` meters, walls up to `height`.
pub fn room_points(width: f64, depth: f64, height: f64, spacing: f64) -> Vec<Point3<f64>> {
    let nx = (width / spacing).round() as usize;
    let ny = (depth / spacing).round() as usize;
    let nz = (height / spacing).round() as usize;
    let mut pts = Vec::new();
    for i in 0..=nx {
        for j in 0..=ny {
            pts.push(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
        }
    }
    for k in 1..=nz {
        let z = k as f64 * spacing;
        for i in 0..=nx {
            let x = i as f64 * spacing;
            pts.push(Point3::new(x, 0.0, z));
            pts.push(Point3::new(x, depth, z));
        }
        for j in 1..ny {
            let y = j as f64 * spacing;
            pts.push(Point3::new(0.0, y, z));
            pts.push(Point3::new(width, y, z));
        }
    }
    pts
}

/// Add uniform noise of +-`amplitude` to every coordinate
pub fn jitter(points: &mut [Point3<f64>], amplitude: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for p in points.iter_mut() {
        p.x += rng.random_range(-amplitude..=amplitude);
        p.y += rng.random_range(-amplitude..=amplitude);
        p.z += rng.random_range(-amplitude..=amplitude);
    }
}

/// Rotate about the x axis by `degrees`, then lift by `dz`
pub fn tilt(points: &[Point3<f64>], degrees: f64, dz: f64) -> PointCloud {
    let rotation: Matrix3<f64> =
        *Rotation3::from_axis_angle(&Vector3::x_axis(), degrees.to_radians()).matrix();
    PointCloud::new(points.to_vec()).transformed(&rotation, &Vector3::new(0.0, 0.0, dz))
}

/// Random obstacle grid with the two corners kept free
pub fn random_grid(width: usize, height: usize, density: f64, seed: u64) -> GridMap {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cells: Vec<CellState> = (0..width * height)
        .map(|_| {
            if rng.random_bool(density) {
                CellState::Occupied
            } else {
                CellState::Free
            }
        })
        .collect();
    cells[0] = CellState::Free;
    cells[width * height - 1] = CellState::Free;
    GridMap::new(width, height, 1.0, WorldPoint::ZERO, cells).unwrap()
}

/// Exhaustive Dijkstra over free cells. `None` when unreachable.
pub fn dijkstra_cost(
    grid: &GridMap,
    start: GridCoord,
    goal: GridCoord,
    allow_diagonal: bool,
    straight: f64,
    diagonal: f64,
) -> Option<f64> {
    // Costs as integer micro-units so the heap can order them
    let scale = 1e6;
    let mut dist = vec![u64::MAX; grid.cell_count()];
    let mut heap = BinaryHeap::new();
    let start_idx = grid.coord_to_index(start)?;
    dist[start_idx] = 0;
    heap.push(Reverse((0u64, start_idx)));

    while let Some(Reverse((d, idx))) = heap.pop() {
        if d > dist[idx] {
            continue;
        }
        let coord = grid.index_to_coord(idx);
        if coord == goal {
            return Some(d as f64 / scale);
        }
        let neighbors = if allow_diagonal {
            coord.neighbors_8().to_vec()
        } else {
            coord.neighbors_4().to_vec()
        };
        for next in neighbors {
            if !grid.is_free(next) {
                continue;
            }
            let Some(next_idx) = grid.coord_to_index(next) else {
                continue;
            };
            let step = if next.col != coord.col && next.row != coord.row {
                diagonal
            } else {
                straight
            };
            let nd = d + (step * scale).round() as u64;
            if nd < dist[next_idx] {
                dist[next_idx] = nd;
                heap.push(Reverse((nd, next_idx)));
            }
        }
    }
    None
}
