//! End-to-end map builds on synthetic rooms.

mod common;

use bhumi_nav::cloud::{CleaningConfig, PointCloud};
use bhumi_nav::floor::{FloorConfig, FloorNormalizer};
use bhumi_nav::grid::{GridRasterizer, KernelShape, OccupancyMask, RasterConfig};
use bhumi_nav::{BuildConfig, CancelToken, GridCoord, MapBuilder, NavError, WorldPoint};
use common::{jitter, room_points, tilt};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_floor_config(seed: u64) -> FloorConfig {
    let mut config = FloorConfig::default();
    config.ransac.seed = Some(seed);
    config
}

#[test]
fn test_tilted_floor_is_leveled() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut points = room_points(5.0, 4.0, 2.4, 0.05);
    jitter(&mut points, 0.003, 3);
    let cloud = tilt(&points, 10.0, 1.3);

    let normalizer = FloorNormalizer::new(seeded_floor_config(42)).unwrap();
    let (leveled, alignment) = normalizer.normalize(&cloud, &CancelToken::new()).unwrap();

    assert!(!alignment.relaxed);
    assert!((alignment.rotation_angle().to_degrees() - 10.0).abs() < 0.5);
    for &i in &alignment.plane.inliers {
        let z = leveled.points()[i].z;
        assert!(z.abs() < 0.02, "floor point {} at z = {}", i, z);
    }
}

#[test]
fn test_renormalizing_is_a_no_op() {
    let mut points = room_points(5.0, 4.0, 2.4, 0.05);
    jitter(&mut points, 0.003, 5);
    let cloud = tilt(&points, 7.0, -0.4);

    let normalizer = FloorNormalizer::new(seeded_floor_config(9)).unwrap();
    let (leveled, _) = normalizer.normalize(&cloud, &CancelToken::new()).unwrap();
    let (_, again) = normalizer.normalize(&leveled, &CancelToken::new()).unwrap();

    assert!(again.rotation_angle().to_degrees() < 0.2);
    assert!(again.z_offset.abs() < 0.002);
}

#[test]
fn test_build_tilted_room_end_to_end() {
    let mut points = room_points(6.0, 4.0, 2.4, 0.05);
    // A pillar in the middle of the room
    for k in 1..40 {
        for (dx, dy) in [(0.0, 0.0), (0.05, 0.0), (0.0, 0.05), (0.05, 0.05)] {
            points.push(Point3::new(3.0 + dx, 2.0 + dy, k as f64 * 0.05));
        }
    }
    jitter(&mut points, 0.002, 8);
    let cloud = tilt(&points, 4.0, 0.8);

    let config = BuildConfig {
        cleaning: CleaningConfig::disabled(),
        floor: seeded_floor_config(1),
        ..Default::default()
    };
    let build = MapBuilder::new(config)
        .unwrap()
        .build(&cloud, &CancelToken::new())
        .unwrap();
    let grid = &build.grid;
    let d = &build.diagnostics;

    assert_eq!(d.initial_point_count, cloud.len());
    assert_eq!((d.grid_width, d.grid_height), (grid.width(), grid.height()));
    assert!(d.occupied_ratio > 0.0 && d.occupied_ratio < 1.0);
    assert!(d.floor_tilt_degrees > 3.5 && d.floor_tilt_degrees < 4.5);
    assert_eq!(d.clipped_points, 0);

    // The room spans roughly 6 m x 4 m at 0.1 m cells plus margins
    assert!((60..=70).contains(&grid.width()));

    // Open floor between wall and pillar is free
    let (min, _) = grid.bounds();
    let open = WorldPoint::new(min.x + 1.5, min.y + 1.0);
    assert!(grid.is_free(grid.world_to_grid(open)));
}

#[test]
fn test_flat_slab_without_obstacles_fails_at_slice() {
    let mut rng = StdRng::seed_from_u64(4);
    let pts: Vec<[f64; 3]> = (0..2000)
        .map(|_| {
            [
                rng.random_range(0.0..4.0),
                rng.random_range(0.0..4.0),
                rng.random_range(-0.005..0.005),
            ]
        })
        .collect();
    let config = BuildConfig {
        cleaning: CleaningConfig::disabled(),
        floor: seeded_floor_config(2),
        ..Default::default()
    };
    let err = MapBuilder::new(config)
        .unwrap()
        .build(&PointCloud::from_xyz(&pts), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, NavError::Validation { stage: "slice", count: 0, .. }));
}

#[test]
fn test_no_floor_is_geometry_error() {
    // Points scattered through a cube: no plane collects 5% of them
    let mut rng = StdRng::seed_from_u64(6);
    let pts: Vec<[f64; 3]> = (0..3000)
        .map(|_| {
            [
                rng.random_range(0.0..5.0),
                rng.random_range(0.0..5.0),
                rng.random_range(0.0..5.0),
            ]
        })
        .collect();
    let normalizer = FloorNormalizer::new(seeded_floor_config(3)).unwrap();
    let err = normalizer
        .normalize(&PointCloud::from_xyz(&pts), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, NavError::Geometry { total_points: 3000, .. }));
}

fn scattered_obstacles(seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pts: Vec<[f64; 3]> = (0..60)
        .map(|_| [rng.random_range(0.0..8.0), rng.random_range(0.0..6.0), 1.0])
        .collect();
    // Pin the frame
    pts.push([0.0, 0.0, 1.0]);
    pts.push([8.0, 6.0, 1.0]);
    PointCloud::from_xyz(&pts)
}

fn assert_inflation_covers(shape: KernelShape, radius: f64) {
    let config = RasterConfig::default()
        .with_resolution(0.1)
        .with_inflation_radius(radius)
        .with_inflation_shape(shape);
    let r = config.inflation_cells() as i32;
    let output = GridRasterizer::new(config)
        .unwrap()
        .rasterize(&scattered_obstacles(12))
        .unwrap();
    let grid = &output.grid;

    // Free after inflation is a subset of free before
    assert!(output.raw.is_subset_of(&OccupancyMask::from_grid(grid)));

    for row in 0..grid.height() as i32 {
        for col in 0..grid.width() as i32 {
            let c = GridCoord::new(col, row);
            if !output.raw.get(c) {
                continue;
            }
            for dr in -r..=r {
                for dc in -r..=r {
                    let within = match shape {
                        KernelShape::Square => true,
                        KernelShape::Disk => dr * dr + dc * dc <= r * r,
                    };
                    let n = GridCoord::new(col + dc, row + dr);
                    if within && grid.is_valid_coord(n) {
                        assert!(!grid.is_free(n), "{:?} not inflated around {:?}", n, c);
                    }
                }
            }
        }
    }
}

#[test]
fn test_inflation_square() {
    assert_inflation_covers(KernelShape::Square, 0.3);
}

#[test]
fn test_inflation_disk() {
    assert_inflation_covers(KernelShape::Disk, 0.25);
}
