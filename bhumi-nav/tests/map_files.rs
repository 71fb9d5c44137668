//! Build, persist, reload and route.

mod common;

use std::sync::Arc;

use bhumi_nav::cloud::{CleaningConfig, PointCloud};
use bhumi_nav::io::{MapFileSettings, load_map, load_point_cloud, save_map, save_report, write_ply};
use bhumi_nav::navigation::{NamedLocation, Waypoint};
use bhumi_nav::{
    BuildConfig, CancelToken, LocationRegistry, MapBuilder, NavConfig, NavigationConfig,
    Navigator, RouteQuery, WorldPoint,
};
use common::room_points;

fn build_room() -> bhumi_nav::MapBuild {
    let mut config = BuildConfig {
        cleaning: CleaningConfig::disabled(),
        ..Default::default()
    };
    config.floor.ransac.seed = Some(21);
    config.raster.inflation_radius = 0.2;
    MapBuilder::new(config)
        .unwrap()
        .build(
            &PointCloud::new(room_points(5.0, 3.0, 2.4, 0.05)),
            &CancelToken::new(),
        )
        .unwrap()
}

#[test]
fn test_saved_map_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let build = build_room();

    let yaml = save_map(&build.grid, dir.path(), &MapFileSettings::default()).unwrap();
    save_report(&build.diagnostics, &dir.path().join("report.json")).unwrap();

    let loaded = load_map(&yaml).unwrap();
    assert_eq!(loaded.width(), build.grid.width());
    assert_eq!(loaded.height(), build.grid.height());
    assert_eq!(loaded.cells(), build.grid.cells());
    assert_eq!(loaded.origin(), build.grid.origin());

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["grid_width"], build.grid.width());
    assert_eq!(report["floor_relaxed"], false);
}

#[test]
fn test_ply_file_builds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("room.ply");
    let cloud = PointCloud::new(room_points(4.0, 3.0, 2.4, 0.1));
    let mut file = std::fs::File::create(&path).unwrap();
    write_ply(&mut file, &cloud).unwrap();
    drop(file);

    let loaded = load_point_cloud(&path).unwrap();
    assert_eq!(loaded.len(), cloud.len());

    let mut config = NavConfig::default();
    config.cleaning.enabled = false;
    config.floor.seed = Some(5);
    let build = MapBuilder::new(config.to_build_config())
        .unwrap()
        .build(&loaded, &CancelToken::new())
        .unwrap();
    assert!(build.grid.occupied_count() > 0);
}

#[test]
fn test_route_between_named_locations_on_reloaded_map() {
    let dir = tempfile::tempdir().unwrap();
    let build = build_room();
    let yaml = save_map(&build.grid, dir.path(), &MapFileSettings::default()).unwrap();
    let grid = Arc::new(load_map(&yaml).unwrap());

    // Locations in the leveled frame: offset by the grid bounds
    let (min, _) = grid.bounds();
    let at = |x: f64, y: f64| WorldPoint::new(min.x + x, min.y + y);
    let registry = LocationRegistry::from_locations([
        NamedLocation::new("door", at(1.0, 1.0)),
        NamedLocation::new("desk", at(4.2, 2.6)),
        // Inside the wall band
        NamedLocation::new("wall", at(0.2, 1.5)),
    ])
    .unwrap();
    let locations = dir.path().join("locations.json");
    registry.save(&locations).unwrap();
    let registry = LocationRegistry::load(&locations).unwrap();

    let navigator = Navigator::new(
        grid.clone(),
        registry.clone(),
        NavigationConfig::default().with_simplify_epsilon(0.05),
    )
    .unwrap();
    let response = navigator
        .route(
            &RouteQuery::new(Waypoint::Named("door".into()), Waypoint::Named("desk".into())),
            &CancelToken::new(),
        )
        .unwrap();
    let route = response.route().unwrap();
    assert!(route.length_meters >= at(1.0, 1.0).distance(&at(4.2, 2.6)) - 2.0 * grid.resolution());
    assert!(route.simplified.as_ref().unwrap().len() <= route.waypoint_count);
    for p in &route.path_world {
        assert!(grid.state_world(*p).is_some_and(|s| s.is_free()));
    }

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "found");
    assert_eq!(json["waypoint_count"], route.waypoint_count);

    // Blocked endpoint: rejected without snapping, accepted with it
    let query = RouteQuery::new(Waypoint::Named("wall".into()), Waypoint::Named("desk".into()));
    assert!(navigator.route(&query, &CancelToken::new()).is_err());

    let snapping = Navigator::new(grid, registry, NavigationConfig::default().with_snap_radius(8))
        .unwrap();
    assert!(snapping.route(&query, &CancelToken::new()).unwrap().is_found());
}
