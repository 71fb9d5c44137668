//! A* correctness checks against exhaustive search and closed-form costs.

mod common;

use approx::assert_relative_eq;
use bhumi_nav::error::{Endpoint, PositionFault};
use bhumi_nav::pathfinding::{AStarConfig, AStarPlanner, PathOutcome};
use bhumi_nav::{CancelToken, GridCoord, GridMap, NavError, WorldPoint};
use common::{dijkstra_cost, random_grid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::SQRT_2;

fn check_against_dijkstra(config: AStarConfig, seeds: std::ops::Range<u64>) {
    let mut found = 0;
    for seed in seeds {
        let grid = random_grid(24, 16, 0.28, seed);
        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(23, 15);

        let expected = dijkstra_cost(
            &grid,
            start,
            goal,
            config.allow_diagonal,
            config.straight_cost,
            config.diagonal_cost,
        );
        let outcome = AStarPlanner::new(&grid, config.clone())
            .unwrap()
            .find_path(start, goal)
            .unwrap();

        match (expected, outcome) {
            (Some(cost), PathOutcome::Found(path)) => {
                found += 1;
                assert_relative_eq!(path.cost, cost, epsilon = 1e-4);
                assert_eq!(path.start(), Some(start));
                assert_eq!(path.goal(), Some(goal));
                let mut walked = 0.0;
                for w in path.cells.windows(2) {
                    assert!(grid.is_free(w[1]));
                    assert!(w[0].is_adjacent(&w[1]));
                    if !config.allow_diagonal {
                        assert!(!w[0].is_diagonal_step(&w[1]));
                    }
                    walked += config.step_cost(w[0], w[1]);
                }
                assert_relative_eq!(walked, path.cost, epsilon = 1e-9);
            }
            (None, PathOutcome::NoPath { .. }) => {}
            (expected, outcome) => panic!(
                "seed {}: dijkstra {:?} but A* found={}",
                seed,
                expected,
                outcome.is_found()
            ),
        }
    }
    assert!(found > 0, "no solvable grid among the seeds");
}

#[test]
fn test_optimal_eight_connected() {
    check_against_dijkstra(AStarConfig::default(), 0..25);
}

#[test]
fn test_optimal_four_connected() {
    check_against_dijkstra(AStarConfig::four_connected(), 100..125);
}

#[test]
fn test_optimal_custom_costs() {
    check_against_dijkstra(AStarConfig::default().with_costs(1.0, 1.2), 200..215);
    check_against_dijkstra(AStarConfig::default().with_costs(2.0, 2.5), 300..315);
    check_against_dijkstra(
        AStarConfig::four_connected().with_costs(0.5, 0.7),
        400..415,
    );
}

#[test]
fn test_open_grid_cost_is_octile() {
    let grid = GridMap::empty(40, 30, 0.1, WorldPoint::ZERO).unwrap();
    let planner = AStarPlanner::with_defaults(&grid);
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..20 {
        let a = GridCoord::new(rng.random_range(0..40), rng.random_range(0..30));
        let b = GridCoord::new(rng.random_range(0..40), rng.random_range(0..30));
        let path = planner.find_path(a, b).unwrap().into_path().unwrap();
        let dx = (a.col - b.col).abs() as f64;
        let dy = (a.row - b.row).abs() as f64;
        let octile = dx.max(dy) - dx.min(dy) + SQRT_2 * dx.min(dy);
        assert_relative_eq!(path.cost, octile, epsilon = 1e-9);
        assert_eq!(path.len(), a.chebyshev_distance(&b) as usize + 1);
    }
}

#[test]
fn test_ten_by_ten_diagonal() {
    let grid = GridMap::empty(10, 10, 1.0, WorldPoint::ZERO).unwrap();
    let path = AStarPlanner::with_defaults(&grid)
        .find_path(GridCoord::new(0, 0), GridCoord::new(9, 9))
        .unwrap()
        .into_path()
        .unwrap();
    assert_relative_eq!(path.cost, 9.0 * SQRT_2, epsilon = 1e-9);
    assert!((path.cost - 12.73).abs() < 0.01);
    assert_eq!(path.len(), 10);
}

#[test]
fn test_wall_gives_no_path() {
    let grid = GridMap::from_ascii(
        "
        ....#....
        ....#....
        ....#....
        ....#....
        ",
        1.0,
        WorldPoint::ZERO,
    )
    .unwrap();
    for config in [AStarConfig::default(), AStarConfig::four_connected()] {
        let outcome = AStarPlanner::new(&grid, config)
            .unwrap()
            .find_path(GridCoord::new(0, 0), GridCoord::new(8, 3))
            .unwrap();
        assert!(!outcome.is_found());
        // Everything reachable on the left side was expanded
        assert_eq!(outcome.nodes_expanded(), 16);
    }
}

#[test]
fn test_bad_endpoints() {
    let grid = GridMap::from_ascii("#..\n...\n..#", 1.0, WorldPoint::ZERO).unwrap();
    let planner = AStarPlanner::with_defaults(&grid);

    let err = planner
        .find_path(GridCoord::new(0, 0), GridCoord::new(1, 1))
        .unwrap_err();
    assert!(matches!(
        err,
        NavError::InvalidPosition {
            endpoint: Endpoint::Start,
            reason: PositionFault::Occupied,
            ..
        }
    ));

    let err = planner
        .find_path(GridCoord::new(1, 1), GridCoord::new(3, 1))
        .unwrap_err();
    assert!(matches!(
        err,
        NavError::InvalidPosition {
            endpoint: Endpoint::Goal,
            reason: PositionFault::OutOfBounds,
            ..
        }
    ));
    assert!(err.to_string().contains("goal"));
}

#[test]
fn test_inadmissible_costs_rejected() {
    let grid = GridMap::empty(4, 4, 1.0, WorldPoint::ZERO).unwrap();
    for (straight, diagonal) in [(1.0, 1.5), (1.0, 0.9), (0.0, 0.0), (-1.0, -1.0)] {
        let config = AStarConfig::default().with_costs(straight, diagonal);
        assert!(matches!(
            AStarPlanner::new(&grid, config),
            Err(NavError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_cancelled_search() {
    let grid = GridMap::empty(50, 50, 1.0, WorldPoint::ZERO).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = AStarPlanner::with_defaults(&grid)
        .find_path_with_cancel(GridCoord::new(0, 0), GridCoord::new(49, 49), &cancel)
        .unwrap_err();
    assert!(matches!(err, NavError::Cancelled { .. }));
}

#[test]
fn test_world_cell_round_trip() {
    let grid = GridMap::empty(64, 48, 0.05, WorldPoint::new(-1.3, 2.1)).unwrap();
    let (min, max) = grid.bounds();
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..500 {
        let p = WorldPoint::new(
            rng.random_range(min.x..max.x),
            rng.random_range(min.y..max.y),
        );
        let cell = grid.world_to_grid(p);
        assert!(grid.is_valid_coord(cell));
        let back = grid.grid_to_world(cell);
        assert!(back.distance(&p) <= grid.resolution());
    }
}
