//! Polyline simplification for planned paths.
//!
//! A* output has one waypoint per cell. Douglas-Peucker keeps only the
//! corners that matter; the grid-aware variant also refuses to drop a
//! waypoint if the shortcut would cross an occupied cell.

use crate::core::WorldPoint;
use crate::grid::GridMap;

/// Line-of-sight sampling step as a fraction of the grid resolution
const LOS_STEP_FRACTION: f64 = 0.25;

/// Douglas-Peucker simplification with tolerance `epsilon` (meters).
///
/// Endpoints are always kept.
pub fn simplify_path(path: &[WorldPoint], epsilon: f64) -> Vec<WorldPoint> {
    douglas_peucker(path, epsilon, |_, _| true)
}

/// Douglas-Peucker that only shortcuts segments with clear line of sight.
pub fn simplify_path_on_grid(grid: &GridMap, path: &[WorldPoint], epsilon: f64) -> Vec<WorldPoint> {
    douglas_peucker(path, epsilon, |a, b| line_of_sight(grid, a, b))
}

/// Total polyline length in meters
pub fn path_length(path: &[WorldPoint]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }

    path.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Every sample along the segment lies in a free cell
pub fn line_of_sight(grid: &GridMap, a: &WorldPoint, b: &WorldPoint) -> bool {
    let step = grid.resolution() * LOS_STEP_FRACTION;
    let steps = (a.distance(b) / step).ceil().max(1.0) as usize;
    (0..=steps).all(|i| {
        let t = i as f64 / steps as f64;
        let p = *a + (*b - *a) * t;
        grid.state_world(p).is_some_and(|s| s.is_free())
    })
}

fn douglas_peucker<F>(path: &[WorldPoint], epsilon: f64, can_shortcut: F) -> Vec<WorldPoint>
where
    F: Fn(&WorldPoint, &WorldPoint) -> bool,
{
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut keep = vec![false; path.len()];
    keep[0] = true;
    keep[path.len() - 1] = true;

    let mut stack = vec![(0, path.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let mut max_dist = -1.0;
        let mut split = first + 1;
        for i in first + 1..last {
            let d = point_to_segment_distance(&path[i], &path[first], &path[last]);
            if d > max_dist {
                max_dist = d;
                split = i;
            }
        }
        if max_dist > epsilon || !can_shortcut(&path[first], &path[last]) {
            keep[split] = true;
            stack.push((first, split));
            stack.push((split, last));
        }
    }

    path.iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(p, _)| *p)
        .collect()
}

fn point_to_segment_distance(
    point: &WorldPoint,
    line_start: &WorldPoint,
    line_end: &WorldPoint,
) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let line_length_sq = dx * dx + dy * dy;

    if line_length_sq < 1e-12 {
        // Segment is a point
        return point.distance(line_start);
    }

    // Project point onto segment
    let t = ((point.x - line_start.x) * dx + (point.y - line_start.y) * dy) / line_length_sq;
    let t_clamped = t.clamp(0.0, 1.0);
    let proj = WorldPoint::new(line_start.x + t_clamped * dx, line_start.y + t_clamped * dy);
    point.distance(&proj)
}
