//! RANSAC plane fitting.
//!
//! Trials are drawn up front from a seedable RNG and scored in parallel
//! batches. The best trial is chosen by inlier count, lowest trial index on
//! ties, so a seeded fit gives the same plane regardless of thread count.

use super::PlaneModel;
use crate::core::CancelToken;
use crate::error::{NavError, Result};
use log::{debug, info, warn};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// One RANSAC pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RansacPass {
    /// Inlier distance threshold (meters)
    pub distance_threshold: f64,
    /// Number of 3-point trials
    pub iterations: usize,
    /// Minimum fraction of points that must be inliers
    pub min_inlier_fraction: f64,
}

impl RansacPass {
    /// Create a pass
    pub fn new(distance_threshold: f64, iterations: usize, min_inlier_fraction: f64) -> Self {
        Self {
            distance_threshold,
            iterations,
            min_inlier_fraction,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.distance_threshold.is_finite() && self.distance_threshold > 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "RANSAC distance threshold must be positive, got {}",
                self.distance_threshold
            )));
        }
        if self.iterations == 0 {
            return Err(NavError::InvalidConfig(
                "RANSAC iterations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_inlier_fraction) {
            return Err(NavError::InvalidConfig(format!(
                "RANSAC min inlier fraction must be in [0, 1], got {}",
                self.min_inlier_fraction
            )));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "eps={:.3}m iters={} min={:.1}%",
            self.distance_threshold,
            self.iterations,
            self.min_inlier_fraction * 100.0
        )
    }
}

/// Configuration for RANSAC plane fitting.
#[derive(Clone, Debug)]
pub struct RansacConfig {
    /// First pass.
    /// Default: 0.02 m, 1000 trials, 10% inliers
    pub primary: RansacPass,

    /// Looser pass tried when the first one fails.
    /// Default: 0.05 m, 2000 trials, 5% inliers
    pub relaxed: Option<RansacPass>,

    /// Candidate planes tilted more than this from horizontal are ignored.
    /// Default: 45°
    pub max_tilt_degrees: f64,

    /// Trials scored per parallel batch; cancellation is checked between
    /// batches.
    /// Default: 64
    pub batch_size: usize,

    /// RNG seed. `None` draws a fresh seed per fit.
    pub seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            primary: RansacPass::new(0.02, 1000, 0.10),
            relaxed: Some(RansacPass::new(0.05, 2000, 0.05)),
            max_tilt_degrees: 45.0,
            batch_size: 64,
            seed: None,
        }
    }
}

impl RansacConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the primary pass.
    pub fn with_primary(mut self, pass: RansacPass) -> Self {
        self.primary = pass;
        self
    }

    /// Builder-style setter for the relaxed pass.
    pub fn with_relaxed(mut self, pass: Option<RansacPass>) -> Self {
        self.relaxed = pass;
        self
    }

    /// Builder-style setter for the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder-style setter for the tilt limit.
    pub fn with_max_tilt_degrees(mut self, degrees: f64) -> Self {
        self.max_tilt_degrees = degrees;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        self.primary.validate()?;
        if let Some(relaxed) = &self.relaxed {
            relaxed.validate()?;
        }
        if !(self.max_tilt_degrees > 0.0 && self.max_tilt_degrees <= 90.0) {
            return Err(NavError::InvalidConfig(format!(
                "max_tilt_degrees must be in (0, 90], got {}",
                self.max_tilt_degrees
            )));
        }
        if self.batch_size == 0 {
            return Err(NavError::InvalidConfig("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Result of RANSAC plane fitting.
#[derive(Clone, Debug)]
pub struct RansacResult {
    /// Refit plane with its inlier indices
    pub plane: PlaneModel,
    /// Inlier fraction of the returned plane
    pub inlier_ratio: f64,
    /// Whether the relaxed pass produced the plane
    pub relaxed: bool,
    /// Trials evaluated over all passes
    pub trials: usize,
}

#[derive(Clone, Copy, Debug)]
struct TrialScore {
    index: usize,
    count: usize,
}

impl TrialScore {
    const NONE: TrialScore = TrialScore {
        index: usize::MAX,
        count: 0,
    };

    /// Higher count wins, lower index breaks ties
    fn better(self, other: TrialScore) -> TrialScore {
        if other.count > self.count || (other.count == self.count && other.index < self.index) {
            other
        } else {
            self
        }
    }
}

/// Fit the dominant near-horizontal plane of `points`.
pub fn fit_plane(
    points: &[Point3<f64>],
    config: &RansacConfig,
    cancel: &CancelToken,
) -> Result<RansacResult> {
    config.validate()?;
    let n = points.len();
    if n < 3 {
        return Err(NavError::Validation {
            stage: "floor",
            count: n,
            minimum: 3,
        });
    }

    let base_seed = config
        .seed
        .unwrap_or_else(|| rand::rng().random::<u64>());

    let mut trials = 0;
    let mut best_overall = 0;

    let primary = run_pass(points, &config.primary, config, base_seed, cancel)?;
    trials += config.primary.iterations;
    match primary {
        PassOutcome::Accepted(plane) => {
            return Ok(finish(plane, n, false, trials));
        }
        PassOutcome::Rejected(best) => best_overall = best_overall.max(best),
    }

    if let Some(relaxed) = &config.relaxed {
        warn!(
            "[Floor] Primary RANSAC pass failed (best {} of {} inliers), relaxing to {}",
            best_overall,
            n,
            relaxed.describe()
        );
        let outcome = run_pass(points, relaxed, config, base_seed.wrapping_add(1), cancel)?;
        trials += relaxed.iterations;
        match outcome {
            PassOutcome::Accepted(plane) => return Ok(finish(plane, n, true, trials)),
            PassOutcome::Rejected(best) => best_overall = best_overall.max(best),
        }
    }

    let mut thresholds = config.primary.describe();
    if let Some(relaxed) = &config.relaxed {
        thresholds.push_str("; ");
        thresholds.push_str(&relaxed.describe());
    }
    debug!("[Floor] FAILED: no plane after {} trials", trials);
    Err(NavError::Geometry {
        best_inliers: best_overall,
        total_points: n,
        thresholds,
    })
}

fn finish(plane: PlaneModel, n: usize, relaxed: bool, trials: usize) -> RansacResult {
    let inlier_ratio = plane.inliers.len() as f64 / n as f64;
    info!(
        "[Floor] Plane ({:.4}, {:.4}, {:.4}, {:.4}) with {} inliers ({:.1}%){}",
        plane.normal.x,
        plane.normal.y,
        plane.normal.z,
        plane.d,
        plane.inliers.len(),
        inlier_ratio * 100.0,
        if relaxed { " [relaxed]" } else { "" }
    );
    RansacResult {
        plane,
        inlier_ratio,
        relaxed,
        trials,
    }
}

enum PassOutcome {
    Accepted(PlaneModel),
    /// Best inlier count seen
    Rejected(usize),
}

fn run_pass(
    points: &[Point3<f64>],
    pass: &RansacPass,
    config: &RansacConfig,
    seed: u64,
    cancel: &CancelToken,
) -> Result<PassOutcome> {
    let n = points.len();
    let samples = draw_samples(n, pass.iterations, seed);
    let max_tilt = config.max_tilt_degrees;

    let mut best = TrialScore::NONE;
    for (batch_idx, batch) in samples.chunks(config.batch_size).enumerate() {
        cancel.check("floor detection")?;
        let offset = batch_idx * config.batch_size;
        let batch_best = batch
            .par_iter()
            .enumerate()
            .map(|(i, &[a, b, c])| {
                let count = PlaneModel::through(&points[a], &points[b], &points[c])
                    .filter(|plane| plane.tilt_degrees() <= max_tilt)
                    .map(|plane| plane.count_inliers(points, pass.distance_threshold))
                    .unwrap_or(0);
                TrialScore {
                    index: offset + i,
                    count,
                }
            })
            .reduce(|| TrialScore::NONE, TrialScore::better);
        best = best.better(batch_best);
    }

    let min_count = (pass.min_inlier_fraction * n as f64).ceil() as usize;
    debug!(
        "[Floor] pass {}: best trial {} with {} inliers (need {})",
        pass.describe(),
        best.index,
        best.count,
        min_count
    );
    if best.count == 0 || best.count < min_count {
        return Ok(PassOutcome::Rejected(best.count));
    }

    let [a, b, c] = samples[best.index];
    let Some(mut plane) = PlaneModel::through(&points[a], &points[b], &points[c]) else {
        return Ok(PassOutcome::Rejected(best.count));
    };
    plane.inliers = plane.inlier_indices(points, pass.distance_threshold);

    // Least-squares refit on the inliers; keep it only if it holds at least
    // as many points and stays within the tilt limit.
    if let Some(mut refit) =
        PlaneModel::fit_least_squares(plane.inliers.iter().map(|&i| &points[i]))
    {
        refit.inliers = refit.inlier_indices(points, pass.distance_threshold);
        if refit.inliers.len() >= plane.inliers.len() && refit.tilt_degrees() <= max_tilt {
            plane = refit;
        }
    }
    Ok(PassOutcome::Accepted(plane))
}

/// Draw `count` triples of distinct indices in `0..n`
fn draw_samples(n: usize, count: usize, seed: u64) -> Vec<[usize; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let a = rng.random_range(0..n);
            let mut b = rng.random_range(0..n);
            while b == a {
                b = rng.random_range(0..n);
            }
            let mut c = rng.random_range(0..n);
            while c == a || c == b {
                c = rng.random_range(0..n);
            }
            [a, b, c]
        })
        .collect()
}
