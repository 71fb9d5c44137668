//! Plane model `ax + by + cz + d = 0`.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};

/// Squared cross-product norm below which three points count as collinear.
const DEGENERATE_EPS: f64 = 1e-12;

/// Fitted plane with the inliers that support it.
///
/// The normal `(a, b, c)` is unit length with `c ≥ 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneModel {
    /// Unit normal (a, b, c)
    pub normal: Vector3<f64>,
    /// Offset d
    pub d: f64,
    /// Indices of inlier points in the fitted cloud
    pub inliers: Vec<usize>,
}

impl PlaneModel {
    /// Plane through three points, `None` if they are (nearly) collinear
    pub fn through(p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> Option<Self> {
        let n = (p2 - p1).cross(&(p3 - p1));
        if n.norm_squared() < DEGENERATE_EPS {
            return None;
        }
        Some(Self::from_normal_and_point(n.normalize(), p1))
    }

    /// Least-squares plane through `points`.
    ///
    /// The normal is the eigenvector of the smallest eigenvalue of the
    /// covariance matrix; the plane passes through the centroid.
    pub fn fit_least_squares<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let pts: Vec<&Point3<f64>> = points.into_iter().collect();
        if pts.len() < 3 {
            return None;
        }

        let mut centroid = Vector3::zeros();
        for p in &pts {
            centroid += p.coords;
        }
        centroid /= pts.len() as f64;

        let mut cov = Matrix3::zeros();
        for p in &pts {
            let d = p.coords - centroid;
            cov += d * d.transpose();
        }
        cov /= pts.len() as f64;

        let eigen = SymmetricEigen::new(cov);
        let mut min_idx = 0;
        for i in 1..3 {
            if eigen.eigenvalues[i] < eigen.eigenvalues[min_idx] {
                min_idx = i;
            }
        }
        let normal: Vector3<f64> = eigen.eigenvectors.column(min_idx).into_owned();
        if !normal.iter().all(|v| v.is_finite()) || normal.norm_squared() < DEGENERATE_EPS {
            return None;
        }
        Some(Self::from_normal_and_point(
            normal.normalize(),
            &Point3::from(centroid),
        ))
    }

    fn from_normal_and_point(normal: Vector3<f64>, point: &Point3<f64>) -> Self {
        let normal = if normal.z < 0.0 { -normal } else { normal };
        Self {
            normal,
            d: -normal.dot(&point.coords),
            inliers: Vec::new(),
        }
    }

    /// Coefficients (a, b, c, d)
    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    /// Signed distance of a point (positive above the plane)
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) + self.d
    }

    /// Number of points within `threshold` of the plane
    pub fn count_inliers(&self, points: &[Point3<f64>], threshold: f64) -> usize {
        points
            .iter()
            .filter(|p| self.signed_distance(p).abs() <= threshold)
            .count()
    }

    /// Indices of points within `threshold` of the plane
    pub fn inlier_indices(&self, points: &[Point3<f64>], threshold: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.signed_distance(p).abs() <= threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Angle between the normal and +Z in degrees
    pub fn tilt_degrees(&self) -> f64 {
        self.normal.z.clamp(-1.0, 1.0).acos().to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_through_orients_up() {
        // Clockwise seen from above gives a downward cross product
        let plane = PlaneModel::through(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::new(0.0, 1.0, 1.0),
            &Point3::new(1.0, 0.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(plane.normal, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(plane.d, -1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.signed_distance(&Point3::new(3.0, 3.0, 1.5)), 0.5);
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let p = Point3::new(0.0, 0.0, 0.0);
        let q = Point3::new(1.0, 1.0, 1.0);
        let r = Point3::new(2.0, 2.0, 2.0);
        assert!(PlaneModel::through(&p, &q, &r).is_none());
    }

    #[test]
    fn test_least_squares_tilted() {
        let mut pts = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                let x = i as f64 * 0.1;
                let y = j as f64 * 0.1;
                pts.push(Point3::new(x, y, 0.5 * x + 2.0));
            }
        }
        let plane = PlaneModel::fit_least_squares(&pts).unwrap();
        let expected = Vector3::new(-0.5, 0.0, 1.0).normalize();
        assert_relative_eq!(plane.normal, expected, epsilon = 1e-9);
        assert_eq!(plane.count_inliers(&pts, 1e-9), 100);
        assert_relative_eq!(plane.tilt_degrees(), 0.5f64.atan().to_degrees(), epsilon = 1e-9);
    }
}
