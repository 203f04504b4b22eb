//! Multiquadric radial basis interpolation over scattered 2-D points.

use nalgebra::{DMatrix, DVector};

use crate::data::model::SurveyPoint;
use crate::error::{DemoError, Result};

/// Pivots smaller than this (relative to the largest matrix entry) are
/// treated as zero.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// A fitted multiquadric interpolant `f(p) = Σ wᵢ · sqrt((|p - pᵢ| / ε)² + 1)`.
#[derive(Debug, Clone)]
pub struct Multiquadric {
    nodes: Vec<(f64, f64)>,
    weights: Vec<f64>,
    epsilon: f64,
}

impl Multiquadric {
    /// Fit the interpolant through `points`.
    ///
    /// `smooth` is subtracted from the kernel diagonal; zero gives an exact
    /// interpolant.  `epsilon` of `None` uses the mean node spacing estimated
    /// from the bounding box.
    pub fn fit(points: &[SurveyPoint], smooth: f64, epsilon: Option<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(DemoError::EmptySurvey);
        }
        let nodes: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        let epsilon = epsilon.unwrap_or_else(|| default_epsilon(&nodes));
        let n = nodes.len();

        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                matrix[i * n + j] = kernel(distance(nodes[i], nodes[j]), epsilon);
            }
            matrix[i * n + i] -= smooth;
        }
        let rhs: Vec<f64> = points.iter().map(|p| p.z).collect();
        let weights = solve(matrix, rhs)?;

        log::debug!(
            "multiquadric fit: {n} nodes, epsilon {epsilon:.4}, |w|max {:.3}",
            weights.iter().fold(0.0f64, |m, w| m.max(w.abs()))
        );
        Ok(Multiquadric {
            nodes,
            weights,
            epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&node, w)| w * kernel(distance(node, (x, y)), self.epsilon))
            .sum()
    }
}

fn kernel(r: f64, epsilon: f64) -> f64 {
    ((r / epsilon).powi(2) + 1.0).sqrt()
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// `(Π edges / N)^(1 / #edges)` over the non-degenerate bounding-box edges.
fn default_epsilon(nodes: &[(f64, f64)]) -> f64 {
    let extent = |coord: fn(&(f64, f64)) -> f64| {
        let (lo, hi) = nodes
            .iter()
            .map(coord)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        hi - lo
    };
    let edges: Vec<f64> = [extent(|p| p.0), extent(|p| p.1)]
        .into_iter()
        .filter(|&e| e > 0.0)
        .collect();
    if edges.is_empty() {
        return 1.0;
    }
    let product: f64 = edges.iter().product();
    (product / nodes.len() as f64).powf(1.0 / edges.len() as f64)
}

/// Dense LU solve of the row-major `n × n` system `a · x = b`.
fn solve(a: Vec<f64>, b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    let matrix = DMatrix::from_row_slice(n, n, &a);
    let scale = matrix.amax().max(1.0);

    let lu = matrix.lu();
    let u = lu.u();
    if let Some(row) = (0..n).find(|&i| u[(i, i)].abs() <= SINGULAR_TOLERANCE * scale) {
        return Err(DemoError::SingularSystem {
            row,
            pivot: u[(row, row)],
        });
    }
    let x = lu
        .solve(&DVector::from_vec(b))
        .ok_or(DemoError::SingularSystem {
            row: n.saturating_sub(1),
            pivot: 0.0,
        })?;
    Ok(x.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn pts(raw: &[(f64, f64, f64)]) -> Vec<SurveyPoint> {
        raw.iter().map(|&(x, y, z)| SurveyPoint { x, y, z }).collect()
    }

    #[test]
    fn solve_small_system() {
        // 2x + y = 5, x + 3y = 10
        let x = solve(vec![2.0, 1.0, 1.0, 3.0], vec![5.0, 10.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn solve_needs_pivoting() {
        let x = solve(vec![0.0, 1.0, 1.0, 0.0], vec![4.0, 7.0]).unwrap();
        assert_relative_eq!(x[0], 7.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn solve_dense_three_by_three() {
        // x = (1, -2, 3)
        let a = vec![4.0, -1.0, 2.0, 3.0, 5.0, -1.0, 1.0, 1.0, 6.0];
        let b = vec![12.0, -10.0, 17.0];
        let x = solve(a, b).unwrap();
        assert_eq!(x.len(), 3);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], -2.0, epsilon = 1e-10);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn singular_system_is_reported() {
        let err = solve(vec![1.0, 2.0, 2.0, 4.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, DemoError::SingularSystem { row: 1, .. }));
    }

    #[test]
    fn exact_fit_passes_through_nodes() {
        let points = pts(&[(0.0, 0.0, 1.0), (1.0, 0.0, 2.0), (0.0, 1.0, -1.0), (1.0, 1.0, 0.5)]);
        let f = Multiquadric::fit(&points, 0.0, None).unwrap();
        for p in &points {
            assert_abs_diff_eq!(f.eval(p.x, p.y), p.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn default_epsilon_matches_bounding_box_rule() {
        // edges 2 × 1, 4 nodes -> sqrt(2 / 4)
        let points = pts(&[(0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (0.0, 1.0, 0.0), (2.0, 1.0, 1.0)]);
        let f = Multiquadric::fit(&points, 0.0, None).unwrap();
        assert_relative_eq!(f.epsilon(), 0.5f64.sqrt());
    }

    #[test]
    fn degenerate_axis_is_dropped_from_epsilon() {
        // all on y = 0: edges = [3], 3 nodes -> 1
        let points = pts(&[(0.0, 0.0, 0.0), (1.5, 0.0, 1.0), (3.0, 0.0, 0.0)]);
        let f = Multiquadric::fit(&points, 0.0, None).unwrap();
        assert_relative_eq!(f.epsilon(), 1.0);
    }

    #[test]
    fn smoothing_relaxes_fit() {
        let points = pts(&[(0.0, 0.0, 0.0), (0.5, 0.0, 3.0), (1.0, 0.0, 0.0), (0.5, 0.5, 1.0)]);
        let exact = Multiquadric::fit(&points, 0.0, Some(0.5)).unwrap();
        let smooth = Multiquadric::fit(&points, 0.5, Some(0.5)).unwrap();
        assert_abs_diff_eq!(exact.eval(0.5, 0.0), 3.0, epsilon = 1e-9);
        assert!((smooth.eval(0.5, 0.0) - 3.0).abs() > 1e-6);
    }

    #[test]
    fn empty_survey_is_an_error() {
        assert!(matches!(Multiquadric::fit(&[], 0.1, None), Err(DemoError::EmptySurvey)));
    }
}
