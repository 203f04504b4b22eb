//! Basin volume from an incomplete survey: naive mean vs. spatial
//! interpolation.

use serde::Serialize;

use crate::config::GeometryParams;
use crate::data::model::{Grid2, SurveyPoint};
use crate::data::synthetic::{basin_axes, inside_basin};
use crate::error::{DemoError, Result};

use super::rbf::Multiquadric;

/// Everything the geometry chart and report need.
#[derive(Debug, Clone)]
pub struct GeometryAnalysis {
    pub truth: Grid2,
    pub survey: Vec<SurveyPoint>,
    pub reconstruction: Grid2,
    pub summary: GeometrySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometrySummary {
    pub survey_points: usize,
    pub basin_nodes: usize,
    pub mean_depth: f64,
    pub volume_true: f64,
    pub volume_mean: f64,
    pub volume_interpolated: f64,
    pub mean_error_pct: f64,
    pub interpolated_error_pct: f64,
    pub rbf_epsilon: f64,
}

pub fn mean_depth(points: &[SurveyPoint]) -> Result<f64> {
    if points.is_empty() {
        return Err(DemoError::EmptySurvey);
    }
    Ok(points.iter().map(|p| p.z).sum::<f64>() / points.len() as f64)
}

/// `nansum(depth) · pixel_area`.
pub fn volume(grid: &Grid2, pixel_area: f64) -> f64 {
    grid.nansum() * pixel_area
}

/// `|estimate - truth| / |truth|` in percent; `NaN` when the truth is zero.
pub fn relative_error_pct(estimate: f64, truth: f64) -> f64 {
    if truth == 0.0 {
        f64::NAN
    } else {
        (estimate - truth).abs() / truth.abs() * 100.0
    }
}

/// Evaluate the interpolant over the basin lattice, `NaN` outside the rim.
pub fn reconstruct(model: &Multiquadric, grid_size: usize) -> Grid2 {
    let (xa, ya) = basin_axes(grid_size);
    Grid2::from_fn(xa, ya, |x, y| {
        if inside_basin(x, y) {
            model.eval(x, y)
        } else {
            f64::NAN
        }
    })
}

/// Compare both estimators against the known truth.
pub fn analyse(
    params: &GeometryParams,
    truth: Grid2,
    survey: Vec<SurveyPoint>,
) -> Result<GeometryAnalysis> {
    let mean = mean_depth(&survey)?;
    let basin_nodes = truth.finite_count();

    let model = Multiquadric::fit(&survey, params.smooth, params.epsilon)?;
    let reconstruction = reconstruct(&model, params.grid_size);

    let volume_true = volume(&truth, params.pixel_area);
    let volume_mean = mean * basin_nodes as f64 * params.pixel_area;
    let volume_interpolated = volume(&reconstruction, params.pixel_area);

    let summary = GeometrySummary {
        survey_points: survey.len(),
        basin_nodes,
        mean_depth: mean,
        volume_true,
        volume_mean,
        volume_interpolated,
        mean_error_pct: relative_error_pct(volume_mean, volume_true),
        interpolated_error_pct: relative_error_pct(volume_interpolated, volume_true),
        rbf_epsilon: model.epsilon(),
    };
    log::info!(
        "geometry: true volume {:.2}, mean-based {:.2} ({:.1}%), interpolated {:.2} ({:.1}%)",
        volume_true.abs(),
        volume_mean.abs(),
        summary.mean_error_pct,
        volume_interpolated.abs(),
        summary.interpolated_error_pct
    );

    Ok(GeometryAnalysis {
        truth,
        survey,
        reconstruction,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{random_survey, true_basin};
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_known_depths() {
        let pts = [
            SurveyPoint { x: 0.0, y: 0.0, z: -2.0 },
            SurveyPoint { x: 0.0, y: 0.0, z: -4.0 },
        ];
        assert_relative_eq!(mean_depth(&pts).unwrap(), -3.0);
        assert!(matches!(mean_depth(&[]), Err(DemoError::EmptySurvey)));
    }

    #[test]
    fn relative_error_handles_zero_truth() {
        assert_relative_eq!(relative_error_pct(-90.0, -100.0), 10.0);
        assert!(relative_error_pct(1.0, 0.0).is_nan());
    }

    #[test]
    fn true_volume_close_to_analytic() {
        // ∫∫ -10 (1 - r^1.5) dA over the unit disc = -10 π (1 - 4/7) ≈ -13.46,
        // scaled by the (2/100)² vs (2/99)² pixel convention.
        let params = GeometryParams::default();
        let v = volume(&true_basin(&params), params.pixel_area);
        let analytic = -10.0 * std::f64::consts::PI * (1.0 - 4.0 / 7.0) * (0.99f64).powi(2);
        assert_relative_eq!(v, analytic, max_relative = 0.02);
    }

    #[test]
    fn interpolation_beats_mean_on_default_scenario() {
        let params = GeometryParams::default();
        let survey = random_survey(&params);
        let a = analyse(&params, true_basin(&params), survey).unwrap();
        assert_eq!(a.summary.survey_points, a.survey.len());
        assert!(a.reconstruction.get(0, 0).is_nan());
        assert_eq!(a.reconstruction.finite_count(), a.summary.basin_nodes);
        assert!(
            a.summary.interpolated_error_pct < 25.0,
            "interpolated error {}",
            a.summary.interpolated_error_pct
        );
        assert!(a.summary.volume_true < 0.0);
    }
}
