use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{GeometryParams, GroundwaterParams, MassBalanceParams, SourceParams};

use super::model::{Axis, Band, Grid2, Marker, Signature, SignatureKind, SurveyPoint};

// ---------------------------------------------------------------------------
// Basin bathymetry
// ---------------------------------------------------------------------------

/// Bowl-shaped basin: deepest in the middle, flattening towards the rim.
pub fn basin_depth(x: f64, y: f64, max_depth: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    max_depth * (1.0 - r.powf(1.5))
}

/// The `[-1, 1]²` lattice used for both the truth and the reconstruction.
pub fn basin_axes(n: usize) -> (Axis, Axis) {
    (Axis::new(-1.0, 1.0, n), Axis::new(-1.0, 1.0, n))
}

pub fn inside_basin(x: f64, y: f64) -> bool {
    x * x + y * y <= 1.0
}

/// Ground-truth depth on the lattice, `NaN` outside the basin.
pub fn true_basin(params: &GeometryParams) -> Grid2 {
    let (xa, ya) = basin_axes(params.grid_size);
    Grid2::from_fn(xa, ya, |x, y| {
        if inside_basin(x, y) {
            basin_depth(x, y, params.max_depth)
        } else {
            f64::NAN
        }
    })
}

/// Whether a sounding is physically possible: inside the basin and outside
/// the obstructed quadrant.
pub fn is_accessible(x: f64, y: f64, obstruction: (f64, f64)) -> bool {
    inside_basin(x, y) && !(x > obstruction.0 && y > obstruction.1)
}

/// Draw random soundings, keep the accessible ones, cap the count.
///
/// All x coordinates are drawn before all y coordinates so that a given seed
/// always pairs the same values regardless of `max_points`.
pub fn random_survey(params: &GeometryParams) -> Vec<SurveyPoint> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let xs: Vec<f64> = (0..params.candidates)
        .map(|_| rng.random_range(-1.0..1.0))
        .collect();
    let ys: Vec<f64> = (0..params.candidates)
        .map(|_| rng.random_range(-1.0..1.0))
        .collect();

    xs.into_iter()
        .zip(ys)
        .filter(|&(x, y)| is_accessible(x, y, params.obstruction))
        .take(params.max_points)
        .map(|(x, y)| SurveyPoint {
            x,
            y,
            z: basin_depth(x, y, params.max_depth),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Groundwater sources
// ---------------------------------------------------------------------------

fn gaussian(x: f64, y: f64, x0: f64, y0: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-((x - x0).powi(2) + (y - y0).powi(2)) / (2.0 * sigma.powi(2))).exp()
}

/// Signed contribution of one source at `(x, y)`.
pub fn source_contribution(src: &SourceParams, x: f64, y: f64) -> f64 {
    let g = gaussian(x, y, src.x, src.y, src.sigma, src.amplitude);
    if src.recharge {
        -g
    } else {
        g
    }
}

/// Superposed stress field of all sources.
pub fn stress_field(params: &GroundwaterParams) -> Grid2 {
    let xa = Axis::new(0.0, params.extent, params.grid_size);
    let ya = Axis::new(0.0, params.extent, params.grid_size);
    Grid2::from_fn(xa, ya, |x, y| {
        params
            .sources
            .iter()
            .map(|s| source_contribution(s, x, y))
            .sum()
    })
}

// ---------------------------------------------------------------------------
// Spectral library
// ---------------------------------------------------------------------------

pub fn sensor_bands() -> Vec<Band> {
    vec![
        Band { name: "Blue", wavelength_nm: 450.0 },
        Band { name: "Green", wavelength_nm: 550.0 },
        Band { name: "Red", wavelength_nm: 650.0 },
        Band { name: "NIR", wavelength_nm: 850.0 },
    ]
}

/// Hypothetical reflectance of the four surfaces a water-quality satellite
/// has to tell apart.
pub fn signature_library() -> Vec<Signature> {
    vec![
        Signature {
            label: "Clear Water (Ground Truth)",
            kind: SignatureKind::Reference,
            reflectance: vec![0.05, 0.04, 0.01, 0.00],
            rgb: (0, 0, 255),
            dashed: false,
            marker: Marker::Circle,
            line_width: 2,
            alpha: 1.0,
        },
        Signature {
            label: "Algae Bloom (Biological)",
            kind: SignatureKind::Biological,
            reflectance: vec![0.06, 0.15, 0.05, 0.40],
            rgb: (0, 128, 0),
            dashed: false,
            marker: Marker::Circle,
            line_width: 3,
            alpha: 1.0,
        },
        Signature {
            label: "Atmospheric Haze (Non-Bio)",
            kind: SignatureKind::NonBiological,
            reflectance: vec![0.30, 0.25, 0.20, 0.10],
            rgb: (0, 191, 191),
            dashed: true,
            marker: Marker::Square,
            line_width: 1,
            alpha: 0.7,
        },
        Signature {
            label: "Sun Glint (Non-Bio)",
            kind: SignatureKind::NonBiological,
            reflectance: vec![0.50, 0.50, 0.50, 0.45],
            rgb: (191, 191, 0),
            dashed: true,
            marker: Marker::Triangle,
            line_width: 1,
            alpha: 0.7,
        },
    ]
}

// ---------------------------------------------------------------------------
// Rainfall
// ---------------------------------------------------------------------------

/// Hourly rainfall with the whole event falling in the first hour.
pub fn rainfall_impulse(params: &MassBalanceParams) -> Vec<f64> {
    let mut rain = vec![0.0; params.timesteps];
    if let Some(first) = rain.first_mut() {
        *first = params.rainfall_total;
    }
    rain
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basin_is_deepest_at_centre_and_dry_at_rim() {
        assert_relative_eq!(basin_depth(0.0, 0.0, -10.0), -10.0);
        assert_relative_eq!(basin_depth(1.0, 0.0, -10.0), 0.0, epsilon = 1e-12);
        assert!(basin_depth(0.5, 0.0, -10.0) < basin_depth(0.8, 0.0, -10.0));
    }

    #[test]
    fn true_basin_masks_outside_circle() {
        let g = true_basin(&GeometryParams::default());
        assert!(g.get(0, 0).is_nan());
        assert!(g.get(50, 50).is_finite());
        // π / (2/99)² ≈ 7700 nodes
        let inside = g.finite_count();
        assert!((7500..7900).contains(&inside), "inside = {inside}");
    }

    #[test]
    fn survey_is_reproducible_and_respects_obstruction() {
        let params = GeometryParams::default();
        let a = random_survey(&params);
        let b = random_survey(&params);
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert!(a.len() <= params.max_points);
        for p in &a {
            assert!(inside_basin(p.x, p.y));
            assert!(!(p.x > 0.2 && p.y > 0.2));
            assert_relative_eq!(p.z, basin_depth(p.x, p.y, -10.0));
        }
    }

    #[test]
    fn different_seeds_give_different_surveys() {
        let a = random_survey(&GeometryParams::default());
        let b = random_survey(&GeometryParams {
            seed: 7,
            ..GeometryParams::default()
        });
        assert_ne!(a, b);
    }

    #[test]
    fn recharge_source_lowers_field() {
        let params = GroundwaterParams::default();
        let field = stress_field(&params);
        // Water body centre at (75, 25): dominated by recharge.
        assert!(field.sample(75.0, 25.0).unwrap() < 0.0);
        // Built-up centre at (75, 75): strongest consumption.
        let built = field.sample(75.0, 75.0).unwrap();
        assert!(built > 0.95, "built = {built}");
    }

    #[test]
    fn library_is_aligned_with_bands() {
        let bands = sensor_bands();
        for s in signature_library() {
            assert_eq!(s.reflectance.len(), bands.len(), "{}", s.label);
        }
    }

    #[test]
    fn rainfall_is_single_impulse() {
        let rain = rainfall_impulse(&MassBalanceParams::default());
        assert_eq!(rain.len(), 24);
        assert_eq!(rain[0], 1000.0);
        assert_eq!(rain.iter().sum::<f64>(), 1000.0);
    }
}
