use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Axis – evenly spaced coordinates, endpoints inclusive
// ---------------------------------------------------------------------------

/// A `linspace` axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub start: f64,
    pub stop: f64,
    pub len: usize,
}

impl Axis {
    pub fn new(start: f64, stop: f64, len: usize) -> Self {
        Axis { start, stop, len }
    }

    /// Distance between neighbouring nodes.
    pub fn step(&self) -> f64 {
        if self.len < 2 {
            0.0
        } else {
            (self.stop - self.start) / (self.len - 1) as f64
        }
    }

    /// Coordinate of node `i`.
    pub fn at(&self, i: usize) -> f64 {
        if i + 1 == self.len {
            self.stop
        } else {
            self.start + i as f64 * self.step()
        }
    }

    /// Fractional node index of coordinate `v` (may lie outside `0..len-1`).
    pub fn fractional_index(&self, v: f64) -> f64 {
        let step = self.step();
        if step == 0.0 {
            0.0
        } else {
            (v - self.start) / step
        }
    }
}

// ---------------------------------------------------------------------------
// Grid2 – a scalar field sampled on a regular 2-D lattice
// ---------------------------------------------------------------------------

/// Row-major scalar field; row index follows `y`, column index follows `x`.
/// Cells outside the domain of interest hold `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2 {
    pub x: Axis,
    pub y: Axis,
    pub values: Vec<f64>,
}

impl Grid2 {
    /// Fill a grid by evaluating `f(x, y)` at every node.
    pub fn from_fn(x: Axis, y: Axis, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        let mut values = Vec::with_capacity(x.len * y.len);
        for row in 0..y.len {
            let yv = y.at(row);
            for col in 0..x.len {
                values.push(f(x.at(col), yv));
            }
        }
        Grid2 { x, y, values }
    }

    pub fn rows(&self) -> usize {
        self.y.len
    }

    pub fn cols(&self) -> usize {
        self.x.len
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.x.len + col]
    }

    /// Sum of the finite values (`nansum`).
    pub fn nansum(&self) -> f64 {
        self.values.iter().filter(|v| v.is_finite()).sum()
    }

    /// Number of finite cells.
    pub fn finite_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Minimum and maximum of the finite values, `None` if there are none.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Bilinear sample at `(x, y)`; `None` outside the lattice.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        let fc = self.x.fractional_index(x);
        let fr = self.y.fractional_index(y);
        let max_c = (self.cols() - 1) as f64;
        let max_r = (self.rows() - 1) as f64;
        if !(0.0..=max_c).contains(&fc) || !(0.0..=max_r).contains(&fr) {
            return None;
        }
        let c0 = (fc.floor() as usize).min(self.cols().saturating_sub(2));
        let r0 = (fr.floor() as usize).min(self.rows().saturating_sub(2));
        let tc = fc - c0 as f64;
        let tr = fr - r0 as f64;
        let c1 = (c0 + 1).min(self.cols() - 1);
        let r1 = (r0 + 1).min(self.rows() - 1);
        let top = self.get(r0, c0) * (1.0 - tc) + self.get(r0, c1) * tc;
        let bottom = self.get(r1, c0) * (1.0 - tc) + self.get(r1, c1) * tc;
        Some(top * (1.0 - tr) + bottom * tr)
    }
}

// ---------------------------------------------------------------------------
// SurveyPoint – one depth sounding
// ---------------------------------------------------------------------------

/// A scattered depth measurement.  Also the CSV/JSON row format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ---------------------------------------------------------------------------
// Spectral signatures
// ---------------------------------------------------------------------------

/// A named sensor band.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: &'static str,
    pub wavelength_nm: f64,
}

/// Whether a signature comes from living matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureKind {
    Reference,
    Biological,
    NonBiological,
}

/// How a signature is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
}

/// Reflectance per band for one surface type.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub label: &'static str,
    pub kind: SignatureKind,
    pub reflectance: Vec<f64>,
    pub rgb: (u8, u8, u8),
    pub dashed: bool,
    pub marker: Marker,
    pub line_width: u32,
    pub alpha: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn axis_is_inclusive_linspace() {
        let a = Axis::new(-1.0, 1.0, 100);
        assert_eq!(a.at(0), -1.0);
        assert_eq!(a.at(99), 1.0);
        assert_relative_eq!(a.step(), 2.0 / 99.0);
        assert_relative_eq!(a.fractional_index(1.0), 99.0);
    }

    #[test]
    fn grid_is_row_major_in_y() {
        let g = Grid2::from_fn(Axis::new(0.0, 2.0, 3), Axis::new(0.0, 1.0, 2), |x, y| {
            x + 10.0 * y
        });
        assert_eq!(g.get(0, 2), 2.0);
        assert_eq!(g.get(1, 0), 10.0);
    }

    #[test]
    fn nansum_and_range_skip_nan() {
        let g = Grid2 {
            x: Axis::new(0.0, 1.0, 2),
            y: Axis::new(0.0, 1.0, 2),
            values: vec![1.0, f64::NAN, -3.0, 2.0],
        };
        assert_eq!(g.nansum(), 0.0);
        assert_eq!(g.finite_count(), 3);
        assert_eq!(g.finite_range(), Some((-3.0, 2.0)));
    }

    #[test]
    fn bilinear_sample_reproduces_plane() {
        let g = Grid2::from_fn(Axis::new(0.0, 10.0, 11), Axis::new(0.0, 10.0, 11), |x, y| {
            2.0 * x - y
        });
        assert_relative_eq!(g.sample(3.25, 7.5).unwrap(), 6.5 - 7.5);
        assert_relative_eq!(g.sample(10.0, 10.0).unwrap(), 10.0);
        assert!(g.sample(10.5, 0.0).is_none());
    }
}
