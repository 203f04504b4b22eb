//! Groundwater stress field: gradient and flow lines.

use serde::Serialize;

use crate::config::GroundwaterParams;
use crate::data::model::Grid2;
use crate::data::synthetic::{source_contribution, stress_field};

/// Integration step in grid cells.
const STEP: f64 = 0.5;
/// Seed lattice side for `density = 1.0`.
const BASE_MASK: f64 = 30.0;
/// Trajectories shorter than this fraction of the domain side are dropped.
const MIN_LENGTH: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct GroundwaterAnalysis {
    pub field: Grid2,
    /// Derivative along columns (x), unit index spacing.
    pub dx: Grid2,
    /// Derivative along rows (y), unit index spacing.
    pub dy: Grid2,
    pub streamlines: Vec<Streamline>,
    pub summary: GroundwaterSummary,
}

/// A traced flow line in data coordinates, upstream first.
#[derive(Debug, Clone, PartialEq)]
pub struct Streamline {
    pub points: Vec<(f64, f64)>,
}

impl Streamline {
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReading {
    pub name: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundwaterSummary {
    pub field_min: f64,
    pub field_max: f64,
    pub critical_zone: (f64, f64),
    pub critical_stress: Option<f64>,
    /// Gradient at the critical zone as `(dx, dy)` per grid cell.
    pub critical_gradient: Option<(f64, f64)>,
    /// Share of the stress at the critical zone coming from each source.
    pub critical_sources: Vec<SourceReading>,
    pub streamline_count: usize,
}

/// First differences with unit spacing: central in the interior, one-sided
/// at the edges.  Returns `(d/d_row, d/d_col)`.
pub fn gradient(field: &Grid2) -> (Grid2, Grid2) {
    let (rows, cols) = (field.rows(), field.cols());
    let diff = |lo: f64, hi: f64, span: usize| (hi - lo) / span as f64;

    let mut d_row = Vec::with_capacity(rows * cols);
    let mut d_col = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let (r0, r1) = (r.saturating_sub(1), (r + 1).min(rows - 1));
            let (c0, c1) = (c.saturating_sub(1), (c + 1).min(cols - 1));
            d_row.push(if r1 > r0 {
                diff(field.get(r0, c), field.get(r1, c), r1 - r0)
            } else {
                0.0
            });
            d_col.push(if c1 > c0 {
                diff(field.get(r, c0), field.get(r, c1), c1 - c0)
            } else {
                0.0
            });
        }
    }
    let wrap = |values| Grid2 {
        x: field.x.clone(),
        y: field.y.clone(),
        values,
    };
    (wrap(d_row), wrap(d_col))
}

// ---------------------------------------------------------------------------
// Streamlines
// ---------------------------------------------------------------------------

/// Coarse occupancy grid keeping flow lines apart.
struct Occupancy {
    side: usize,
    cells: Vec<Option<usize>>,
}

impl Occupancy {
    fn new(side: usize) -> Self {
        Occupancy {
            side,
            cells: vec![None; side * side],
        }
    }

    /// Mask cell containing fractional grid position `(fc, fr)`.
    fn cell_of(&self, fc: f64, fr: f64, grid_cols: usize, grid_rows: usize) -> usize {
        let to_cell = |f: f64, n: usize| {
            let t = if n > 1 { f / (n - 1) as f64 } else { 0.0 };
            ((t * self.side as f64) as usize).min(self.side - 1)
        };
        to_cell(fr, grid_rows) * self.side + to_cell(fc, grid_cols)
    }

    fn release(&mut self, owner: usize) {
        for cell in self.cells.iter_mut() {
            if *cell == Some(owner) {
                *cell = None;
            }
        }
    }
}

/// Unit direction of the gradient at fractional grid position, `None` where
/// the flow vanishes or the position is off-grid.
fn direction(dx: &Grid2, dy: &Grid2, fc: f64, fr: f64, sign: f64) -> Option<(f64, f64)> {
    let x = dx.x.start + fc * dx.x.step();
    let y = dx.y.start + fr * dx.y.step();
    let u = dx.sample(x, y)?;
    let v = dy.sample(x, y)?;
    let speed = (u * u + v * v).sqrt();
    if speed < 1e-12 {
        None
    } else {
        Some((sign * u / speed, sign * v / speed))
    }
}

/// Trace one direction from `(fc, fr)` with midpoint steps, claiming mask
/// cells for `owner` as it goes.
fn trace(
    dx: &Grid2,
    dy: &Grid2,
    start: (f64, f64),
    sign: f64,
    owner: usize,
    mask: &mut Occupancy,
) -> Vec<(f64, f64)> {
    let (cols, rows) = (dx.cols(), dx.rows());
    let max_steps = 4 * (cols + rows);
    let mut path = vec![start];
    let mut pos = start;
    let mut cell = mask.cell_of(pos.0, pos.1, cols, rows);

    for _ in 0..max_steps {
        let Some(k1) = direction(dx, dy, pos.0, pos.1, sign) else {
            break;
        };
        let mid = (pos.0 + 0.5 * STEP * k1.0, pos.1 + 0.5 * STEP * k1.1);
        let Some(k2) = direction(dx, dy, mid.0, mid.1, sign) else {
            break;
        };
        let next = (pos.0 + STEP * k2.0, pos.1 + STEP * k2.1);
        if next.0 < 0.0 || next.1 < 0.0 || next.0 > (cols - 1) as f64 || next.1 > (rows - 1) as f64 {
            break;
        }
        // Reversing onto itself means a sink or saddle.
        if k1.0 * k2.0 + k1.1 * k2.1 < 0.0 {
            break;
        }
        let next_cell = mask.cell_of(next.0, next.1, cols, rows);
        if next_cell != cell {
            match mask.cells[next_cell] {
                Some(other) if other != owner => break,
                _ => mask.cells[next_cell] = Some(owner),
            }
            cell = next_cell;
        }
        path.push(next);
        pos = next;
    }
    path
}

/// Flow lines following the gradient, evenly spread by an occupancy mask of
/// `30 · density` cells per side.
pub fn streamlines(dx: &Grid2, dy: &Grid2, density: f64) -> Vec<Streamline> {
    let (cols, rows) = (dx.cols(), dx.rows());
    if cols < 2 || rows < 2 {
        return Vec::new();
    }
    let side = ((BASE_MASK * density).round() as usize).max(1);
    let mut mask = Occupancy::new(side);
    let min_len = MIN_LENGTH * (cols - 1).max(rows - 1) as f64;
    let to_data = |(fc, fr): (f64, f64)| {
        (
            dx.x.start + fc * dx.x.step(),
            dx.y.start + fr * dx.y.step(),
        )
    };

    let mut lines = Vec::new();
    for seed in 0..side * side {
        if mask.cells[seed].is_some() {
            continue;
        }
        let (mr, mc) = (seed / side, seed % side);
        let start = (
            (mc as f64 + 0.5) / side as f64 * (cols - 1) as f64,
            (mr as f64 + 0.5) / side as f64 * (rows - 1) as f64,
        );
        let owner = lines.len();
        let start_cell = mask.cell_of(start.0, start.1, cols, rows);
        mask.cells[start_cell] = Some(owner);

        let mut backward = trace(dx, dy, start, -1.0, owner, &mut mask);
        let forward = trace(dx, dy, start, 1.0, owner, &mut mask);
        backward.reverse();
        backward.extend(forward.into_iter().skip(1));

        let line = Streamline {
            points: backward.iter().copied().map(to_data).collect(),
        };
        let grid_len = (backward.len().saturating_sub(1)) as f64 * STEP;
        if grid_len < min_len {
            mask.release(owner);
            continue;
        }
        lines.push(line);
    }
    log::debug!("traced {} streamlines on a {side}x{side} mask", lines.len());
    lines
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub fn analyse(params: &GroundwaterParams) -> GroundwaterAnalysis {
    let field = stress_field(params);
    let (dy, dx) = gradient(&field);
    let lines = streamlines(&dx, &dy, params.density);

    let (cx, cy) = params.critical_zone;
    let critical_stress = field.sample(cx, cy);
    let critical_gradient = dx.sample(cx, cy).zip(dy.sample(cx, cy));
    let critical_sources = params
        .sources
        .iter()
        .map(|s| SourceReading {
            name: s.name.clone(),
            contribution: source_contribution(s, cx, cy),
        })
        .collect();
    let (field_min, field_max) = field.finite_range().unwrap_or((0.0, 0.0));

    let summary = GroundwaterSummary {
        field_min,
        field_max,
        critical_zone: params.critical_zone,
        critical_stress,
        critical_gradient,
        critical_sources,
        streamline_count: lines.len(),
    };
    log::info!(
        "groundwater: field range [{field_min:.3}, {field_max:.3}], critical zone stress {:?}, {} streamlines",
        summary.critical_stress,
        summary.streamline_count
    );

    GroundwaterAnalysis {
        field,
        dx,
        dy,
        streamlines: lines,
        summary,
    }
}
