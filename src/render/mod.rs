//! Chart rendering: one module per figure plus shared drawing helpers.
//!
//! Every figure is drawn into an in-memory RGB buffer and written as PNG, so
//! the same code path serves the CLI and the tests.

pub mod geometry;
pub mod groundwater;
pub mod mass_balance;
pub mod spectral;

use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::Colormap;
use crate::data::model::Grid2;

pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
pub type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

pub const FONT: &str = "sans-serif";
/// Tick and description size on colour bars.
const COLORBAR_FONT_SIZE: f64 = 14.0;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Draw a figure of `size` pixels with `draw` and save it as PNG at `path`,
/// creating parent directories as needed.
pub fn render_png<F>(path: &Path, size: (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&Canvas<'_>) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let (w, h) = size;
    let mut buffer = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }

    let image = image::RgbImage::from_raw(w, h, buffer).context("chart buffer size mismatch")?;
    image
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    log::debug!("rendered {}x{} chart to {}", w, h, path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Centred label text.
pub fn label_style(size: f64, color: RGBColor, bold: bool) -> TextStyle<'static> {
    let font = (FONT, size).into_font();
    let font = if bold { font.style(FontStyle::Bold) } else { font };
    font.color(&color).pos(Pos::new(HPos::Center, VPos::Center))
}

/// Draw centred text lines stacked around `at`, `line_height` data units apart.
pub fn centered_lines(
    chart: &mut Chart<'_, '_>,
    lines: &[&str],
    at: (f64, f64),
    line_height: f64,
    style: &TextStyle<'static>,
) -> Result<()> {
    let top = at.1 + line_height * (lines.len() as f64 - 1.0) / 2.0;
    chart.draw_series(lines.iter().enumerate().map(|(i, line)| {
        Text::new(line.to_string(), (at.0, top - i as f64 * line_height), style.clone())
    }))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Rasters
// ---------------------------------------------------------------------------

/// Paint every finite cell of `grid` as a rectangle centred on its node.
pub fn draw_heatmap(
    chart: &mut Chart<'_, '_>,
    grid: &Grid2,
    cmap: &Colormap,
    range: (f64, f64),
    alpha: f64,
) -> Result<()> {
    let (hx, hy) = (grid.x.step() / 2.0, grid.y.step() / 2.0);
    let cells = (0..grid.rows()).flat_map(|r| (0..grid.cols()).map(move |c| (r, c)));
    chart.draw_series(cells.filter_map(|(r, c)| {
        let color = cmap.color_for(grid.get(r, c), range.0, range.1)?;
        let (x, y) = (grid.x.at(c), grid.y.at(r));
        Some(Rectangle::new(
            [(x - hx, y - hy), (x + hx, y + hy)],
            color.mix(alpha).filled(),
        ))
    }))?;
    Ok(())
}

/// Vertical colour bar for `range` with a description along its axis.
pub fn draw_colorbar(
    area: &Canvas<'_>,
    cmap: &Colormap,
    range: (f64, f64),
    label: &str,
) -> Result<()> {
    const STRIPES: usize = 128;
    let (lo, hi) = range;
    let mut bar = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(label)
        .y_label_style((FONT, COLORBAR_FONT_SIZE))
        .axis_desc_style((FONT, COLORBAR_FONT_SIZE))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;

    let span = hi - lo;
    bar.draw_series((0..STRIPES).map(|i| {
        let t0 = i as f64 / STRIPES as f64;
        let t1 = (i + 1) as f64 / STRIPES as f64;
        let color = cmap.at((t0 + t1) / 2.0);
        Rectangle::new([(0.0, lo + t0 * span), (1.0, lo + t1 * span)], color.filled())
    }))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// Diagonal hatch lines inside the axis-aligned box `[x0, x1] × [y0, y1]`.
pub fn hatch_segments(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    spacing: f64,
) -> Vec<[(f64, f64); 2]> {
    let mut segments = Vec::new();
    if spacing <= 0.0 || x1 <= x0 || y1 <= y0 {
        return segments;
    }
    // Lines y = x + c, c sweeping so the whole box is covered.
    let mut c = y0 - x1 + spacing;
    while c < y1 - x0 {
        let start_x = x0.max(y0 - c);
        let end_x = x1.min(y1 - c);
        if end_x > start_x {
            segments.push([(start_x, start_x + c), (end_x, end_x + c)]);
        }
        c += spacing;
    }
    segments
}

/// Vertices of an upward-pointing equilateral triangle.
pub fn triangle(center: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    [90.0f64, 210.0, 330.0]
        .iter()
        .map(|deg| {
            let a = deg.to_radians();
            (center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
        .collect()
}

/// Outline of the box `[x0, x1] × [y0, y1]` as a closed path.
pub fn box_outline((x0, y0): (f64, f64), (x1, y1): (f64, f64)) -> Vec<(f64, f64)> {
    vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]
}
