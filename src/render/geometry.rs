use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use crate::analysis::geometry::GeometryAnalysis;
use crate::color::Colormap;

use super::{
    box_outline, centered_lines, draw_colorbar, draw_heatmap, hatch_segments, label_style,
    render_png, Canvas, Chart, FONT,
};

pub const SIZE: (u32, u32) = (1800, 500);
const COLORBAR_WIDTH: u32 = 120;
const CAPTION_SIZE: f64 = 15.0;

/// Three panels: truth, sparse survey, reconstruction.
pub fn render(path: &Path, analysis: &GeometryAnalysis, obstruction: (f64, f64)) -> Result<()> {
    render_png(path, SIZE, |root| draw(root, analysis, obstruction))
}

fn panel<'a, 'b>(area: &'a Canvas<'b>, title: String) -> Result<Chart<'a, 'b>> {
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, CAPTION_SIZE))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(-1.0..1.0, -1.0..1.0)?;
    chart.configure_mesh().disable_mesh().draw()?;
    Ok(chart)
}

fn draw(root: &Canvas<'_>, a: &GeometryAnalysis, obstruction: (f64, f64)) -> Result<()> {
    let cmap = Colormap::terrain_r();
    let s = &a.summary;
    let panels = root.split_evenly((1, 3));
    let zone_lo = obstruction;
    let zone_hi = (1.0, 1.0);

    // ---- Ground truth ----
    let truth_range = a.truth.finite_range().unwrap_or((-1.0, 0.0));
    let mut truth = panel(
        &panels[0],
        format!("Ground Truth | Volume: {:.2} units", s.volume_true.abs()),
    )?;
    draw_heatmap(&mut truth, &a.truth, &cmap, truth_range, 1.0)?;
    truth
        .draw_series(hatch_segments(zone_lo, zone_hi, 0.08).into_iter().map(|seg| {
            PathElement::new(seg.to_vec(), RED.stroke_width(1))
        }))?
        .label("Unmeasured Zone")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    truth.draw_series(std::iter::once(PathElement::new(
        box_outline(zone_lo, zone_hi),
        RED.stroke_width(2),
    )))?;

    // ---- Survey ----
    let mut survey = panel(
        &panels[1],
        format!(
            "Available Data ({} pts) | Avg Depth Estimate: {:.2}",
            s.survey_points,
            s.mean_depth.abs()
        ),
    )?;
    survey.draw_series(std::iter::once(Rectangle::new(
        [zone_lo, zone_hi],
        RGBColor(128, 128, 128).mix(0.3).filled(),
    )))?;
    let z_range = a
        .survey
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.z), hi.max(p.z))
        });
    survey.draw_series(a.survey.iter().filter_map(|p| {
        let fill = cmap.color_for(p.z, z_range.0, z_range.1)?;
        Some(
            EmptyElement::at((p.x, p.y))
                + Circle::new((0, 0), 6, fill.filled())
                + Circle::new((0, 0), 6, BLACK.stroke_width(1)),
        )
    }))?;
    centered_lines(
        &mut survey,
        &["OBSTRUCTION", "(Missing Data)"],
        ((zone_lo.0 + zone_hi.0) / 2.0, (zone_lo.1 + zone_hi.1) / 2.0),
        0.1,
        &label_style(14.0, RED, true),
    )?;

    // ---- Reconstruction ----
    let (plot_area, bar_area) = panels[2].split_horizontally(SIZE.0 / 3 - COLORBAR_WIDTH);
    let recon_range = (truth_range.0, 0.0);
    let mut recon = panel(
        &plot_area,
        format!(
            "Reconstruction (RBF) | Est. Vol: {:.2} (Error: {:.1}%)",
            s.volume_interpolated.abs(),
            s.interpolated_error_pct
        ),
    )?;
    draw_heatmap(&mut recon, &a.reconstruction, &cmap, recon_range, 1.0)?;
    recon
        .draw_series(
            a.survey
                .iter()
                .map(|p| Circle::new((p.x, p.y), 2, BLACK.mix(0.3).filled())),
        )?
        .label("Survey Pts")
        .legend(|(x, y)| Circle::new((x + 10, y), 2, BLACK.filled()));
    recon
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::LowerLeft)
        .draw()?;
    draw_colorbar(&bar_area, &cmap, recon_range, "Depth")?;

    truth
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::LowerLeft)
        .draw()?;
    Ok(())
}
