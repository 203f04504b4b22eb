use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use crate::analysis::groundwater::{GroundwaterAnalysis, Streamline};
use crate::color::Colormap;
use crate::config::GroundwaterParams;

use super::{
    centered_lines, draw_colorbar, draw_heatmap, label_style, render_png, triangle, Canvas, Chart,
    FONT,
};

pub const SIZE: (u32, u32) = (1000, 800);
const COLORBAR_WIDTH: u32 = 140;
const CRITICAL_RADIUS: f64 = 5.0;
const ARROW_PX: f64 = 7.0;

pub fn render(path: &Path, analysis: &GroundwaterAnalysis, params: &GroundwaterParams) -> Result<()> {
    render_png(path, SIZE, |root| draw(root, analysis, params))
}

fn draw(root: &Canvas<'_>, a: &GroundwaterAnalysis, params: &GroundwaterParams) -> Result<()> {
    let cmap = Colormap::rd_yl_gn_r();
    let range = (a.summary.field_min, a.summary.field_max);
    let (plot_area, bar_area) = root.split_horizontally(SIZE.0 - COLORBAR_WIDTH);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(
            "Spatial Interaction of Groundwater Consumption Sources",
            (FONT, 22.0),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..params.extent, 0.0..params.extent)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("X Coordinate (km)")
        .y_desc("Y Coordinate (km)")
        .draw()?;

    draw_heatmap(&mut chart, &a.field, &cmap, range, 0.8)?;
    draw_streamlines(&mut chart, &a.streamlines)?;

    let line_height = params.extent * 0.035;
    for src in &params.sources {
        let style = if src.recharge {
            label_style(16.0, BLUE, true)
        } else {
            label_style(16.0, WHITE, true)
        };
        let lines: Vec<&str> = if src.recharge {
            vec![src.name.as_str(), "(Recharge)"]
        } else {
            vec![src.name.as_str()]
        };
        centered_lines(&mut chart, &lines, (src.x, src.y), line_height, &style)?;
    }

    let (cx, cy) = params.critical_zone;
    let tri = triangle((cx, cy), CRITICAL_RADIUS);
    chart.draw_series(std::iter::once(Polygon::new(tri.clone(), RED.filled())))?;
    let mut outline = tri;
    if let Some(&first) = outline.first() {
        outline.push(first);
    }
    chart.draw_series(std::iter::once(PathElement::new(outline, WHITE.stroke_width(2))))?;
    centered_lines(
        &mut chart,
        &["Critical Zone"],
        (cx, cy - 8.0),
        line_height,
        &label_style(15.0, RED, true),
    )?;

    draw_colorbar(
        &bar_area,
        &cmap,
        range,
        "Groundwater Stress / Consumption Intensity",
    )?;
    Ok(())
}

/// Black flow lines with an arrow head halfway along each.
fn draw_streamlines(chart: &mut Chart<'_, '_>, lines: &[Streamline]) -> Result<()> {
    chart.draw_series(
        lines
            .iter()
            .map(|l| PathElement::new(l.points.clone(), BLACK.stroke_width(1))),
    )?;

    let mut heads = Vec::with_capacity(lines.len());
    for line in lines {
        let Some((at, next)) = midpoint_segment(line) else {
            continue;
        };
        let p0 = chart.backend_coord(&at);
        let p1 = chart.backend_coord(&next);
        let (dx, dy) = ((p1.0 - p0.0) as f64, (p1.1 - p0.1) as f64);
        let len = (dx * dx + dy * dy).sqrt();
        if len < f64::EPSILON {
            continue;
        }
        let (ux, uy) = (dx / len, dy / len);
        let px = |along: f64, across: f64| {
            (
                (along * ux - across * uy).round() as i32,
                (along * uy + across * ux).round() as i32,
            )
        };
        let head = vec![
            px(ARROW_PX, 0.0),
            px(-ARROW_PX * 0.6, ARROW_PX * 0.6),
            px(-ARROW_PX * 0.6, -ARROW_PX * 0.6),
        ];
        heads.push((at, head));
    }
    chart.draw_series(
        heads
            .into_iter()
            .map(|(at, head)| EmptyElement::at(at) + Polygon::new(head, BLACK.filled())),
    )?;
    Ok(())
}

/// The segment that contains the half-length point of the line.
fn midpoint_segment(line: &Streamline) -> Option<((f64, f64), (f64, f64))> {
    let half = line.length() / 2.0;
    let mut walked = 0.0;
    for w in line.points.windows(2) {
        let seg = ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt();
        if walked + seg >= half && seg > 0.0 {
            return Some((w[0], w[1]));
        }
        walked += seg;
    }
    None
}
