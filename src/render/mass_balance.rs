use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use crate::analysis::mass_balance::MassBalanceRun;

use super::{render_png, Canvas, Chart, FONT};

pub const SIZE: (u32, u32) = (1200, 1000);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);
const BAR_HALF_WIDTH: f64 = 0.4;

pub fn render(path: &Path, run: &MassBalanceRun) -> Result<()> {
    render_png(path, SIZE, |root| draw(root, run))
}

/// Title, axis descriptions and series labels of one panel.
#[derive(Debug, Clone, PartialEq)]
struct PanelText {
    title: &'static str,
    y_desc: &'static str,
    x_desc: Option<&'static str>,
    series: Vec<String>,
}

fn panel_texts(run: &MassBalanceRun) -> [PanelText; 3] {
    let s = &run.summary;
    let p = &run.params;
    [
        PanelText {
            title: "System Input & Losses",
            y_desc: "Volume Units",
            x_desc: None,
            series: vec![
                format!("Rainfall Input ({:.0})", s.rainfall_total),
                format!("Initial Losses/Infiltration ({:.0})", s.losses_total),
            ],
        },
        PanelText {
            title: "Lake Storage Dynamics (Buffer Effect)",
            y_desc: "Lake Volume Units",
            x_desc: None,
            series: vec![
                "Lake Storage (Vol)".to_string(),
                format!("Observed Rise ({:.0})", p.observed_rise),
            ],
        },
        PanelText {
            title: "Outlet Response (Lag & Attenuation)",
            y_desc: "Flow Units",
            x_desc: Some("Time (Hours)"),
            series: vec![
                "Outlet Rate".to_string(),
                "Cumulative Outlet".to_string(),
                format!("{}hr Lag Time", p.lag_hours),
            ],
        },
    ]
}

fn panel<'a, 'b>(
    area: &'a Canvas<'b>,
    text: &PanelText,
    hours: usize,
    y_max: f64,
) -> Result<Chart<'a, 'b>> {
    let mut chart = ChartBuilder::on(area)
        .caption(text.title, (FONT, 18.0))
        .margin(12)
        .x_label_area_size(if text.x_desc.is_some() { 45 } else { 30 })
        .y_label_area_size(65)
        .build_cartesian_2d(-0.5..hours as f64 - 0.5, 0.0..y_max.max(1.0))?;
    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(TRANSPARENT)
        .bold_line_style(BLACK.mix(0.15))
        .y_desc(text.y_desc);
    if let Some(desc) = text.x_desc {
        mesh.x_desc(desc);
    }
    mesh.draw()?;
    Ok(chart)
}

fn legend<'a, 'b: 'a>(chart: &mut Chart<'a, 'b>) -> Result<()> {
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

fn draw(root: &Canvas<'_>, run: &MassBalanceRun) -> Result<()> {
    let steps = &run.steps;
    let s = &run.summary;
    let p = &run.params;
    let hours = steps.len();
    let areas = root.split_evenly((3, 1));
    let [input_text, lake_text, outlet_text] = panel_texts(run);

    // ---- Inputs and losses ----
    let rain_max = steps.iter().map(|st| st.rainfall).fold(0.0f64, f64::max);
    let mut input = panel(&areas[0], &input_text, hours, rain_max * 1.1)?;
    let bar = |hour: usize, lo: f64, hi: f64| {
        let h = hour as f64;
        [(h - BAR_HALF_WIDTH, lo), (h + BAR_HALF_WIDTH, hi)]
    };
    input
        .draw_series(
            steps
                .iter()
                .filter(|st| st.rainfall > 0.0)
                .map(|st| Rectangle::new(bar(st.hour, 0.0, st.rainfall), BLUE.mix(0.5).filled())),
        )?
        .label(input_text.series[0].as_str())
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 16, y + 5)], BLUE.mix(0.5).filled()));
    input
        .draw_series(steps.iter().filter(|st| st.losses > 0.0).map(|st| {
            Rectangle::new(
                bar(st.hour, st.effective, st.effective + st.losses),
                RED.mix(0.3).filled(),
            )
        }))?
        .label(input_text.series[1].as_str())
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 16, y + 5)], RED.mix(0.3).filled()));
    legend(&mut input)?;

    // ---- Lake storage ----
    let mut lake = panel(
        &areas[1],
        &lake_text,
        hours,
        s.peak_storage.max(p.observed_rise) * 1.15,
    )?;
    lake.draw_series(LineSeries::new(
        steps.iter().map(|st| (st.hour as f64, st.storage)),
        DARK_GREEN.stroke_width(2),
    ))?
    .label(lake_text.series[0].as_str())
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DARK_GREEN.stroke_width(2)));
    let reference = DARK_GREEN.mix(0.5).stroke_width(2);
    lake.draw_series(DashedLineSeries::new(
        vec![(-0.5, p.observed_rise), (hours as f64 - 0.5, p.observed_rise)],
        10,
        6,
        reference,
    ))?
    .label(lake_text.series[1].as_str())
    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], reference));
    legend(&mut lake)?;

    // ---- Outlet ----
    let cumulative_max = s.outflow_total;
    let mut outlet = panel(
        &areas[2],
        &outlet_text,
        hours,
        cumulative_max.max(s.peak_outflow) * 1.1,
    )?;
    outlet
        .draw_series(LineSeries::new(
            steps.iter().map(|st| (st.hour as f64, st.outflow)),
            BLUE.stroke_width(2),
        ))?
        .label(outlet_text.series[0].as_str())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    let cumulative_style = BLUE.stroke_width(2);
    outlet
        .draw_series(DashedLineSeries::new(
            steps
                .iter()
                .map(|st| (st.hour as f64, st.cumulative_outflow))
                .collect::<Vec<_>>(),
            8,
            5,
            cumulative_style,
        ))?
        .label(outlet_text.series[1].as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], cumulative_style));

    let lag = p.lag_hours as f64;
    if p.lag_hours < hours {
        let y_top = cumulative_max.max(s.peak_outflow) * 1.1;
        let lag_style = ORANGE.stroke_width(2);
        outlet
            .draw_series(DashedLineSeries::new(
                vec![(lag, 0.0), (lag, y_top.max(1.0))],
                8,
                5,
                lag_style,
            ))?
            .label(outlet_text.series[2].as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], lag_style));
        outlet.draw_series(std::iter::once(Text::new(
            "Lag due to routing/travel time",
            (lag + 0.5, cumulative_max / 2.0),
            (FONT, 14.0).into_font().color(&ORANGE),
        )))?;
    }
    legend(&mut outlet)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mass_balance::simulate;
    use crate::config::MassBalanceParams;

    #[test]
    fn panel_texts_for_default_run() {
        let run = simulate(&MassBalanceParams::default());
        let [input, lake, outlet] = panel_texts(&run);

        assert_eq!(input.y_desc, "Volume Units");
        assert_eq!(
            input.series,
            vec!["Rainfall Input (1000)", "Initial Losses/Infiltration (400)"]
        );
        assert_eq!(lake.y_desc, "Lake Volume Units");
        assert_eq!(lake.series, vec!["Lake Storage (Vol)", "Observed Rise (400)"]);
        assert_eq!(outlet.y_desc, "Flow Units");
        assert_eq!(outlet.x_desc, Some("Time (Hours)"));
        assert_eq!(
            outlet.series,
            vec!["Outlet Rate", "Cumulative Outlet", "12hr Lag Time"]
        );
    }

    #[test]
    fn renders_three_panel_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mass_balance_simulation.png");
        render(&path, &simulate(&MassBalanceParams::default())).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), SIZE);
    }
}
