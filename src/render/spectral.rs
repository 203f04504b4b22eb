use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use crate::data::model::{Band, Marker, Signature};

use super::{label_style, render_png, Canvas, FONT};

pub const SIZE: (u32, u32) = (1000, 600);
const X_RANGE: (f64, f64) = (400.0, 900.0);
const NIR_SPAN: (f64, f64) = (750.0, 900.0);
const MARKER_SIZE: i32 = 5;
/// Every 50 nm, so each band centre gets a tick.
const X_TICKS: usize = 11;

pub fn render(path: &Path, bands: &[Band], library: &[Signature]) -> Result<()> {
    render_png(path, SIZE, |root| draw(root, bands, library))
}

/// Band name for a tick sitting on a band centre, blank elsewhere.
fn band_label(bands: &[Band], wavelength_nm: f64) -> String {
    bands
        .iter()
        .find(|b| (b.wavelength_nm - wavelength_nm).abs() < 1e-6)
        .map(|b| b.name.to_string())
        .unwrap_or_default()
}

fn draw(root: &Canvas<'_>, bands: &[Band], library: &[Signature]) -> Result<()> {
    let y_max = library
        .iter()
        .flat_map(|s| s.reflectance.iter().copied())
        .fold(0.0f64, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Spectral Signatures: Why the Satellite might be confused",
            (FONT, 22.0),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(X_RANGE.0..X_RANGE.1, 0.0..y_max)?;

    let band_name = |wl: &f64| band_label(bands, *wl);
    chart
        .configure_mesh()
        .x_desc("Wavelength (nm)")
        .y_desc("Reflectance")
        .x_labels(X_TICKS)
        .x_label_formatter(&band_name)
        .bold_line_style(BLACK.mix(0.12))
        .light_line_style(TRANSPARENT)
        .draw()?;

    // NIR shading and note
    chart.draw_series(std::iter::once(Rectangle::new(
        [(NIR_SPAN.0, 0.0), (NIR_SPAN.1, y_max)],
        RGBColor(128, 128, 128).mix(0.1).filled(),
    )))?;
    let note = label_style(14.0, BLACK, false);
    chart.draw_series(
        [("NIR Band", 0.215), ("Critical for Distinguishing", 0.185)]
            .into_iter()
            .map(|(text, y)| Text::new(text, (800.0, y), note.clone())),
    )?;

    for sig in library {
        let color = RGBColor(sig.rgb.0, sig.rgb.1, sig.rgb.2).mix(sig.alpha);
        let style = color.stroke_width(sig.line_width);
        let points: Vec<(f64, f64)> = bands
            .iter()
            .map(|b| b.wavelength_nm)
            .zip(sig.reflectance.iter().copied())
            .collect();

        let anno = if sig.dashed {
            chart.draw_series(DashedLineSeries::new(points.clone(), 10, 6, style))?
        } else {
            chart.draw_series(LineSeries::new(points.clone(), style))?
        };
        anno.label(sig.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));

        let fill = color.filled();
        match sig.marker {
            Marker::Circle => {
                chart.draw_series(
                    points.iter().map(|&p| Circle::new(p, MARKER_SIZE, fill)),
                )?;
            }
            Marker::Square => {
                chart.draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p)
                        + Rectangle::new(
                            [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)],
                            fill,
                        )
                }))?;
            }
            Marker::Triangle => {
                chart.draw_series(
                    points
                        .iter()
                        .map(|&p| TriangleMarker::new(p, MARKER_SIZE + 1, fill)),
                )?;
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{sensor_bands, signature_library};

    #[test]
    fn ticks_on_band_centres_carry_band_names() {
        let bands = sensor_bands();
        let labels: Vec<String> = (0..X_TICKS)
            .map(|i| band_label(&bands, X_RANGE.0 + 50.0 * i as f64))
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(labels, vec!["Blue", "Green", "Red", "NIR"]);
        assert_eq!(band_label(&bands, 500.0), "");
    }

    #[test]
    fn renders_signature_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectral_signature.png");
        render(&path, &sensor_bands(), &signature_library()).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), SIZE);
    }
}
