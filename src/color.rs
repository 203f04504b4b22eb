use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Continuous colour maps: scalar value → RGBColor
// ---------------------------------------------------------------------------

/// A piecewise-linear colour map.  Stops are interpolated in linear light.
#[derive(Debug, Clone)]
pub struct Colormap {
    pub name: &'static str,
    stops: Vec<(f32, LinSrgb)>,
}

fn hex(rgb: u32) -> LinSrgb {
    let c: Srgb<u8> = Srgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
    c.into_format::<f32>().into_linear()
}

fn unit(r: f32, g: f32, b: f32) -> LinSrgb {
    Srgb::new(r, g, b).into_linear()
}

impl Colormap {
    fn new(name: &'static str, stops: Vec<(f32, LinSrgb)>) -> Self {
        Colormap { name, stops }
    }

    /// Same colours, reversed direction.
    pub fn reversed(mut self, name: &'static str) -> Self {
        self.stops = self
            .stops
            .into_iter()
            .rev()
            .map(|(t, c)| (1.0 - t, c))
            .collect();
        self.name = name;
        self
    }

    /// Blue water through green lowland and brown hills to white peaks.
    pub fn terrain() -> Self {
        Colormap::new(
            "terrain",
            vec![
                (0.00, unit(0.2, 0.2, 0.6)),
                (0.15, unit(0.0, 0.6, 1.0)),
                (0.25, unit(0.0, 0.8, 0.4)),
                (0.50, unit(1.0, 1.0, 0.6)),
                (0.75, unit(0.5, 0.36, 0.33)),
                (1.00, unit(1.0, 1.0, 1.0)),
            ],
        )
    }

    /// Reversed terrain: low values pale, high values blue.
    pub fn terrain_r() -> Self {
        Self::terrain().reversed("terrain_r")
    }

    /// Diverging red – yellow – green.
    pub fn rd_yl_gn() -> Self {
        let hexes = [
            0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a,
            0x66bd63, 0x1a9850, 0x006837,
        ];
        let last = (hexes.len() - 1) as f32;
        Colormap::new(
            "RdYlGn",
            hexes
                .iter()
                .enumerate()
                .map(|(i, &h)| (i as f32 / last, hex(h)))
                .collect(),
        )
    }

    /// Green for low stress, red for high.
    pub fn rd_yl_gn_r() -> Self {
        Self::rd_yl_gn().reversed("RdYlGn_r")
    }

    /// Colour at position `t` in `[0, 1]` (clamped).
    pub fn at(&self, t: f64) -> RGBColor {
        let t = (t as f32).clamp(0.0, 1.0);
        let upper = self
            .stops
            .iter()
            .position(|(s, _)| *s >= t)
            .unwrap_or(self.stops.len() - 1);
        let color = if upper == 0 {
            self.stops[0].1
        } else {
            let (t0, c0) = self.stops[upper - 1];
            let (t1, c1) = self.stops[upper];
            let span = t1 - t0;
            let f = if span > 0.0 { (t - t0) / span } else { 0.0 };
            c0.mix(c1, f)
        };
        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(color).into_format();
        RGBColor(rgb.red, rgb.green, rgb.blue)
    }

    /// Colour for `value` on the scale `[lo, hi]`; `None` for non-finite values.
    pub fn color_for(&self, value: f64, lo: f64, hi: f64) -> Option<RGBColor> {
        if !value.is_finite() {
            return None;
        }
        let span = hi - lo;
        let t = if span.abs() < f64::EPSILON {
            0.5
        } else {
            (value - lo) / span
        };
        Some(self.at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_stops() {
        let cm = Colormap::rd_yl_gn();
        assert_eq!(cm.at(0.0), RGBColor(0xa5, 0x00, 0x26));
        assert_eq!(cm.at(1.0), RGBColor(0x00, 0x68, 0x37));
    }

    #[test]
    fn reversed_swaps_ends() {
        let cm = Colormap::rd_yl_gn_r();
        assert_eq!(cm.at(0.0), RGBColor(0x00, 0x68, 0x37));
        assert_eq!(cm.at(1.0), RGBColor(0xa5, 0x00, 0x26));
        assert_eq!(cm.name, "RdYlGn_r");
    }

    #[test]
    fn out_of_range_is_clamped() {
        let cm = Colormap::terrain_r();
        assert_eq!(cm.at(-3.0), cm.at(0.0));
        assert_eq!(cm.at(7.0), cm.at(1.0));
        assert_eq!(cm.at(0.0), RGBColor(255, 255, 255));
    }

    #[test]
    fn nan_has_no_colour() {
        let cm = Colormap::terrain_r();
        assert!(cm.color_for(f64::NAN, 0.0, 1.0).is_none());
        assert!(cm.color_for(0.3, 0.0, 1.0).is_some());
        // degenerate scale falls back to the middle
        assert_eq!(cm.color_for(5.0, 2.0, 2.0), Some(cm.at(0.5)));
    }

    #[test]
    fn midpoint_is_between_neighbours() {
        let cm = Colormap::rd_yl_gn();
        let RGBColor(r, g, _) = cm.at(0.45);
        // between #fee08b and #ffffbf
        assert!(r >= 0xfe);
        assert!((0xe0..=0xff).contains(&g));
    }
}
