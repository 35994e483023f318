use image::Rgb;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Diverging colour map: correlation coefficient → RGB
// ---------------------------------------------------------------------------

/// Maps coefficients in [-1, 1] onto a blue / white / red scale.
#[derive(Debug, Clone)]
pub struct DivergingColorMap {
    negative_hue: f32,
    positive_hue: f32,
    saturation: f32,
    missing_color: Rgb<u8>,
}

impl Default for DivergingColorMap {
    fn default() -> Self {
        DivergingColorMap {
            negative_hue: 220.0,
            positive_hue: 5.0,
            saturation: 0.75,
            missing_color: Rgb([170, 170, 170]),
        }
    }
}

impl DivergingColorMap {
    /// Colour for one matrix entry. Missing entries are grey.
    pub fn color_for(&self, value: Option<f64>) -> Rgb<u8> {
        let Some(r) = value.filter(|r| r.is_finite()) else {
            return self.missing_color;
        };
        let r = r.clamp(-1.0, 1.0) as f32;
        let hue = if r < 0.0 {
            self.negative_hue
        } else {
            self.positive_hue
        };
        // Lightness fades to near-white at zero.
        let lightness = 0.97 - 0.5 * r.abs();
        hsl_to_rgb(Hsl::new(hue, self.saturation, lightness))
    }

    /// `steps` evenly spaced (value, colour) stops from +1 down to -1, for the
    /// legend bar.
    pub fn legend_entries(&self, steps: usize) -> Vec<(f64, Rgb<u8>)> {
        if steps < 2 {
            return vec![(1.0, self.color_for(Some(1.0)))];
        }
        (0..steps)
            .map(|i| {
                let v = 1.0 - 2.0 * i as f64 / (steps - 1) as f64;
                (v, self.color_for(Some(v)))
            })
            .collect()
    }
}

fn hsl_to_rgb(hsl: Hsl) -> Rgb<u8> {
    let rgb: Srgb = hsl.into_color();
    Rgb([
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}
