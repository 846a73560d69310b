use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Layer colours
// ---------------------------------------------------------------------------

pub const RAW: Color32 = Color32::from_rgb(150, 150, 150);
pub const PROCESSED: Color32 = Color32::from_rgb(40, 90, 220);
pub const BASELINE: Color32 = Color32::from_rgb(230, 140, 30);
pub const FIT: Color32 = Color32::from_rgb(210, 40, 60);

// ---------------------------------------------------------------------------
// Peak marker palette
// ---------------------------------------------------------------------------

/// `n` distinct marker colours with evenly spaced hues.
///
/// The hue walk starts at 120° so the first marker is never confused with
/// the red fit curve.
pub fn peak_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = 120.0 + (i as f32 / n as f32) * 300.0;
            let hsl = Hsl::new(hue, 0.70, 0.45);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_one_colour_per_peak() {
        assert!(peak_palette(0).is_empty());
        let colours = peak_palette(6);
        assert_eq!(colours.len(), 6);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
