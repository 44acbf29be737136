use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used to give every charted column its own colour.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Colour of a status line.
pub fn status_color(kind: &crate::state::StatusMessage) -> Color32 {
    use crate::state::StatusMessage;
    match kind {
        StatusMessage::Success(_) => Color32::from_rgb(0x16, 0xa3, 0x4a),
        StatusMessage::Warning(_) => Color32::from_rgb(0xd9, 0x77, 0x06),
        StatusMessage::Error(_) => Color32::RED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_one_distinct_colour_per_series() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
