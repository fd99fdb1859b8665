use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Diverging colour for a correlation in `-1.0..=1.0`: blue through a
/// neutral grey to orange. NaN maps to dark grey.
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::DARK_GRAY;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let neutral = Hsl::new(0.0, 0.0, 0.25);
    let end = if t < 0.0 {
        Hsl::new(210.0, 0.8, 0.55)
    } else {
        Hsl::new(30.0, 0.85, 0.55)
    };
    let mixed = neutral.mix(end, t.abs());
    to_color32(mixed.into_color())
}

// ---------------------------------------------------------------------------
// Color mapping: cell value → Color32
// ---------------------------------------------------------------------------

/// Maps unique values of a chosen column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its unique values.
    pub fn new(column: &str, unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<CellValue, Color32> = unique_values
            .iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(10);
        let unique: BTreeSet<[u8; 4]> = colours.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 10);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_values_use_default() {
        let values = BTreeSet::from([CellValue::String("SZA".into())]);
        let map = ColorMap::new("artist", &values);
        assert_ne!(map.color_for(&CellValue::String("SZA".into())), Color32::GRAY);
        assert_eq!(map.color_for(&CellValue::Null), Color32::GRAY);
    }

    #[test]
    fn diverging_ends_differ() {
        assert_ne!(diverging(-1.0), diverging(1.0));
        assert_eq!(diverging(f64::NAN), Color32::DARK_GRAY);
    }
}
