use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::region::Region;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Soft colours for the spend pie chart.
pub fn pastel(n: usize) -> Vec<Color32> {
    generate_palette(n, 0.6, 0.8)
}

/// Saturated colours for the customer pie chart.
pub fn vivid(n: usize) -> Vec<Color32> {
    generate_palette(n, 0.75, 0.55)
}

// ---------------------------------------------------------------------------
// Color mapping: region → Color32
// ---------------------------------------------------------------------------

/// Maps every region of the loaded table to a stable colour, so the same
/// region keeps its colour across the scatter plot and the filter panel.
#[derive(Debug, Clone)]
pub struct RegionColors {
    mapping: BTreeMap<Region, Color32>,
    default_color: Color32,
}

impl RegionColors {
    pub fn new(regions: &BTreeSet<Region>) -> Self {
        let palette = vivid(regions.len());
        let mapping = regions.iter().copied().zip(palette).collect();
        RegionColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a region. Regions unknown to the map are grey.
    pub fn color_for(&self, region: Region) -> Color32 {
        self.mapping
            .get(&region)
            .copied()
            .unwrap_or(self.default_color)
    }
}
