use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use survey_lens::data::metrics::ThreatLevel;
use survey_lens::data::segment::Segment;

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
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.45);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: chart label → Color32
// ---------------------------------------------------------------------------

/// Maps chart labels (brands, segments, answers) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map with one palette entry per label, in order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let palette = generate_palette(labels.len());
        let mapping = labels.into_iter().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

/// Fixed traffic-light colours for segments.
pub fn segment_color(segment: Segment) -> Color32 {
    match segment {
        Segment::Champions => Color32::from_rgb(0x22, 0x8B, 0x22),
        Segment::AtRisk => Color32::from_rgb(0xB2, 0x22, 0x22),
        Segment::NewUsers => Color32::from_rgb(0x20, 0x52, 0x95),
        Segment::Prospects => Color32::from_rgb(0xFF, 0x8C, 0x00),
        Segment::Others => Color32::GRAY,
    }
}

pub fn threat_color(level: ThreatLevel) -> Color32 {
    match level {
        ThreatLevel::High => Color32::from_rgb(0xB2, 0x22, 0x22),
        ThreatLevel::Medium => Color32::from_rgb(0xFF, 0x8C, 0x00),
        ThreatLevel::Low => Color32::from_rgb(0x32, 0xCD, 0x32),
    }
}

/// Green / amber / red for a 0–100 score.
pub fn score_color(score: f64, good: f64, fair: f64) -> Color32 {
    if score >= good {
        Color32::from_rgb(0x22, 0x8B, 0x22)
    } else if score >= fair {
        Color32::from_rgb(0xFF, 0x8C, 0x00)
    } else {
        Color32::from_rgb(0xB2, 0x22, 0x22)
    }
}
