//! Area label placement
//!
//! A label sits on the polygon centroid (plus the layer's planar offset) and
//! is only drawn when the polygon is large enough on the page to hold it.
//! There is no collision avoidance between labels.

use geo::Polygon;
use mapsketch_core::measure::polygon_centroid;
use mapsketch_core::Rgb;
use serde::{Deserialize, Serialize};

use crate::projection::Projection;
use crate::surface::{CanvasPoint, CanvasRect, Paint, Stroke, Surface, TextStyle};

/// Text extent estimation, so real font metrics can be plugged in
pub trait TextMeasure {
    fn width(&self, text: &str, size: f64) -> f64;
    fn height(&self, size: f64) -> f64;
}

/// Character-count estimate: `chars * size * width_factor` by `size * height_factor`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatedMetrics {
    pub width_factor: f64,
    pub height_factor: f64,
}

impl Default for EstimatedMetrics {
    fn default() -> Self {
        Self { width_factor: 0.55, height_factor: 1.2 }
    }
}

impl TextMeasure for EstimatedMetrics {
    fn width(&self, text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * self.width_factor
    }

    fn height(&self, size: f64) -> f64 {
        size * self.height_factor
    }
}

/// Thresholds for placing a label inside a polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRules {
    /// Polygons whose projected bbox is narrower than this get no label
    pub min_polygon_px: f64,
    /// Largest share of the polygon's width or height the text may take
    pub max_fill_ratio: f64,
    pub padding: f64,
    pub background_opacity: f64,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            min_polygon_px: 20.0,
            max_fill_ratio: 0.9,
            padding: 2.0,
            background_opacity: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    EmptyText,
    /// Font size that is not a positive finite number
    InvalidSize { size: f64 },
    NoCentroid,
    PolygonTooSmall { shorter_side: f64 },
    Overflow { text_width: f64, text_height: f64, polygon: CanvasRect },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Placed {
        anchor: CanvasPoint,
        /// Background box, padding included
        frame: CanvasRect,
        /// Left end of the text baseline
        baseline: CanvasPoint,
    },
    Skipped(SkipReason),
}

/// Decide where, or whether, a label goes. Pure; draws nothing.
pub fn place_label(
    polygon: &Polygon<f64>,
    projection: &Projection,
    text: &str,
    size: f64,
    offset: [f64; 2],
    measure: &dyn TextMeasure,
    rules: &LabelRules,
) -> Placement {
    if text.trim().is_empty() {
        return Placement::Skipped(SkipReason::EmptyText);
    }
    if !(size.is_finite() && size > 0.0) {
        return Placement::Skipped(SkipReason::InvalidSize { size });
    }
    let centroid = match polygon_centroid(polygon) {
        Some(c) if c.x().is_finite() && c.y().is_finite() => c,
        _ => return Placement::Skipped(SkipReason::NoCentroid),
    };
    let bbox = match CanvasRect::enclosing(projection.project_ring(polygon.exterior().0.iter())) {
        Some(r) => r,
        None => return Placement::Skipped(SkipReason::NoCentroid),
    };
    if bbox.shorter_side() < rules.min_polygon_px {
        return Placement::Skipped(SkipReason::PolygonTooSmall { shorter_side: bbox.shorter_side() });
    }

    let text_width = measure.width(text, size);
    let text_height = measure.height(size);
    if text_width > bbox.width * rules.max_fill_ratio || text_height > bbox.height * rules.max_fill_ratio {
        return Placement::Skipped(SkipReason::Overflow { text_width, text_height, polygon: bbox });
    }

    let anchor = projection.project(centroid.x() + offset[0], centroid.y() + offset[1]);
    let text_box = CanvasRect::new(
        anchor.x - text_width / 2.0,
        anchor.y - text_height / 2.0,
        text_width,
        text_height,
    );
    // Baseline sits a little above the box bottom so the glyphs look centered
    let baseline = CanvasPoint::new(text_box.x, text_box.y + (text_height - size) / 2.0 + size * 0.22);
    Placement::Placed {
        anchor,
        frame: text_box.inflate(rules.padding),
        baseline,
    }
}

/// Draw a placed label: translucent white box, thin border, then the text
pub fn draw_label<S: Surface + ?Sized>(
    surface: &mut S,
    placement: &Placement,
    text: &str,
    style: TextStyle,
    rules: &LabelRules,
) {
    if let Placement::Placed { frame, baseline, .. } = placement {
        surface.fill_rect(*frame, Paint::with_opacity(Rgb::WHITE, rules.background_opacity));
        surface.stroke_rect(*frame, Stroke::new(style.color, 0.5));
        surface.text(*baseline, text, style);
    }
}

/// Hectare readout used for area labels and legend rows
pub fn format_hectares(ha: f64) -> String {
    format!("{:.2} ha", ha)
}
