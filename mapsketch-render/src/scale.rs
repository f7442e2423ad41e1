//! Map scale readout and north arrow

use mapsketch_core::measure::great_circle_distance_m;
use mapsketch_core::Rgb;

use crate::projection::Projection;
use crate::rasterize::{fill_ring, stroke_path};
use crate::surface::{CanvasPoint, Paint, Stroke, Surface, TextStyle};

/// Millimetres per PostScript point
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Unrounded scale denominator: ground distance across the canvas at its
/// center latitude over the canvas's printed width.
pub fn scale_ratio(projection: &Projection) -> Option<f64> {
    let canvas = projection.canvas();
    let mid_y = canvas.center().y;
    let west = projection.unproject(CanvasPoint::new(canvas.x, mid_y));
    let east = projection.unproject(CanvasPoint::new(canvas.right(), mid_y));
    let ground_m = great_circle_distance_m(west, east);
    let paper_mm = canvas.width * MM_PER_PT;
    let ratio = ground_m * 1000.0 / paper_mm;
    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

/// Round a scale denominator for display.
///
/// Below 1000 the ratio rounds half-up to the nearest 100, otherwise to the
/// nearest 1000. The branch is taken once on the raw value, and the result
/// is never below 100.
pub fn round_scale(raw: f64) -> u64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 100;
    }
    let step = if raw < 1000.0 { 100.0 } else { 1000.0 };
    let rounded = (raw / step + 0.5).floor() * step;
    (rounded as u64).max(100)
}

/// `12345` -> `"12,345"`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn scale_label(denominator: u64) -> String {
    format!("SCALE 1:{}", group_thousands(denominator))
}

/// North arrow centered on `center`: left half filled, right half outlined,
/// with an "N" above the tip.
pub fn draw_compass<S: Surface + ?Sized>(surface: &mut S, center: CanvasPoint, size: f64) {
    let half = size / 2.0;
    let tip = CanvasPoint::new(center.x, center.y + half);
    let base = CanvasPoint::new(center.x, center.y - half * 0.4);
    let left = CanvasPoint::new(center.x - half * 0.45, center.y - half);
    let right = CanvasPoint::new(center.x + half * 0.45, center.y - half);
    let ink = Stroke::new(Rgb::BLACK, 0.75);

    fill_ring(surface, &[tip, left, base], Paint::solid(Rgb::BLACK));
    stroke_path(surface, &[tip, left, base, right], true, ink, &[]);

    let glyph = size * 0.45;
    surface.text(
        CanvasPoint::new(center.x - glyph * 0.36, tip.y + 3.0),
        "N",
        TextStyle::bold(glyph, Rgb::BLACK),
    );
}
