/*!
# Drawing Surfaces

Page-like drawing targets. All coordinates are page units (PostScript points)
with the origin at the bottom-left and y increasing upward. Surfaces that
store pixels or flip the axis (SVG, PNG) convert internally.
*/

use mapsketch_core::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::RenderResult;

mod png;
mod recording;
mod svg;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfSurface;
pub use png::PngSurface;
pub use recording::{DrawOp, RecordingSurface};
pub use svg::SvgSurface;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: CanvasPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle; `(x, y)` is the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest rectangle enclosing all points, `None` when empty
    pub fn enclosing<I: IntoIterator<Item = CanvasPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> CanvasPoint {
        CanvasPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn shorter_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn inflate(&self, by: f64) -> Self {
        Self::new(self.x - by, self.y - by, self.width + 2.0 * by, self.height + 2.0 * by)
    }

    pub fn corners(&self) -> [CanvasPoint; 4] {
        [
            CanvasPoint::new(self.x, self.y),
            CanvasPoint::new(self.right(), self.y),
            CanvasPoint::new(self.right(), self.top()),
            CanvasPoint::new(self.x, self.top()),
        ]
    }
}

/// Fill color with opacity in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub color: Rgb,
    pub opacity: f64,
}

impl Paint {
    pub fn solid(color: Rgb) -> Self {
        Self { color, opacity: 1.0 }
    }

    pub fn with_opacity(color: Rgb, opacity: f64) -> Self {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        Self { color, opacity }
    }

    /// Opaque color equivalent over a white page
    pub fn flattened(&self) -> Rgb {
        self.color.over_white(self.opacity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Rgb, width: f64) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f64,
    pub color: Rgb,
    pub bold: bool,
}

impl TextStyle {
    pub fn regular(size: f64, color: Rgb) -> Self {
        Self { size, color, bold: false }
    }

    pub fn bold(size: f64, color: Rgb) -> Self {
        Self { size, color, bold: true }
    }
}

/// A single-page drawing target.
///
/// `text` places the left end of the baseline at `origin`.
pub trait Surface {
    /// Page size in points as `(width, height)`
    fn page_size(&self) -> (f64, f64);

    fn fill_rect(&mut self, rect: CanvasRect, paint: Paint);

    fn stroke_rect(&mut self, rect: CanvasRect, stroke: Stroke);

    fn line(&mut self, from: CanvasPoint, to: CanvasPoint, stroke: Stroke);

    fn text(&mut self, origin: CanvasPoint, text: &str, style: TextStyle);

    /// Whether `fill_polygon` is a native operation with real opacity
    fn supports_polygon_fill(&self) -> bool {
        false
    }

    /// Fill a single ring. Surfaces without native polygons scan-fill.
    fn fill_polygon(&mut self, ring: &[CanvasPoint], paint: Paint) {
        crate::rasterize::scan_fill(self, ring, paint);
    }

    /// Serialize the page
    fn finish(self) -> RenderResult<Vec<u8>>
    where
        Self: Sized;
}
