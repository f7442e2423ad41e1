//! Geographic to canvas projection
//!
//! A plain equirectangular fit: one uniform scale for both axes, chosen so
//! the bounding box fills 90% of the tighter canvas dimension, with the box
//! center on the canvas center. Latitude increases upward.

use geo::{Coord, Point, Rect};

use crate::surface::{CanvasPoint, CanvasRect};

/// Fraction of the canvas the bounding box may occupy
pub const FIT_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    bounds: Rect<f64>,
    canvas: CanvasRect,
    /// Canvas units per degree
    scale: f64,
}

impl Projection {
    /// Fit `bounds` into `canvas`.
    ///
    /// An axis with zero extent adds no constraint; if both are zero the
    /// scale is one canvas unit per degree.
    pub fn new(bounds: Rect<f64>, canvas: CanvasRect) -> Self {
        let axis = |extent: f64, room: f64| {
            if extent > 0.0 && extent.is_finite() {
                Some(room / extent)
            } else {
                None
            }
        };
        let scale = match (axis(bounds.width(), canvas.width), axis(bounds.height(), canvas.height)) {
            (Some(sx), Some(sy)) => sx.min(sy) * FIT_FACTOR,
            (Some(s), None) | (None, Some(s)) => s * FIT_FACTOR,
            (None, None) => 1.0,
        };
        Self { bounds, canvas, scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn canvas(&self) -> CanvasRect {
        self.canvas
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn project(&self, lng: f64, lat: f64) -> CanvasPoint {
        let geo_center = self.bounds.center();
        let canvas_center = self.canvas.center();
        CanvasPoint::new(
            canvas_center.x + (lng - geo_center.x) * self.scale,
            canvas_center.y + (lat - geo_center.y) * self.scale,
        )
    }

    pub fn project_coord(&self, c: Coord<f64>) -> CanvasPoint {
        self.project(c.x, c.y)
    }

    pub fn project_ring<'a, I: IntoIterator<Item = &'a Coord<f64>>>(&self, coords: I) -> Vec<CanvasPoint> {
        coords.into_iter().map(|c| self.project_coord(*c)).collect()
    }

    /// Inverse of [`Projection::project`]
    pub fn unproject(&self, p: CanvasPoint) -> Point<f64> {
        let geo_center = self.bounds.center();
        let canvas_center = self.canvas.center();
        Point::new(
            geo_center.x + (p.x - canvas_center.x) / self.scale,
            geo_center.y + (p.y - canvas_center.y) / self.scale,
        )
    }

    /// Geographic rectangle covered by the whole canvas
    pub fn visible_extent(&self) -> Rect<f64> {
        let lo = self.unproject(CanvasPoint::new(self.canvas.x, self.canvas.y));
        let hi = self.unproject(CanvasPoint::new(self.canvas.right(), self.canvas.top()));
        Rect::new(lo.0, hi.0)
    }
}
