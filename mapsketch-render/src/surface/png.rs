use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use mapsketch_core::Rgb;

use super::{CanvasPoint, CanvasRect, Paint, Stroke, Surface, TextStyle};
use crate::error::{RenderError, RenderResult};

/// Largest accepted pixels-per-point factor
pub const MAX_SCALE: f64 = 8.0;

/// Largest image side in pixels
pub const MAX_SIDE_PX: u32 = 16_384;

/// Raster page on the CPU. Text is not rasterized.
pub struct PngSurface {
    width: f64,
    height: f64,
    /// Pixels per page point
    scale: f64,
    img: RgbaImage,
}

impl PngSurface {
    /// `scale` is clamped to `MAX_SCALE`, then lowered further so neither
    /// side exceeds `MAX_SIDE_PX`.
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        let mut scale = if scale.is_finite() && scale > 0.0 { scale.min(MAX_SCALE) } else { 1.0 };
        let longest = width.max(height);
        if longest.is_finite() && longest * scale > MAX_SIDE_PX as f64 {
            scale = MAX_SIDE_PX as f64 / longest;
        }
        let side = |v: f64| (v * scale).round().clamp(1.0, MAX_SIDE_PX as f64) as u32;
        let (px_w, px_h) = (side(width), side(height));
        Self {
            width,
            height,
            scale,
            img: RgbaImage::from_pixel(px_w, px_h, Rgba([255, 255, 255, 255])),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    fn to_px(&self, p: CanvasPoint) -> (i32, i32) {
        (
            (p.x * self.scale).round() as i32,
            ((self.height - p.y) * self.scale).round() as i32,
        )
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgb, opacity: f64) {
        if x < 0 || y < 0 || x as u32 >= self.img.width() || y as u32 >= self.img.height() {
            return;
        }
        let px = self.img.get_pixel_mut(x as u32, y as u32);
        let a = opacity.clamp(0.0, 1.0);
        let mix = |dst: u8, src: u8| (a * src as f64 + (1.0 - a) * dst as f64).round() as u8;
        *px = Rgba([mix(px[0], color.r), mix(px[1], color.g), mix(px[2], color.b), 255]);
    }

    fn stamp(&mut self, x: i32, y: i32, radius: i32, color: Rgb) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                self.blend(x + dx, y + dy, color, 1.0);
            }
        }
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb, radius: i32) {
        // Bresenham line drawing
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.stamp(x0, y0, radius, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn pen_radius(&self, width: f64) -> i32 {
        ((width * self.scale - 1.0) / 2.0).round().max(0.0) as i32
    }
}

impl Surface for PngSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: CanvasRect, paint: Paint) {
        // Pixel edges are rounded the same way for neighbouring rects so
        // scan-fill rows tile without gaps or double blending.
        let x0 = (rect.x * self.scale).round() as i32;
        let x1 = (rect.right() * self.scale).round() as i32;
        let y0 = ((self.height - rect.top()) * self.scale).round() as i32;
        let y1 = ((self.height - rect.y) * self.scale).round() as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, paint.color, paint.opacity);
            }
        }
    }

    fn stroke_rect(&mut self, rect: CanvasRect, stroke: Stroke) {
        let c = rect.corners();
        for i in 0..4 {
            self.line(c[i], c[(i + 1) % 4], stroke);
        }
    }

    fn line(&mut self, from: CanvasPoint, to: CanvasPoint, stroke: Stroke) {
        let radius = self.pen_radius(stroke.width);
        let (a, b) = (self.to_px(from), self.to_px(to));
        self.draw_line(a, b, stroke.color, radius);
    }

    fn text(&mut self, _origin: CanvasPoint, text: &str, _style: TextStyle) {
        log::trace!("PNG surface skips text {:?}", text);
    }

    fn finish(self) -> RenderResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.img
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| RenderError::image(e.to_string()))?;
        Ok(buf.into_inner())
    }
}
