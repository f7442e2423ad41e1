//! Graticule over the map canvas with degree labels

use mapsketch_core::Rgb;

use crate::projection::Projection;
use crate::surface::{CanvasPoint, Stroke, Surface, TextStyle};

/// Lines aimed for per axis
pub const TARGET_LINES: usize = 5;

// Round a length up to a "nice" number: 1, 2, or 5 x 10^k
pub fn nice_step(x: f64) -> f64 {
    if !(x > 0.0) || !x.is_finite() {
        return 1.0;
    }
    let exp = x.log10().floor();
    let base = 10f64.powf(exp);
    let mant = x / base;
    let nice = if mant <= 1.0 {
        1.0
    } else if mant <= 2.0 {
        2.0
    } else if mant <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Multiples of a nice step inside `[min, max]`
pub fn nice_ticks(min: f64, max: f64, desired: usize) -> (f64, Vec<f64>) {
    let span = max - min;
    if !(span > 0.0) || desired == 0 {
        return (0.0, Vec::new());
    }
    let step = nice_step(span / desired as f64);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    let ticks = (first..=last).map(|k| k as f64 * step).collect();
    (step, ticks)
}

fn decimals_for(step: f64) -> usize {
    if step > 0.0 {
        ((-step.log10()).ceil().max(0.0) as usize).clamp(3, 6)
    } else {
        3
    }
}

pub fn format_lng(v: f64, decimals: usize) -> String {
    let hemi = if v < 0.0 { 'W' } else { 'E' };
    format!("{:.*} {}", decimals, v.abs(), hemi)
}

pub fn format_lat(v: f64, decimals: usize) -> String {
    let hemi = if v < 0.0 { 'S' } else { 'N' };
    format!("{:.*} {}", decimals, v.abs(), hemi)
}

/// Draw meridians and parallels across the canvas. Longitude labels go under
/// the canvas; latitude labels sit inside its left edge.
pub fn draw_grid<S: Surface + ?Sized>(surface: &mut S, projection: &Projection) {
    let canvas = projection.canvas();
    let extent = projection.visible_extent();
    let line = Stroke::new(Rgb::new(0xcc, 0xcc, 0xcc), 0.3);
    let label = TextStyle::regular(6.0, Rgb::new(0x66, 0x66, 0x66));

    let (step_x, xs) = nice_ticks(extent.min().x, extent.max().x, TARGET_LINES);
    let dx = decimals_for(step_x);
    for lng in xs {
        let x = projection.project(lng, extent.min().y).x;
        if x < canvas.x || x > canvas.right() {
            continue;
        }
        surface.line(CanvasPoint::new(x, canvas.y), CanvasPoint::new(x, canvas.top()), line);
        let text = format_lng(lng, dx);
        surface.text(CanvasPoint::new(x - text.len() as f64 * 1.6, canvas.y - 9.0), &text, label);
    }

    let (step_y, ys) = nice_ticks(extent.min().y, extent.max().y, TARGET_LINES);
    let dy = decimals_for(step_y);
    for lat in ys {
        let y = projection.project(extent.min().x, lat).y;
        if y < canvas.y || y > canvas.top() {
            continue;
        }
        surface.line(CanvasPoint::new(canvas.x, y), CanvasPoint::new(canvas.right(), y), line);
        surface.text(CanvasPoint::new(canvas.x + 2.0, y + 2.0), &format_lat(lat, dy), label);
    }
}
