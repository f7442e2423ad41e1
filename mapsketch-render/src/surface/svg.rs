use std::fmt::Write as _;

use mapsketch_core::Rgb;

use super::{CanvasPoint, CanvasRect, Paint, Stroke, Surface, TextStyle};
use crate::error::RenderResult;

/// SVG string builder. Elements are collected in order and written out by
/// `finish`; y is flipped so page coordinates keep the bottom-left origin.
pub struct SvgSurface {
    width: f64,
    height: f64,
    font_family: String,
    comments: Vec<String>,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64, font_family: impl Into<String>) -> Self {
        Self {
            width,
            height,
            font_family: font_family.into(),
            comments: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Add a comment placed right after the opening `<svg>` tag
    pub fn add_comment(&mut self, comment: &str) {
        self.comments.push(comment.replace("--", "- -"));
    }

    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }
}

impl Surface for SvgSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: CanvasRect, paint: Paint) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
            num(rect.x),
            num(self.flip(rect.top())),
            num(rect.width),
            num(rect.height),
            paint.color,
            opacity_attr(paint.opacity)
        ));
    }

    fn stroke_rect(&mut self, rect: CanvasRect, stroke: Stroke) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            num(rect.x),
            num(self.flip(rect.top())),
            num(rect.width),
            num(rect.height),
            stroke.color,
            num(stroke.width)
        ));
    }

    fn line(&mut self, from: CanvasPoint, to: CanvasPoint, stroke: Stroke) {
        self.elements.push(format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="butt"/>"#,
            num(from.x),
            num(self.flip(from.y)),
            num(to.x),
            num(self.flip(to.y)),
            stroke.color,
            num(stroke.width)
        ));
    }

    fn text(&mut self, origin: CanvasPoint, text: &str, style: TextStyle) {
        let weight = if style.bold { r#" font-weight="bold""# } else { "" };
        self.elements.push(format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}px"{} fill="{}">{}</text>"#,
            num(origin.x),
            num(self.flip(origin.y)),
            escape(&self.font_family),
            num(style.size),
            weight,
            style.color,
            escape(text)
        ));
    }

    fn supports_polygon_fill(&self) -> bool {
        true
    }

    fn fill_polygon(&mut self, ring: &[CanvasPoint], paint: Paint) {
        if ring.len() < 3 {
            return;
        }
        let mut points = String::new();
        for (i, p) in ring.iter().enumerate() {
            if i > 0 {
                points.push(' ');
            }
            let _ = write!(points, "{},{}", num(p.x), num(self.flip(p.y)));
        }
        self.elements.push(format!(
            r#"<polygon points="{}" fill="{}"{} fill-rule="evenodd" stroke="none"/>"#,
            points,
            paint.color,
            opacity_attr(paint.opacity)
        ));
    }

    fn finish(self) -> RenderResult<Vec<u8>> {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            "<svg width=\"{w}pt\" height=\"{h}pt\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
            w = num(self.width),
            h = num(self.height)
        ));
        for c in &self.comments {
            for line in c.lines() {
                out.push_str(&format!("  <!-- {} -->\n", line));
            }
        }
        out.push_str(&format!(
            "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            num(self.width),
            num(self.height),
            Rgb::WHITE
        ));
        for element in &self.elements {
            out.push_str("  ");
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        Ok(out.into_bytes())
    }
}

fn opacity_attr(opacity: f64) -> String {
    if opacity >= 1.0 {
        String::new()
    } else {
        format!(r#" fill-opacity="{}""#, num(opacity))
    }
}

/// Fixed-precision number without trailing zeros
fn num(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
