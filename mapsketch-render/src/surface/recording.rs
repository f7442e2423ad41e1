use serde::{Deserialize, Serialize};

use super::{CanvasPoint, CanvasRect, Paint, Stroke, Surface, TextStyle};
use crate::error::RenderResult;

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillRect { rect: CanvasRect, paint: Paint },
    StrokeRect { rect: CanvasRect, stroke: Stroke },
    Line { from: CanvasPoint, to: CanvasPoint, stroke: Stroke },
    Text { origin: CanvasPoint, text: String, style: TextStyle },
}

#[derive(Debug, Serialize)]
struct Recording<'a> {
    width: f64,
    height: f64,
    ops: &'a [DrawOp],
}

/// Surface that keeps every call as a [`DrawOp`] and serializes them as JSON
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ops: Vec::new() }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text of every text op, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: CanvasRect, paint: Paint) {
        self.ops.push(DrawOp::FillRect { rect, paint });
    }

    fn stroke_rect(&mut self, rect: CanvasRect, stroke: Stroke) {
        self.ops.push(DrawOp::StrokeRect { rect, stroke });
    }

    fn line(&mut self, from: CanvasPoint, to: CanvasPoint, stroke: Stroke) {
        self.ops.push(DrawOp::Line { from, to, stroke });
    }

    fn text(&mut self, origin: CanvasPoint, text: &str, style: TextStyle) {
        self.ops.push(DrawOp::Text { origin, text: text.to_string(), style });
    }

    fn finish(self) -> RenderResult<Vec<u8>> {
        let recording = Recording {
            width: self.width,
            height: self.height,
            ops: &self.ops,
        };
        Ok(serde_json::to_vec_pretty(&recording)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapsketch_core::Rgb;

    #[test]
    fn test_recording_serializes_tagged_ops() {
        let mut s = RecordingSurface::new(842.0, 595.0);
        s.text(CanvasPoint::new(1.0, 2.0), "N", TextStyle::bold(8.0, Rgb::BLACK));
        s.line(CanvasPoint::new(0.0, 0.0), CanvasPoint::new(1.0, 1.0), Stroke::new(Rgb::WHITE, 0.5));
        assert_eq!(s.texts().collect::<Vec<_>>(), vec!["N"]);

        let bytes = s.finish().unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["width"], 842.0);
        assert_eq!(v["ops"][0]["op"], "text");
        assert_eq!(v["ops"][0]["style"]["color"], "#000000");
        assert_eq!(v["ops"][1]["op"], "line");
    }
}
