use std::io::BufWriter;

use mapsketch_core::Rgb;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Point,
};

use super::{CanvasPoint, CanvasRect, Paint, Stroke, Surface, TextStyle};
use crate::error::{RenderError, RenderResult};

const MM_PER_PT: f64 = 25.4 / 72.0;

/// Single-page PDF built with printpdf and the built-in Helvetica faces.
///
/// Fill opacity is approximated by mixing with the white page.
pub struct PdfSurface {
    width: f64,
    height: f64,
    doc: PdfDocumentReference,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PdfSurface {
    pub fn new(width: f64, height: f64, title: &str) -> RenderResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, mm(width), mm(height), "Map");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::pdf(format!("{e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::pdf(format!("{e:?}")))?;
        Ok(Self { width, height, doc, page, layer, regular, bold })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    fn shape(points: &[CanvasPoint], closed: bool, fill: bool) -> Line {
        Line {
            points: points.iter().map(|p| (Point::new(mm(p.x), mm(p.y)), false)).collect(),
            is_closed: closed,
            has_fill: fill,
            has_stroke: !fill,
            is_clipping_path: false,
        }
    }
}

fn mm(pt: f64) -> Mm {
    Mm(pt * MM_PER_PT)
}

fn pdf_color(c: Rgb) -> Color {
    let (r, g, b) = c.to_unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

impl Surface for PdfSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: CanvasRect, paint: Paint) {
        let layer = self.layer();
        layer.set_fill_color(pdf_color(paint.flattened()));
        layer.add_shape(Self::shape(&rect.corners(), true, true));
    }

    fn stroke_rect(&mut self, rect: CanvasRect, stroke: Stroke) {
        let layer = self.layer();
        layer.set_outline_color(pdf_color(stroke.color));
        layer.set_outline_thickness(stroke.width);
        layer.add_shape(Self::shape(&rect.corners(), true, false));
    }

    fn line(&mut self, from: CanvasPoint, to: CanvasPoint, stroke: Stroke) {
        let layer = self.layer();
        layer.set_outline_color(pdf_color(stroke.color));
        layer.set_outline_thickness(stroke.width);
        layer.add_shape(Self::shape(&[from, to], false, false));
    }

    fn text(&mut self, origin: CanvasPoint, text: &str, style: TextStyle) {
        let font = if style.bold { &self.bold } else { &self.regular };
        let layer = self.layer();
        layer.set_fill_color(pdf_color(style.color));
        layer.use_text(text, style.size, mm(origin.x), mm(origin.y), font);
    }

    fn finish(self) -> RenderResult<Vec<u8>> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| RenderError::pdf(format!("{e:?}")))?;
        writer
            .into_inner()
            .map_err(|e| RenderError::Io(e.into_error()))
    }
}
