//! Report assembly
//!
//! Draw order: map border, grid, layer geometry in store order, area
//! labels, then the sidebar (title, north arrow, scale, legend, total) and
//! the footer.

use chrono::NaiveDateTime;
use mapsketch_core::measure::{aggregate_area_ha, collection_bounds, polygon_area_ha};
use mapsketch_core::model::{Geometry, Layer};
use mapsketch_core::{LayerStore, Rgb};

use crate::error::{RenderError, RenderResult};
use crate::grid::draw_grid;
use crate::label::{draw_label, format_hectares, place_label, Placement};
use crate::legend::{draw_legend, legend_entries, truncate_name, LegendEntry};
use crate::projection::Projection;
use crate::rasterize::{fill_ring, stroke_path, symbol_ring};
use crate::scale::{draw_compass, round_scale, scale_label, scale_ratio};
use crate::surface::{
    CanvasPoint, CanvasRect, Paint, PngSurface, RecordingSurface, Stroke, Surface, SvgSurface, TextStyle,
};
use crate::{ExportConfig, OutputFormat};

/// Radius of point markers in page units
const POINT_RADIUS: f64 = 4.0;

/// Stem used when both title and subtitle are blank
pub const DEFAULT_FILE_STEM: &str = "map_export";

/// One export request from the host
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub title: String,
    pub subtitle: String,
    pub printed_at: NaiveDateTime,
    pub format: OutputFormat,
}

impl ReportRequest {
    pub fn new(format: OutputFormat, printed_at: NaiveDateTime) -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            printed_at,
            format,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        self.title = title.into();
        self.subtitle = subtitle.into();
        self
    }

    pub fn filename(&self) -> String {
        suggested_filename(&self.title, &self.subtitle, self.format)
    }
}

/// What ended up on the page
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub legend: Vec<LegendEntry>,
    pub total_area_ha: f64,
    pub scale_denominator: u64,
    pub labels_placed: usize,
    pub labels_skipped: usize,
    pub features_skipped: usize,
}

/// A rendered page and its suggested file name
#[derive(Debug, Clone)]
pub struct Report {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub summary: ReportSummary,
}

/// Render the visible layers of `store` to the requested format.
///
/// Fails with [`RenderError::NoRenderableData`] when there is no visible
/// layer or the visible geometry collapses to a single point.
pub fn render_report(store: &LayerStore, request: &ReportRequest, config: &ExportConfig) -> RenderResult<Report> {
    let (w, h) = (config.page_width, config.page_height);
    let (bytes, summary) = match request.format {
        OutputFormat::Pdf => render_pdf(store, request, config)?,
        OutputFormat::Svg => {
            let mut svg = SvgSurface::new(w, h, config.font_family.clone());
            if let Some(comment) = &config.provenance_comment {
                svg.add_comment(comment);
            }
            render_on(svg, store, request, config)?
        }
        OutputFormat::Png => render_on(PngSurface::new(w, h, config.png_scale), store, request, config)?,
        OutputFormat::Json => render_on(RecordingSurface::new(w, h), store, request, config)?,
    };
    let filename = request.filename();
    log::info!(
        "Rendered {} ({} bytes, {} legend entries, scale 1:{})",
        filename,
        bytes.len(),
        summary.legend.len(),
        summary.scale_denominator
    );
    Ok(Report { bytes, filename, summary })
}

#[cfg(feature = "pdf")]
fn render_pdf(
    store: &LayerStore,
    request: &ReportRequest,
    config: &ExportConfig,
) -> RenderResult<(Vec<u8>, ReportSummary)> {
    let pdf = crate::surface::PdfSurface::new(config.page_width, config.page_height, &config.document_title)?;
    render_on(pdf, store, request, config)
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(
    _store: &LayerStore,
    _request: &ReportRequest,
    _config: &ExportConfig,
) -> RenderResult<(Vec<u8>, ReportSummary)> {
    Err(RenderError::pdf("PDF export not enabled (compile with 'pdf' feature)"))
}

fn render_on<S: Surface>(
    mut surface: S,
    store: &LayerStore,
    request: &ReportRequest,
    config: &ExportConfig,
) -> RenderResult<(Vec<u8>, ReportSummary)> {
    let summary = draw_report(&mut surface, store, request, config)?;
    Ok((surface.finish()?, summary))
}

/// Fit the visible layers' bounding box into the map canvas
pub fn frame(store: &LayerStore, canvas: CanvasRect) -> RenderResult<Projection> {
    if store.visible().next().is_none() {
        return Err(RenderError::NoRenderableData);
    }
    let bounds = collection_bounds(store.visible()).ok_or(RenderError::NoRenderableData)?;
    if !(bounds.width() > 0.0) && !(bounds.height() > 0.0) {
        return Err(RenderError::NoRenderableData);
    }
    Ok(Projection::new(bounds, canvas))
}

/// Draw the whole page onto any surface
pub fn draw_report<S: Surface + ?Sized>(
    surface: &mut S,
    store: &LayerStore,
    request: &ReportRequest,
    config: &ExportConfig,
) -> RenderResult<ReportSummary> {
    let projection = frame(store, config.canvas)?;
    let canvas = config.canvas;

    surface.stroke_rect(canvas, Stroke::new(Rgb::BLACK, 1.0));
    if config.show_grid {
        draw_grid(surface, &projection);
    }

    let mut features_skipped = 0;
    for layer in store.visible() {
        features_skipped += draw_layer(surface, &projection, layer);
    }

    let (mut labels_placed, mut labels_skipped) = (0, 0);
    if config.show_labels {
        for layer in store.visible().filter(|l| l.label.visible) {
            let (placed, skipped) = draw_layer_labels(surface, &projection, layer, config);
            labels_placed += placed;
            labels_skipped += skipped;
        }
    }

    let legend = legend_entries(store.iter());
    let total_area_ha = aggregate_area_ha(store.iter());
    let scale_denominator = round_scale(scale_ratio(&projection).unwrap_or(0.0));
    draw_sidebar(surface, request, config, &legend, total_area_ha, scale_denominator);

    if config.show_footer {
        surface.text(
            CanvasPoint::new(canvas.x, canvas.y - 40.0),
            &format!("Printed: {}", request.printed_at.format("%Y-%m-%d %H:%M")),
            TextStyle::regular(8.0, Rgb::new(0x80, 0x80, 0x80)),
        );
    }

    Ok(ReportSummary {
        legend,
        total_area_ha,
        scale_denominator,
        labels_placed,
        labels_skipped,
        features_skipped,
    })
}

/// Draw one layer's geometry; returns the number of skipped features
fn draw_layer<S: Surface + ?Sized>(surface: &mut S, projection: &Projection, layer: &Layer) -> usize {
    let style = &layer.style;
    let stroke = Stroke::new(style.stroke_color, style.stroke_width);
    let fill = Paint::with_opacity(style.fill_color, style.fill_opacity);
    let mut skipped = 0;

    for feature in &layer.features {
        match feature.geometry() {
            Geometry::Polygon(poly) => {
                if !poly.interiors().is_empty() {
                    log::debug!("Layer '{}': polygon holes are drawn filled", layer.id);
                }
                let ring = projection.project_ring(poly.exterior().0.iter());
                fill_ring(surface, &ring, fill);
                stroke_path(surface, &ring, true, stroke, &style.dash);
            }
            Geometry::LineString(ls) => {
                let path = projection.project_ring(ls.0.iter());
                stroke_path(surface, &path, false, stroke, &style.dash);
            }
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    let path = projection.project_ring(ls.0.iter());
                    stroke_path(surface, &path, false, stroke, &style.dash);
                }
            }
            Geometry::Point(p) => {
                let ring = symbol_ring(projection.project(p.x(), p.y()), style.point_symbol, POINT_RADIUS);
                fill_ring(surface, &ring, Paint::with_opacity(style.fill_color, style.fill_opacity.max(0.6)));
                stroke_path(surface, &ring, true, Stroke::new(style.stroke_color, style.stroke_width.min(1.5)), &[]);
            }
            Geometry::Unsupported(kind) => {
                log::debug!("Layer '{}': skipping unsupported {} geometry", layer.id, kind);
                skipped += 1;
            }
        }
    }
    skipped
}

/// Label each polygon of a layer; returns `(placed, skipped)`
fn draw_layer_labels<S: Surface + ?Sized>(
    surface: &mut S,
    projection: &Projection,
    layer: &Layer,
    config: &ExportConfig,
) -> (usize, usize) {
    let settings = &layer.label;
    let style = TextStyle::regular(settings.size, settings.color);
    let (mut placed, mut skipped) = (0, 0);

    for polygon in layer.polygons() {
        let text = if settings.text.trim().is_empty() {
            format_hectares(polygon_area_ha(polygon))
        } else {
            settings.text.clone()
        };
        let placement = place_label(
            polygon,
            projection,
            &text,
            settings.size,
            settings.offset,
            &config.metrics,
            &config.labels,
        );
        match &placement {
            Placement::Placed { .. } => {
                draw_label(surface, &placement, &text, style, &config.labels);
                placed += 1;
            }
            Placement::Skipped(reason) => {
                log::debug!("Layer '{}': label '{}' skipped: {:?}", layer.id, text, reason);
                skipped += 1;
            }
        }
    }
    (placed, skipped)
}

fn draw_sidebar<S: Surface + ?Sized>(
    surface: &mut S,
    request: &ReportRequest,
    config: &ExportConfig,
    legend: &[LegendEntry],
    total_area_ha: f64,
    scale_denominator: u64,
) {
    let x = config.sidebar_x;
    let width = config.sidebar_width;
    let top = config.canvas.top();
    let bottom = config.canvas.y;
    let rule = Stroke::new(Rgb::new(0x99, 0x99, 0x99), 0.5);
    let divider = |s: &mut S, y: f64| s.line(CanvasPoint::new(x, y), CanvasPoint::new(x + width, y), rule);

    let title = request.title.trim();
    if !title.is_empty() {
        surface.text(
            CanvasPoint::new(x, top - 25.0),
            &truncate_name(&title.to_uppercase(), 30),
            TextStyle::bold(14.0, Rgb::BLACK),
        );
    }
    let subtitle = request.subtitle.trim();
    if !subtitle.is_empty() {
        surface.text(
            CanvasPoint::new(x, top - 43.0),
            &truncate_name(&subtitle.to_uppercase(), 42),
            TextStyle::regular(10.0, Rgb::new(0x33, 0x33, 0x33)),
        );
    }
    divider(surface, top - 55.0);

    if config.show_compass {
        draw_compass(surface, CanvasPoint::new(x + 15.0, top - 88.0), 26.0);
    }
    surface.text(
        CanvasPoint::new(x + 40.0, top - 92.0),
        &scale_label(scale_denominator),
        TextStyle::regular(10.0, Rgb::BLACK),
    );
    divider(surface, top - 115.0);

    surface.text(CanvasPoint::new(x, top - 130.0), "LEGEND", TextStyle::bold(10.0, Rgb::BLACK));
    let legend_top = top - 140.0;
    let legend_bottom = bottom + 45.0;
    let area = CanvasRect::new(x, legend_bottom, width, (legend_top - legend_bottom).max(0.0));
    draw_legend(surface, legend, area, &config.legend);

    divider(surface, bottom + 35.0);
    surface.text(
        CanvasPoint::new(x, bottom + 20.0),
        &format!("TOTAL AREA: {}", format_hectares(total_area_ha)),
        TextStyle::bold(11.0, Rgb::BLACK),
    );
}

/// File name for a report: title and subtitle joined with `_`, whitespace
/// turned into `_`, characters illegal in file names dropped.
pub fn suggested_filename(title: &str, subtitle: &str, format: OutputFormat) -> String {
    let parts: Vec<String> = [title, subtitle]
        .iter()
        .map(|p| sanitize_part(p))
        .filter(|p| !p.is_empty())
        .collect();
    let stem = if parts.is_empty() {
        DEFAULT_FILE_STEM.to_string()
    } else {
        parts.join("_")
    };
    format!("{}.{}", stem, format.extension())
}

fn sanitize_part(part: &str) -> String {
    const ILLEGAL: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    part.chars()
        .filter(|c| !ILLEGAL.contains(c) && !c.is_control())
        .collect::<String>()
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawOp;
    use chrono::NaiveDate;
    use geo::{line_string, polygon, Point};

    fn printed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap()
    }

    fn plot_layer(id: &str, cx: f64, cy: f64, side: f64) -> Layer {
        let h = side / 2.0;
        let mut layer = Layer::new(id, format!("Plot {id}"));
        layer.push(Geometry::Polygon(polygon![
            (x: cx - h, y: cy - h), (x: cx + h, y: cy - h), (x: cx + h, y: cy + h), (x: cx - h, y: cy + h),
        ]));
        layer
    }

    fn record(store: &LayerStore, config: &ExportConfig) -> (RecordingSurface, ReportSummary) {
        let request = ReportRequest::new(OutputFormat::Json, printed_at()).with_title("North block", "survey");
        let mut s = RecordingSurface::new(config.page_width, config.page_height);
        let summary = draw_report(&mut s, store, &request, config).unwrap();
        (s, summary)
    }

    #[test]
    fn test_filename() {
        assert_eq!(suggested_filename("North Block", "Survey 2024", OutputFormat::Pdf), "North_Block_Survey_2024.pdf");
        assert_eq!(suggested_filename("  ", "", OutputFormat::Svg), "map_export.svg");
        assert_eq!(suggested_filename("a/b:c*d?", "  x  y ", OutputFormat::Png), "abcd_x__y.png");
        assert_eq!(suggested_filename("<|>", "Only sub", OutputFormat::Json), "Only_sub.json");
    }

    #[test]
    fn test_no_visible_layers_is_error() {
        let mut store = LayerStore::new();
        assert!(matches!(frame(&store, ExportConfig::default().canvas), Err(RenderError::NoRenderableData)));
        let mut hidden = plot_layer("a", 0.0, 0.0, 1.0);
        hidden.visible = false;
        store.insert(hidden);
        assert!(matches!(frame(&store, ExportConfig::default().canvas), Err(RenderError::NoRenderableData)));
    }

    #[test]
    fn test_single_point_is_error() {
        let mut layer = Layer::new("p", "Point");
        layer.push(Geometry::Point(Point::new(101.4, 0.5)));
        let store: LayerStore = vec![layer].into_iter().collect();
        let request = ReportRequest::new(OutputFormat::Json, printed_at());
        let err = render_report(&store, &request, &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::NoRenderableData));
    }

    #[test]
    fn test_straight_line_renders() {
        // Zero height extent is fine as long as the width is not
        let mut layer = Layer::new("r", "Road");
        layer.push(Geometry::LineString(line_string![(x: 101.0, y: 0.5), (x: 101.1, y: 0.5)]));
        let store: LayerStore = vec![layer].into_iter().collect();
        let (s, summary) = record(&store, &ExportConfig::default());
        assert_eq!(summary.legend.len(), 1);
        assert!(s.ops().iter().any(|op| matches!(op, DrawOp::Line { stroke, .. } if stroke.width == 2.0)));
    }

    #[test]
    fn test_sidebar_text_is_uppercased() {
        let store: LayerStore = vec![plot_layer("a", 101.4, 0.5, 0.01)].into_iter().collect();
        let (s, _) = record(&store, &ExportConfig::default());
        let texts: Vec<_> = s.texts().collect();
        assert!(texts.contains(&"NORTH BLOCK"));
        assert!(texts.contains(&"SURVEY"));
        assert!(texts.contains(&"LEGEND"));
        assert!(texts.contains(&"Printed: 2024-03-15 09:30"));
        assert!(texts.iter().any(|t| t.starts_with("SCALE 1:")));
    }

    #[test]
    fn test_hidden_layers_and_unsupported_features() {
        let mut shown = plot_layer("a", 101.4, 0.5, 0.01);
        shown.push(Geometry::Unsupported("GeometryCollection".into()));
        let mut hidden = plot_layer("b", 150.0, 50.0, 0.01);
        hidden.visible = false;
        let store: LayerStore = vec![shown, hidden].into_iter().collect();
        let (_, summary) = record(&store, &ExportConfig::default());
        assert_eq!(summary.legend.len(), 1);
        assert_eq!(summary.features_skipped, 1);
        assert_eq!(summary.labels_placed, 1);
    }

    #[test]
    fn test_labels_can_be_disabled() {
        let store: LayerStore = vec![plot_layer("a", 101.4, 0.5, 0.01)].into_iter().collect();
        let config = ExportConfig { show_labels: false, show_grid: false, ..ExportConfig::default() };
        let (s, summary) = record(&store, &config);
        assert_eq!(summary.labels_placed, 0);
        let area_text = format_hectares(polygon_area_ha(store.get("a").unwrap().polygons().next().unwrap()));
        // The only hectare text left is the legend row
        assert_eq!(s.texts().filter(|t| *t == area_text).count(), 1);
    }

    #[test]
    fn test_closed_ring_in_layer_literal_renders_as_polygon() {
        use mapsketch_core::model::Feature;
        let ring = line_string![
            (x: 101.399, y: 0.499), (x: 101.401, y: 0.499), (x: 101.401, y: 0.501), (x: 101.399, y: 0.501), (x: 101.399, y: 0.499),
        ];
        let layer = Layer {
            features: vec![Feature::new(Geometry::LineString(ring))],
            ..Layer::new("sq", "Square")
        };
        let store: LayerStore = vec![layer].into_iter().collect();
        let (s, summary) = record(&store, &ExportConfig::default());

        assert_eq!(summary.labels_placed, 1);
        assert!(summary.total_area_ha > 4.0);
        assert!(matches!(summary.legend[0].swatch, crate::legend::Swatch::Area { .. }));
        // Scan-filled interior rows on the recording surface
        assert!(s.ops().iter().any(|op| matches!(op, DrawOp::FillRect { rect, .. } if rect.height == 1.0)));
    }

    #[test]
    fn test_total_respects_exclusion() {
        let mut a = plot_layer("a", 101.4, 0.5, 0.01);
        a.area_override_ha = Some(1.0);
        let mut b = plot_layer("b", 101.42, 0.5, 0.01);
        b.area_override_ha = Some(2.0);
        b.include_in_total = false;
        let mut c = plot_layer("c", 101.44, 0.5, 0.01);
        c.area_override_ha = Some(3.0);
        let store: LayerStore = vec![a, b, c].into_iter().collect();
        let (s, summary) = record(&store, &ExportConfig::default());
        assert!((summary.total_area_ha - 4.0).abs() < 1e-12);
        assert!(s.texts().any(|t| t == "TOTAL AREA: 4.00 ha"));
        assert!(s.texts().any(|t| t == "2.00 ha (excl.)"));
    }
}
