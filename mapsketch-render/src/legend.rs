//! Legend rows and their layout in the sidebar
//!
//! One entry per visible layer, in layer order. Above a configurable entry
//! count the legend splits into two columns (`ceil(n/2)` on the left); rows
//! that still do not fit end in a single "+N more" line.

use mapsketch_core::measure::{layer_area_ha, layer_length_m};
use mapsketch_core::model::{Layer, LayerKind, PointSymbol};
use mapsketch_core::Rgb;
use serde::{Deserialize, Serialize};

use crate::label::format_hectares;
use crate::rasterize::{fill_ring, stroke_path, symbol_ring};
use crate::surface::{CanvasPoint, CanvasRect, Paint, Stroke, Surface, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum Swatch {
    Area { fill: Rgb, opacity: f64, stroke: Rgb },
    Line { stroke: Rgb, dash: Vec<f64> },
    Point { fill: Rgb, stroke: Rgb, symbol: PointSymbol },
}

/// Secondary quantity shown after the area of line and point layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    LengthM(f64),
    Count(usize),
}

impl Measurement {
    pub fn label(&self) -> String {
        match *self {
            Measurement::LengthM(m) if m >= 1000.0 => format!("{:.2} km", m / 1000.0),
            Measurement::LengthM(m) => format!("{:.0} m", m),
            Measurement::Count(1) => "1 pt".to_string(),
            Measurement::Count(n) => format!("{n} pts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub swatch: Swatch,
    /// Override when set, measured otherwise
    pub area_ha: f64,
    pub detail: Option<Measurement>,
    /// Layer is left out of the aggregate area total
    pub excluded: bool,
}

impl LegendEntry {
    pub fn from_layer(layer: &Layer) -> Self {
        let style = &layer.style;
        let (swatch, detail) = match layer.kind() {
            LayerKind::Polygonal | LayerKind::Empty => (
                Swatch::Area {
                    fill: style.fill_color,
                    opacity: style.fill_opacity,
                    stroke: style.stroke_color,
                },
                None,
            ),
            LayerKind::Lineal => (
                Swatch::Line { stroke: style.stroke_color, dash: style.dash.clone() },
                Some(Measurement::LengthM(layer_length_m(layer))),
            ),
            LayerKind::Punctal => (
                Swatch::Point {
                    fill: style.fill_color,
                    stroke: style.stroke_color,
                    symbol: style.point_symbol,
                },
                Some(Measurement::Count(layer.points().count())),
            ),
        };
        Self {
            name: layer.name.clone(),
            swatch,
            area_ha: layer_area_ha(layer),
            detail,
            excluded: !layer.include_in_total,
        }
    }

    /// Hectares first, then length or point count, e.g. `0.00 ha, 1.11 km`
    pub fn readout(&self) -> String {
        let mut out = format_hectares(self.area_ha);
        if let Some(detail) = self.detail {
            out.push_str(", ");
            out.push_str(&detail.label());
        }
        if self.excluded {
            out.push_str(" (excl.)");
        }
        out
    }
}

/// Entries for the visible layers, in order
pub fn legend_entries<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Vec<LegendEntry> {
    layers
        .into_iter()
        .filter(|l| l.visible)
        .map(LegendEntry::from_layer)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendOptions {
    /// More entries than this switch to two columns
    pub column_threshold: usize,
    pub row_height: f64,
    pub text_size: f64,
    /// Name length limit in one-column and two-column mode
    pub name_chars_single: usize,
    pub name_chars_double: usize,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            column_threshold: 16,
            row_height: 13.0,
            text_size: 8.0,
            name_chars_single: 28,
            name_chars_double: 10,
        }
    }
}

/// Entry indices per column plus the count elided into "+N more"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendLayout {
    pub columns: Vec<Vec<usize>>,
    pub hidden: usize,
}

/// Distribute `n` entries over one or two columns of `capacity` rows each.
///
/// When entries overflow, the last row of the last column is given up to the
/// "+N more" line.
pub fn layout_columns(n: usize, column_threshold: usize, capacity: usize) -> LegendLayout {
    if n == 0 || capacity == 0 {
        return LegendLayout { columns: Vec::new(), hidden: n };
    }
    if n <= column_threshold {
        if n <= capacity {
            return LegendLayout { columns: vec![(0..n).collect()], hidden: 0 };
        }
        let shown = capacity - 1;
        return LegendLayout { columns: vec![(0..shown).collect()], hidden: n - shown };
    }

    let left = n.div_ceil(2);
    if left <= capacity {
        return LegendLayout {
            columns: vec![(0..left).collect(), (left..n).collect()],
            hidden: 0,
        };
    }
    let shown_right = capacity - 1;
    LegendLayout {
        columns: vec![(0..capacity).collect(), (capacity..capacity + shown_right).collect()],
        hidden: n - capacity - shown_right,
    }
}

/// Shorten to `max_chars` characters, ending in "..." when cut
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = name.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Draw the legend rows inside `area`, top row first
pub fn draw_legend<S: Surface + ?Sized>(
    surface: &mut S,
    entries: &[LegendEntry],
    area: CanvasRect,
    options: &LegendOptions,
) -> LegendLayout {
    let capacity = (area.height / options.row_height).floor().max(0.0) as usize;
    let layout = layout_columns(entries.len(), options.column_threshold, capacity);
    let two_columns = layout.columns.len() > 1;
    let column_width = if two_columns { area.width / 2.0 } else { area.width };
    let name_chars = if two_columns { options.name_chars_double } else { options.name_chars_single };
    let size = if two_columns { options.text_size - 1.0 } else { options.text_size };
    let readout_dx = if two_columns { 60.0 } else { 150.0 };

    for (col, indices) in layout.columns.iter().enumerate() {
        let x = area.x + col as f64 * column_width;
        for (row, &idx) in indices.iter().enumerate() {
            let baseline = area.top() - (row as f64 + 1.0) * options.row_height + 3.0;
            let entry = &entries[idx];
            let dim = if entry.excluded { 0.5 } else { 0.0 };
            draw_swatch(surface, &entry.swatch, CanvasPoint::new(x, baseline - 1.0), dim);
            let text_color = Rgb::BLACK.dimmed(dim);
            surface.text(
                CanvasPoint::new(x + 16.0, baseline),
                &truncate_name(&entry.name, name_chars),
                TextStyle::regular(size, text_color),
            );
            surface.text(
                CanvasPoint::new(x + readout_dx, baseline),
                &entry.readout(),
                TextStyle::regular(size, text_color),
            );
        }
    }

    if layout.hidden > 0 {
        let last_col = layout.columns.len().saturating_sub(1);
        let rows = layout.columns.last().map(Vec::len).unwrap_or(0);
        let x = area.x + last_col as f64 * column_width;
        let baseline = area.top() - (rows as f64 + 1.0) * options.row_height + 3.0;
        surface.text(
            CanvasPoint::new(x + 16.0, baseline),
            &format!("+{} more", layout.hidden),
            TextStyle::regular(size, Rgb::new(0x55, 0x55, 0x55)),
        );
    }
    layout
}

/// 12 x 8 swatch with its bottom-left corner at `at`
fn draw_swatch<S: Surface + ?Sized>(surface: &mut S, swatch: &Swatch, at: CanvasPoint, dim: f64) {
    let rect = CanvasRect::new(at.x, at.y, 12.0, 8.0);
    match swatch {
        Swatch::Area { fill, opacity, stroke } => {
            let fill = Paint::with_opacity(*fill, *opacity).flattened().dimmed(dim);
            surface.fill_rect(rect, Paint::solid(fill));
            surface.stroke_rect(rect, Stroke::new(stroke.dimmed(dim), 1.0));
        }
        Swatch::Line { stroke, dash } => {
            let mid = rect.y + rect.height / 2.0;
            let scaled: Vec<f64> = dash.iter().map(|d| d / 2.0).collect();
            stroke_path(
                surface,
                &[CanvasPoint::new(rect.x, mid), CanvasPoint::new(rect.right(), mid)],
                false,
                Stroke::new(stroke.dimmed(dim), 2.0),
                &scaled,
            );
        }
        Swatch::Point { fill, stroke, symbol } => {
            let ring = symbol_ring(rect.center(), *symbol, 3.5);
            fill_ring(surface, &ring, Paint::solid(fill.dimmed(dim)));
            stroke_path(surface, &ring, true, Stroke::new(stroke.dimmed(dim), 0.75), &[]);
        }
    }
}
