/*!
# MapSketch Print Renderer

Renders a [`LayerStore`](mapsketch_core::LayerStore) onto a single printable
page: projected and scan-filled geometry, area labels, a sidebar with title,
north arrow, scale readout and legend, and a footer with the print time.

Pipeline (leaves first): [`projection`] → [`rasterize`] → [`label`] →
[`legend`] / [`scale`] / [`grid`] → [`report`]. Output goes through the
[`surface::Surface`] trait, implemented for PDF, SVG, PNG and a JSON
recording of draw calls.
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod grid;
pub mod label;
pub mod legend;
pub mod projection;
pub mod rasterize;
pub mod report;
pub mod scale;
pub mod surface;

pub use error::{RenderError, RenderResult};
pub use label::{EstimatedMetrics, LabelRules, TextMeasure};
pub use legend::{LegendEntry, LegendOptions};
pub use projection::Projection;
pub use report::{render_report, suggested_filename, Report, ReportRequest, ReportSummary};
pub use surface::{CanvasPoint, CanvasRect, Surface};

/// A4 landscape in points
pub const A4_LANDSCAPE: (f64, f64) = (842.0, 595.0);

/// Artifact kinds a report can be rendered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Svg,
    Png,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected pdf, svg, png or json)")),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page_width: f64,
    pub page_height: f64,
    /// Map area on the page
    pub canvas: CanvasRect,
    pub sidebar_x: f64,
    pub sidebar_width: f64,
    pub show_grid: bool,
    pub show_labels: bool,
    pub show_compass: bool,
    pub show_footer: bool,
    pub document_title: String,
    pub font_family: String,
    /// PNG pixels per page point
    pub png_scale: f64,
    pub labels: LabelRules,
    pub metrics: EstimatedMetrics,
    pub legend: LegendOptions,
    pub provenance_comment: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width: A4_LANDSCAPE.0,
            page_height: A4_LANDSCAPE.1,
            canvas: CanvasRect::new(50.0, 80.0, 500.0, 450.0),
            sidebar_x: 570.0,
            sidebar_width: 242.0,
            show_grid: true,
            show_labels: true,
            show_compass: true,
            show_footer: true,
            document_title: "MapSketch Report".to_string(),
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            png_scale: 2.0,
            labels: LabelRules::default(),
            metrics: EstimatedMetrics::default(),
            legend: LegendOptions::default(),
            provenance_comment: None,
        }
    }
}

/// Version information for the MapSketch renderer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
