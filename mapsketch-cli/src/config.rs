//! Configuration handling for the MapSketch CLI
//!
//! Supports loading configuration from mapsketch.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use mapsketch_render::{CanvasRect, EstimatedMetrics, ExportConfig, LabelRules, LegendOptions, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "mapsketch.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub legend: LegendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Format used when neither --format nor the output extension decides
    #[serde(default = "default_format")]
    pub format: String,

    /// Title used when --title is not given
    #[serde(default)]
    pub title: String,

    /// Write a provenance comment into SVG output
    #[serde(default = "default_true")]
    pub provenance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page size in points
    #[serde(default = "default_page_width")]
    pub width: f64,
    #[serde(default = "default_page_height")]
    pub height: f64,

    /// Map canvas, bottom-left origin
    #[serde(default = "default_canvas_x")]
    pub canvas_x: f64,
    #[serde(default = "default_canvas_y")]
    pub canvas_y: f64,
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,

    #[serde(default = "default_sidebar_x")]
    pub sidebar_x: f64,
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_compass: bool,
    #[serde(default = "default_true")]
    pub show_footer: bool,

    /// Font family written into SVG output
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// PDF document title
    #[serde(default = "default_document_title")]
    pub document_title: String,

    /// PNG pixels per page point
    #[serde(default = "default_png_scale")]
    pub png_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default = "default_min_polygon_px")]
    pub min_polygon_px: f64,
    #[serde(default = "default_max_fill_ratio")]
    pub max_fill_ratio: f64,
    #[serde(default = "default_label_padding")]
    pub padding: f64,
    #[serde(default = "default_background_opacity")]
    pub background_opacity: f64,

    /// Text width estimate per character, relative to the font size
    #[serde(default = "default_width_factor")]
    pub width_factor: f64,
    #[serde(default = "default_height_factor")]
    pub height_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendConfig {
    /// More entries than this switch the legend to two columns
    #[serde(default = "default_column_threshold")]
    pub column_threshold: usize,
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_text_size")]
    pub text_size: f64,
    #[serde(default = "default_name_chars_single")]
    pub name_chars_single: usize,
    #[serde(default = "default_name_chars_double")]
    pub name_chars_double: usize,
}

// Default value functions
fn default_format() -> String { "pdf".to_string() }
fn default_true() -> bool { true }
fn default_page_width() -> f64 { ExportConfig::default().page_width }
fn default_page_height() -> f64 { ExportConfig::default().page_height }
fn default_canvas_x() -> f64 { ExportConfig::default().canvas.x }
fn default_canvas_y() -> f64 { ExportConfig::default().canvas.y }
fn default_canvas_width() -> f64 { ExportConfig::default().canvas.width }
fn default_canvas_height() -> f64 { ExportConfig::default().canvas.height }
fn default_sidebar_x() -> f64 { ExportConfig::default().sidebar_x }
fn default_sidebar_width() -> f64 { ExportConfig::default().sidebar_width }
fn default_font_family() -> String { ExportConfig::default().font_family }
fn default_document_title() -> String { ExportConfig::default().document_title }
fn default_png_scale() -> f64 { ExportConfig::default().png_scale }
fn default_min_polygon_px() -> f64 { LabelRules::default().min_polygon_px }
fn default_max_fill_ratio() -> f64 { LabelRules::default().max_fill_ratio }
fn default_label_padding() -> f64 { LabelRules::default().padding }
fn default_background_opacity() -> f64 { LabelRules::default().background_opacity }
fn default_width_factor() -> f64 { EstimatedMetrics::default().width_factor }
fn default_height_factor() -> f64 { EstimatedMetrics::default().height_factor }
fn default_column_threshold() -> usize { LegendOptions::default().column_threshold }
fn default_row_height() -> f64 { LegendOptions::default().row_height }
fn default_text_size() -> f64 { LegendOptions::default().text_size }
fn default_name_chars_single() -> usize { LegendOptions::default().name_chars_single }
fn default_name_chars_double() -> usize { LegendOptions::default().name_chars_double }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            title: String::new(),
            provenance: true,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: default_page_width(),
            height: default_page_height(),
            canvas_x: default_canvas_x(),
            canvas_y: default_canvas_y(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            sidebar_x: default_sidebar_x(),
            sidebar_width: default_sidebar_width(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_compass: true,
            show_footer: true,
            font_family: default_font_family(),
            document_title: default_document_title(),
            png_scale: default_png_scale(),
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            show: true,
            min_polygon_px: default_min_polygon_px(),
            max_fill_ratio: default_max_fill_ratio(),
            padding: default_label_padding(),
            background_opacity: default_background_opacity(),
            width_factor: default_width_factor(),
            height_factor: default_height_factor(),
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            column_threshold: default_column_threshold(),
            row_height: default_row_height(),
            text_size: default_text_size(),
            name_chars_single: default_name_chars_single(),
            name_chars_double: default_name_chars_double(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }

    /// Configured fallback format; an unknown name falls back to PDF
    pub fn default_format(&self) -> OutputFormat {
        match self.general.format.parse() {
            Ok(format) => format,
            Err(e) => {
                log::warn!("Ignoring [general] format: {}", e);
                OutputFormat::default()
            }
        }
    }

    /// Renderer settings; out-of-range values are replaced by defaults
    pub fn to_export_config(&self) -> ExportConfig {
        let defaults = ExportConfig::default();
        let page = &self.page;

        let (page_width, page_height) = if page.width > 0.0 && page.height > 0.0 {
            (page.width, page.height)
        } else {
            log::warn!("Ignoring non-positive page size {}x{}", page.width, page.height);
            (defaults.page_width, defaults.page_height)
        };

        let canvas = if page.canvas_width > 0.0 && page.canvas_height > 0.0 {
            CanvasRect::new(page.canvas_x, page.canvas_y, page.canvas_width, page.canvas_height)
        } else {
            log::warn!(
                "Ignoring non-positive canvas size {}x{}",
                page.canvas_width,
                page.canvas_height
            );
            defaults.canvas
        };

        let png_scale = if self.render.png_scale.is_finite() && self.render.png_scale > 0.0 {
            self.render.png_scale
        } else {
            log::warn!("Ignoring png_scale {}", self.render.png_scale);
            defaults.png_scale
        };

        ExportConfig {
            page_width,
            page_height,
            canvas,
            sidebar_x: page.sidebar_x,
            sidebar_width: page.sidebar_width,
            show_grid: self.render.show_grid,
            show_labels: self.labels.show,
            show_compass: self.render.show_compass,
            show_footer: self.render.show_footer,
            document_title: self.render.document_title.clone(),
            font_family: self.render.font_family.clone(),
            png_scale,
            labels: LabelRules {
                min_polygon_px: self.labels.min_polygon_px,
                max_fill_ratio: self.labels.max_fill_ratio,
                padding: self.labels.padding,
                background_opacity: self.labels.background_opacity,
            },
            metrics: EstimatedMetrics {
                width_factor: self.labels.width_factor,
                height_factor: self.labels.height_factor,
            },
            legend: LegendOptions {
                column_threshold: self.legend.column_threshold,
                row_height: self.legend.row_height,
                text_size: self.legend.text_size,
                name_chars_single: self.legend.name_chars_single,
                name_chars_double: self.legend.name_chars_double,
            },
            provenance_comment: None,
        }
    }
}
