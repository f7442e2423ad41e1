//! Render command implementation - export a map report to PDF/SVG/PNG/JSON

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use mapsketch_render::{render_report, OutputFormat, ReportRequest};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::CliError;
use crate::RenderFormat;

/// Arguments of `mapsketch render` after clap parsing
#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub layers: PathBuf,
    pub out: PathBuf,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub format: Option<RenderFormat>,
    pub no_grid: bool,
    pub no_labels: bool,
}

impl From<RenderFormat> for OutputFormat {
    fn from(format: RenderFormat) -> Self {
        match format {
            RenderFormat::Pdf => OutputFormat::Pdf,
            RenderFormat::Svg => OutputFormat::Svg,
            RenderFormat::Png => OutputFormat::Png,
            RenderFormat::Json => OutputFormat::Json,
        }
    }
}

/// Render the report and return the path it was written to
pub fn execute(config: &Config, args: RenderArgs, printed_at: NaiveDateTime) -> Result<PathBuf> {
    log::info!("Starting map rendering");
    log::info!("Layer document: {}", args.layers.display());

    let store = super::load_layers(&args.layers)?;

    let format = resolve_format(config, args.format, &args.out)?;
    log::info!("Output format: {}", format);

    let mut export = config.to_export_config();
    if args.no_grid {
        export.show_grid = false;
    }
    if args.no_labels {
        export.show_labels = false;
    }
    if config.general.provenance {
        export.provenance_comment = Some(build_provenance_comment(&args.layers, store.len(), printed_at));
    }

    let title = args.title.unwrap_or_else(|| config.general.title.clone());
    let request = ReportRequest::new(format, printed_at).with_title(title, args.subtitle.unwrap_or_default());

    let report = render_report(&store, &request, &export).map_err(CliError::from)?;

    let target = if args.out.is_dir() {
        args.out.join(&report.filename)
    } else {
        args.out
    };
    std::fs::write(&target, &report.bytes)
        .with_context(|| format!("Failed to write report: {}", target.display()))?;

    let summary = &report.summary;
    if summary.features_skipped > 0 {
        log::warn!("{} features with unsupported geometry were not drawn", summary.features_skipped);
    }
    log::info!(
        "Labels placed: {}, skipped: {}",
        summary.labels_placed,
        summary.labels_skipped
    );
    log::info!("Output written to: {}", target.display());

    Ok(target)
}

/// `--format`, then a recognized output extension, then `[general] format`
fn resolve_format(config: &Config, flag: Option<RenderFormat>, out: &Path) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return Ok(format.into());
    }
    if out.is_dir() {
        return Ok(config.default_format());
    }
    match out.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.parse::<OutputFormat>().map_err(|e| CliError::invalid_format(e).into()),
        None => Ok(config.default_format()),
    }
}

fn build_provenance_comment(layers: &Path, layer_count: usize, printed_at: NaiveDateTime) -> String {
    format!(
        "MapSketch provenance\n \
         tool: mapsketch v{version}\n \
         layers: {layers} ({count} layers)\n \
         printed: {printed}",
        version = env!("CARGO_PKG_VERSION"),
        layers = layers.display(),
        count = layer_count,
        printed = printed_at.format("%Y-%m-%d %H:%M"),
    )
}
