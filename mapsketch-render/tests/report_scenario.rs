use chrono::NaiveDate;
use geo::polygon;
use mapsketch_core::measure::polygon_area_m2;
use mapsketch_core::model::{Geometry, Layer};
use mapsketch_core::{LayerStore, M2_PER_HECTARE};
use mapsketch_render::report::{draw_report, ReportRequest};
use mapsketch_render::surface::{DrawOp, RecordingSurface};
use mapsketch_render::{render_report, ExportConfig, OutputFormat};

fn small_square_store() -> (LayerStore, f64) {
    // 0.001 degree square centered at (101.4, 0.5)
    let h = 0.0005;
    let square = polygon![
        (x: 101.4 - h, y: 0.5 - h),
        (x: 101.4 + h, y: 0.5 - h),
        (x: 101.4 + h, y: 0.5 + h),
        (x: 101.4 - h, y: 0.5 + h),
    ];
    let expected_ha = polygon_area_m2(&square) / M2_PER_HECTARE;
    let mut layer = Layer::new("block-a", "Block A");
    layer.include_in_total = true;
    layer.push(Geometry::Polygon(square));
    let mut store = LayerStore::new();
    store.insert(layer);
    (store, expected_ha)
}

fn request(format: OutputFormat) -> ReportRequest {
    let printed_at = NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp");
    ReportRequest::new(format, printed_at).with_title("Estate", "Block A")
}

#[test]
fn single_square_end_to_end() {
    let (store, expected_ha) = small_square_store();
    let config = ExportConfig::default();
    assert_eq!(config.canvas.width, 500.0);
    assert_eq!(config.canvas.height, 450.0);
    assert_eq!((config.canvas.x, config.canvas.y), (50.0, 80.0));

    let mut surface = RecordingSurface::new(config.page_width, config.page_height);
    let summary = draw_report(&mut surface, &store, &request(OutputFormat::Json), &config).expect("render");

    assert_eq!(summary.legend.len(), 1);
    assert_eq!(summary.legend[0].name, "Block A");
    assert!((summary.total_area_ha - expected_ha).abs() / expected_ha < 0.01);

    let total_text = surface
        .texts()
        .find(|t| t.starts_with("TOTAL AREA:"))
        .expect("total area text");
    let shown: f64 = total_text
        .trim_start_matches("TOTAL AREA:")
        .trim()
        .trim_end_matches("ha")
        .trim()
        .parse()
        .expect("numeric total");
    assert!((shown - expected_ha).abs() / expected_ha < 0.01, "{shown} vs {expected_ha}");

    // The square is large on the page, so its area label is placed
    assert_eq!(summary.labels_placed, 1);
    assert_eq!(summary.labels_skipped, 0);
}

#[test]
fn square_fill_stays_inside_canvas() {
    let (store, _) = small_square_store();
    let config = ExportConfig { show_grid: false, ..ExportConfig::default() };
    let mut surface = RecordingSurface::new(config.page_width, config.page_height);
    draw_report(&mut surface, &store, &request(OutputFormat::Json), &config).expect("render");

    let canvas = config.canvas;
    let fill_rows = surface
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect { rect, paint } if paint.opacity < 1.0 && paint.opacity > 0.1 && rect.height == 1.0 => Some(rect),
            _ => None,
        })
        .collect::<Vec<_>>();
    // The square spans 90% of the canvas height: roughly 405 scan rows
    assert!(fill_rows.len() >= 400 && fill_rows.len() <= 410, "{} rows", fill_rows.len());
    for r in fill_rows {
        assert!(r.x >= canvas.x && r.right() <= canvas.right());
        assert!(r.y >= canvas.y && r.top() <= canvas.top());
    }
}

#[test]
fn json_recording_round_trips_through_serde() {
    let (store, _) = small_square_store();
    let report = render_report(&store, &request(OutputFormat::Json), &ExportConfig::default()).expect("render");
    assert_eq!(report.filename, "Estate_Block_A.json");
    let value: serde_json::Value = serde_json::from_slice(&report.bytes).expect("valid json");
    let ops: Vec<DrawOp> = serde_json::from_value(value["ops"].clone()).expect("draw ops");
    assert!(!ops.is_empty());
}

#[test]
fn png_output_has_signature() {
    let (store, _) = small_square_store();
    let config = ExportConfig { png_scale: 1.0, ..ExportConfig::default() };
    let report = render_report(&store, &request(OutputFormat::Png), &config).expect("render");
    assert_eq!(&report.bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(report.filename, "Estate_Block_A.png");
}
