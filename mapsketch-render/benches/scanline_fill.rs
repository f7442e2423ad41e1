use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mapsketch_render::rasterize::{scan_fill, scan_spans};
use mapsketch_render::surface::{CanvasPoint, Paint, RecordingSurface};
use mapsketch_core::Rgb;

fn star_ring(points: usize, outer: f64, inner: f64) -> Vec<CanvasPoint> {
    (0..points * 2)
        .map(|k| {
            let r = if k % 2 == 0 { outer } else { inner };
            let a = k as f64 * std::f64::consts::PI / points as f64;
            CanvasPoint::new(300.0 + r * a.cos(), 305.0 + r * a.sin())
        })
        .collect()
}

fn bench_scan_spans(c: &mut Criterion) {
    let small = star_ring(5, 60.0, 25.0);
    let large = star_ring(200, 220.0, 180.0);

    c.bench_function("scan_spans_star_5", |b| {
        b.iter(|| black_box(scan_spans(black_box(&small))))
    });

    c.bench_function("scan_spans_star_200", |b| {
        b.iter(|| black_box(scan_spans(black_box(&large))))
    });
}

fn bench_scan_fill_recording(c: &mut Criterion) {
    let ring = star_ring(50, 200.0, 150.0);
    let paint = Paint::with_opacity(Rgb::new(0x33, 0x88, 0xff), 0.2);

    c.bench_function("scan_fill_recording_star_50", |b| {
        b.iter(|| {
            let mut surface = RecordingSurface::new(842.0, 595.0);
            scan_fill(&mut surface, black_box(&ring), paint);
            black_box(surface.ops().len())
        })
    });
}

criterion_group!(benches, bench_scan_spans, bench_scan_fill_recording);
criterion_main!(benches);
