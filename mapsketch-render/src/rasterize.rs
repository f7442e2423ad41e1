//! Scan-line polygon fill and dashed stroking on canvas coordinates.
//!
//! Fill covers the outer ring only; holes are not cut out.

use mapsketch_core::model::PointSymbol;

use crate::surface::{CanvasPoint, CanvasRect, Paint, Stroke, Surface};

/// One horizontal run of a scan-filled ring, one canvas unit tall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub y: f64,
    pub x0: f64,
    pub x1: f64,
}

/// Sorted x positions where the horizontal line at `y` crosses the ring.
///
/// Edges count as crossed on the half-open interval `lower.y <= y < upper.y`,
/// so a vertex shared by two edges is counted once and horizontal edges never
/// count. The closing edge (last vertex back to the first) is included.
pub fn scanline_intersections(ring: &[CanvasPoint], y: f64) -> Vec<f64> {
    let n = ring.len();
    let mut xs = Vec::new();
    if n < 2 {
        return xs;
    }
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let (lo, hi) = if a.y <= b.y { (a, b) } else { (b, a) };
        if lo.y == hi.y {
            continue;
        }
        if y >= lo.y && y < hi.y {
            let t = (y - lo.y) / (hi.y - lo.y);
            xs.push(lo.x + t * (hi.x - lo.x));
        }
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Even-odd spans for a ring, sampled at the middle of each unit row
pub fn scan_spans(ring: &[CanvasPoint]) -> Vec<Span> {
    let mut spans = Vec::new();
    if ring.len() < 3 {
        return spans;
    }
    let (min_y, max_y) = ring
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    if !min_y.is_finite() || !max_y.is_finite() {
        return spans;
    }

    let mut row = min_y.floor();
    while row < max_y {
        let xs = scanline_intersections(ring, row + 0.5);
        for pair in xs.chunks_exact(2) {
            if pair[1] > pair[0] {
                spans.push(Span { y: row, x0: pair[0], x1: pair[1] });
            }
        }
        row += 1.0;
    }
    spans
}

/// Fill a ring by emitting one filled rectangle per span
pub fn scan_fill<S: Surface + ?Sized>(surface: &mut S, ring: &[CanvasPoint], paint: Paint) {
    for span in scan_spans(ring) {
        surface.fill_rect(CanvasRect::new(span.x0, span.y, span.x1 - span.x0, 1.0), paint);
    }
}

/// Fill through the surface's native polygon path when it has one
pub fn fill_ring<S: Surface + ?Sized>(surface: &mut S, ring: &[CanvasPoint], paint: Paint) {
    if ring.len() < 3 || paint.opacity <= 0.0 {
        return;
    }
    if surface.supports_polygon_fill() {
        surface.fill_polygon(ring, paint);
    } else {
        scan_fill(surface, ring, paint);
    }
}

/// Shortest non-zero dash or gap, in canvas units
pub const MIN_DASH_LENGTH: f64 = 0.1;

/// Usable dash pattern, or `None` for a solid line.
///
/// Non-finite or negative lengths count as zero; an all-zero pattern is
/// solid. Positive lengths shorter than [`MIN_DASH_LENGTH`] are raised to it.
/// Odd-length patterns are repeated once to pair draws with gaps.
pub fn normalize_dash(pattern: &[f64]) -> Option<Vec<f64>> {
    let mut cleaned: Vec<f64> = pattern
        .iter()
        .map(|v| if v.is_finite() && *v > 0.0 { v.max(MIN_DASH_LENGTH) } else { 0.0 })
        .collect();
    if cleaned.iter().all(|v| *v <= 0.0) {
        return None;
    }
    if cleaned.len() % 2 == 1 {
        cleaned.extend_from_within(..);
    }
    Some(cleaned)
}

/// Drawn pieces of the edge `from -> to` under a dash pattern.
///
/// The pattern starts fresh at `from`; the last piece is clipped at `to`.
pub fn dash_segments(from: CanvasPoint, to: CanvasPoint, pattern: &[f64]) -> Vec<(CanvasPoint, CanvasPoint)> {
    let len = from.distance(to);
    if !(len > 0.0) || !len.is_finite() {
        return Vec::new();
    }
    let pattern = match normalize_dash(pattern) {
        Some(p) => p,
        None => return vec![(from, to)],
    };

    let at = |d: f64| {
        let t = d / len;
        CanvasPoint::new(from.x + t * (to.x - from.x), from.y + t * (to.y - from.y))
    };

    let mut out = Vec::new();
    let mut pos = 0.0;
    let mut i = 0usize;
    while pos < len {
        let step = pattern[i % pattern.len()];
        let end = (pos + step).min(len);
        if step > 0.0 && end <= pos {
            // step lost to rounding at this magnitude
            break;
        }
        if i % 2 == 0 && end > pos {
            out.push((at(pos), at(end)));
        }
        pos = end;
        i += 1;
    }
    out
}

/// Stroke a polyline, or a ring when `closed`, edge by edge
pub fn stroke_path<S: Surface + ?Sized>(
    surface: &mut S,
    points: &[CanvasPoint],
    closed: bool,
    stroke: Stroke,
    dash: &[f64],
) {
    let n = points.len();
    if n < 2 || !(stroke.width > 0.0) {
        return;
    }
    let edges = if closed { n } else { n - 1 };
    for i in 0..edges {
        let a = points[i];
        let b = points[(i + 1) % n];
        for (from, to) in dash_segments(a, b, dash) {
            surface.line(from, to, stroke);
        }
    }
}

/// Vertex ring of a point marker centered on `center`
pub fn symbol_ring(center: CanvasPoint, symbol: PointSymbol, radius: f64) -> Vec<CanvasPoint> {
    match symbol {
        PointSymbol::Circle => (0..16)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / 16.0;
                CanvasPoint::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            })
            .collect(),
        PointSymbol::Square => vec![
            CanvasPoint::new(center.x - radius, center.y - radius),
            CanvasPoint::new(center.x + radius, center.y - radius),
            CanvasPoint::new(center.x + radius, center.y + radius),
            CanvasPoint::new(center.x - radius, center.y + radius),
        ],
        PointSymbol::Triangle => vec![
            CanvasPoint::new(center.x, center.y + radius),
            CanvasPoint::new(center.x + radius * 0.866, center.y - radius * 0.5),
            CanvasPoint::new(center.x - radius * 0.866, center.y - radius * 0.5),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use crate::surface::DrawOp;
    use mapsketch_core::Rgb;
    use proptest::prelude::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<CanvasPoint> {
        coords.iter().map(|&(x, y)| CanvasPoint::new(x, y)).collect()
    }

    fn drawn_length(segments: &[(CanvasPoint, CanvasPoint)]) -> f64 {
        segments.iter().map(|(a, b)| a.distance(*b)).sum()
    }

    #[test]
    fn test_unit_square_two_crossings() {
        let ring = pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(scanline_intersections(&ring, 0.5), vec![0.0, 1.0]);
        assert_eq!(scanline_intersections(&ring, 0.0).len(), 2);
        assert!(scanline_intersections(&ring, 1.0).is_empty());
    }

    #[test]
    fn test_shared_vertex_counted_once() {
        // Diamond: the scanline through the left and right tips touches vertices
        let ring = pts(&[(0.0, 5.0), (5.0, 0.0), (10.0, 5.0), (5.0, 10.0)]);
        let xs = scanline_intersections(&ring, 5.0);
        assert_eq!(xs, vec![0.0, 10.0]);
    }

    #[test]
    fn test_scan_spans_cover_rectangle() {
        let ring = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 4.0), (0.0, 4.0)]);
        let spans = scan_spans(&ring);
        assert_eq!(spans.len(), 4);
        for (i, s) in spans.iter().enumerate() {
            assert_eq!(s.y, i as f64);
            assert_eq!((s.x0, s.x1), (0.0, 10.0));
        }
    }

    #[test]
    fn test_concave_ring_gets_two_spans_per_row() {
        // U shape opening upward
        let ring = pts(&[
            (0.0, 0.0), (9.0, 0.0), (9.0, 9.0), (6.0, 9.0),
            (6.0, 3.0), (3.0, 3.0), (3.0, 9.0), (0.0, 9.0),
        ]);
        let upper: Vec<_> = scan_spans(&ring).into_iter().filter(|s| s.y == 5.0).collect();
        assert_eq!(upper.len(), 2);
        assert_eq!((upper[0].x0, upper[0].x1), (0.0, 3.0));
        assert_eq!((upper[1].x0, upper[1].x1), (6.0, 9.0));
    }

    #[test]
    fn test_dash_ten_units_three_two() {
        let segs = dash_segments(CanvasPoint::new(0.0, 0.0), CanvasPoint::new(10.0, 0.0), &[3.0, 2.0]);
        assert_eq!(segs.len(), 2);
        assert!((drawn_length(&segs) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_dash_clipped_at_edge_end() {
        let segs = dash_segments(CanvasPoint::new(0.0, 0.0), CanvasPoint::new(0.0, 7.0), &[3.0, 2.0]);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].1, CanvasPoint::new(0.0, 7.0));
        assert!((drawn_length(&segs) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_dash_is_solid() {
        let a = CanvasPoint::new(0.0, 0.0);
        let b = CanvasPoint::new(4.0, 3.0);
        assert_eq!(dash_segments(a, b, &[]), vec![(a, b)]);
        assert_eq!(dash_segments(a, b, &[0.0, -1.0]), vec![(a, b)]);
        assert_eq!(dash_segments(a, b, &[f64::NAN]), vec![(a, b)]);
        assert!(dash_segments(a, a, &[1.0, 1.0]).is_empty());
        assert_eq!(normalize_dash(&[2.0]), Some(vec![2.0, 2.0]));
    }

    #[test]
    fn test_tiny_dash_lengths_are_bounded() {
        assert_eq!(normalize_dash(&[1e-5, 0.0]), Some(vec![MIN_DASH_LENGTH, 0.0]));

        let from = CanvasPoint::new(0.0, 0.0);
        let to = CanvasPoint::new(400.0, 0.0);
        let segs = dash_segments(from, to, &[1e-5, 1e-5]);
        assert!((2000..=2001).contains(&segs.len()));
        assert!((drawn_length(&segs) - 200.0).abs() < 1e-3);

        let segs = dash_segments(from, to, &[1e-300, 1e-300]);
        assert!(segs.len() <= 2001);
    }

    #[test]
    fn test_stroke_path_skips_zero_length_and_short_rings() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let stroke = Stroke::new(Rgb::BLACK, 1.0);
        stroke_path(&mut surface, &pts(&[(1.0, 1.0)]), true, stroke, &[]);
        assert!(surface.ops().is_empty());

        // Closed ring with explicit closing vertex: the closing edge is zero length
        let ring = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        stroke_path(&mut surface, &ring, true, stroke, &[]);
        let lines = surface.ops().iter().filter(|op| matches!(op, DrawOp::Line { .. })).count();
        assert_eq!(lines, 3);
    }

    #[test]
    fn test_fill_ring_skips_transparent() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let ring = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        fill_ring(&mut surface, &ring, Paint::with_opacity(Rgb::BLACK, 0.0));
        assert!(surface.ops().is_empty());
        fill_ring(&mut surface, &ring, Paint::with_opacity(Rgb::BLACK, 0.5));
        assert_eq!(surface.ops().len(), 10);
    }

    #[test]
    fn test_symbol_rings() {
        let c = CanvasPoint::new(5.0, 5.0);
        assert_eq!(symbol_ring(c, PointSymbol::Circle, 3.0).len(), 16);
        assert_eq!(symbol_ring(c, PointSymbol::Square, 3.0).len(), 4);
        assert_eq!(symbol_ring(c, PointSymbol::Triangle, 3.0).len(), 3);
    }

    fn star_ring() -> impl Strategy<Value = Vec<CanvasPoint>> {
        proptest::collection::vec(1.0f64..50.0, 3..24).prop_map(|radii| {
            let n = radii.len();
            radii
                .iter()
                .enumerate()
                .map(|(k, r)| {
                    let a = k as f64 * std::f64::consts::TAU / n as f64;
                    CanvasPoint::new(100.0 + r * a.cos(), 100.0 + r * a.sin())
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_simple_ring_crossings_are_even(ring in star_ring(), y in 40.0f64..160.0) {
            prop_assert_eq!(scanline_intersections(&ring, y).len() % 2, 0);
        }

        #[test]
        fn prop_dash_never_overshoots(
            len in 0.1f64..500.0,
            on in 0.1f64..20.0,
            off in 0.0f64..20.0,
        ) {
            let from = CanvasPoint::new(0.0, 0.0);
            let to = CanvasPoint::new(len, 0.0);
            let segs = dash_segments(from, to, &[on, off]);
            for (a, b) in &segs {
                prop_assert!(a.x >= 0.0 && b.x <= len + 1e-9);
                prop_assert!(b.x >= a.x);
            }
            prop_assert!(drawn_length(&segs) <= len + 1e-9);
        }
    }
}
