//! Geometry measurement backed by the `geo` crate
//!
//! Areas use the Chamberlain–Duquette spherical approximation and distances
//! use Haversine, both on geographic (lng, lat) degrees.

use geo::{
    BoundingRect, Centroid, ChamberlainDuquetteArea, Coord, Distance, Haversine, LineString, Point,
    Polygon, Rect,
};

use crate::model::{Geometry, Layer};

pub const M2_PER_HECTARE: f64 = 10_000.0;

/// Unsigned spherical area of a polygon in square metres (holes subtracted)
pub fn polygon_area_m2(polygon: &Polygon<f64>) -> f64 {
    polygon.chamberlain_duquette_unsigned_area()
}

pub fn polygon_area_ha(polygon: &Polygon<f64>) -> f64 {
    polygon_area_m2(polygon) / M2_PER_HECTARE
}

pub fn polygon_centroid(polygon: &Polygon<f64>) -> Option<Point<f64>> {
    polygon.centroid()
}

/// Sum of the layer's polygon areas in hectares, ignoring any override
pub fn geometry_area_ha(layer: &Layer) -> f64 {
    layer.polygons().map(polygon_area_ha).sum()
}

/// The layer's area in hectares: the manual override when set, else the
/// geometry-derived area.
pub fn layer_area_ha(layer: &Layer) -> f64 {
    match layer.area_override_ha {
        Some(ha) if ha.is_finite() => ha,
        _ => geometry_area_ha(layer),
    }
}

/// Total over visible layers flagged as included in the total
pub fn aggregate_area_ha<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> f64 {
    layers
        .into_iter()
        .filter(|l| l.visible && l.include_in_total)
        .map(layer_area_ha)
        .sum()
}

pub fn great_circle_distance_m(a: Point<f64>, b: Point<f64>) -> f64 {
    Haversine.distance(a, b)
}

pub fn line_length_m(line: &LineString<f64>) -> f64 {
    line.0
        .windows(2)
        .map(|w| great_circle_distance_m(Point::from(w[0]), Point::from(w[1])))
        .sum()
}

/// Total great-circle length of the layer's open lines in metres
pub fn layer_length_m(layer: &Layer) -> f64 {
    layer.lines().map(line_length_m).sum()
}

pub fn geometry_bounds(geometry: &Geometry) -> Option<Rect<f64>> {
    match geometry {
        Geometry::Point(p) => Some(p.bounding_rect()),
        Geometry::LineString(ls) => ls.bounding_rect(),
        Geometry::Polygon(poly) => poly.bounding_rect(),
        Geometry::MultiLineString(mls) => mls.bounding_rect(),
        Geometry::Unsupported(_) => None,
    }
}

/// Bounding box of every feature of the visible layers
pub fn collection_bounds<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Option<Rect<f64>> {
    layers
        .into_iter()
        .filter(|l| l.visible)
        .flat_map(|l| l.features.iter())
        .filter_map(|f| geometry_bounds(f.geometry()))
        .reduce(|acc, r| {
            Rect::new(
                Coord {
                    x: acc.min().x.min(r.min().x),
                    y: acc.min().y.min(r.min().y),
                },
                Coord {
                    x: acc.max().x.max(r.max().x),
                    y: acc.max().y.max(r.max().y),
                },
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geometry;
    use geo::{line_string, polygon};
    use proptest::prelude::*;

    fn square(cx: f64, cy: f64, side: f64) -> Polygon<f64> {
        let h = side / 2.0;
        polygon![
            (x: cx - h, y: cy - h),
            (x: cx + h, y: cy - h),
            (x: cx + h, y: cy + h),
            (x: cx - h, y: cy + h),
        ]
    }

    fn layer_with_override(id: &str, ha: f64, included: bool) -> Layer {
        let mut layer = Layer::new(id, id);
        layer.area_override_ha = Some(ha);
        layer.include_in_total = included;
        layer
    }

    #[test]
    fn test_small_square_area_near_equator() {
        // 0.001 degree is roughly 111 m at the equator
        let ha = polygon_area_ha(&square(101.4, 0.5, 0.001));
        assert!((ha - 1.23).abs() < 0.02, "got {ha}");
    }

    #[test]
    fn test_override_supersedes_geometry() {
        let mut layer = Layer::new("p", "Plot");
        layer.push(Geometry::Polygon(square(101.4, 0.5, 0.001)));
        assert!(layer_area_ha(&layer) > 1.0);
        layer.area_override_ha = Some(7.5);
        assert_eq!(layer_area_ha(&layer), 7.5);
        assert!(geometry_area_ha(&layer) > 1.0);
    }

    #[test]
    fn test_aggregate_skips_excluded() {
        let layers = vec![
            layer_with_override("a", 1.0, true),
            layer_with_override("b", 2.0, false),
            layer_with_override("c", 3.0, true),
        ];
        assert!((aggregate_area_ha(&layers) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_skips_hidden() {
        let mut hidden = layer_with_override("h", 5.0, true);
        hidden.visible = false;
        let layers = vec![layer_with_override("a", 1.0, true), hidden];
        assert!((aggregate_area_ha(&layers) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_line_length() {
        // One degree of longitude on the equator is about 111.2 km
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)];
        let m = line_length_m(&line);
        assert!((m - 111_195.0).abs() < 100.0, "got {m}");
    }

    #[test]
    fn test_collection_bounds_union() {
        let mut a = Layer::new("a", "A");
        a.push(Geometry::Point(Point::new(1.0, 2.0)));
        let mut b = Layer::new("b", "B");
        b.push(Geometry::Polygon(square(5.0, 5.0, 2.0)));
        b.push(Geometry::Unsupported("MultiPoint".into()));
        let layers = vec![a, b];
        let r = collection_bounds(&layers).unwrap();
        assert_eq!(r.min(), Coord { x: 1.0, y: 2.0 });
        assert_eq!(r.max(), Coord { x: 6.0, y: 6.0 });
    }

    #[test]
    fn test_collection_bounds_empty() {
        let layers: Vec<Layer> = vec![Layer::new("e", "Empty")];
        assert!(collection_bounds(&layers).is_none());
    }

    proptest! {
        #[test]
        fn prop_aggregate_is_order_independent(
            areas in proptest::collection::vec((0.0f64..1000.0, any::<bool>()), 0..12)
        ) {
            let layers: Vec<Layer> = areas
                .iter()
                .enumerate()
                .map(|(i, (ha, inc))| layer_with_override(&i.to_string(), *ha, *inc))
                .collect();
            let mut reversed = layers.clone();
            reversed.reverse();
            let expected: f64 = areas.iter().filter(|(_, inc)| *inc).map(|(ha, _)| ha).sum();
            prop_assert!((aggregate_area_ha(&layers) - expected).abs() < 1e-6);
            prop_assert!((aggregate_area_ha(&reversed) - expected).abs() < 1e-6);
        }
    }
}
