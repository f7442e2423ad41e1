//! Layer document and GeoJSON loading
//!
//! Two input shapes are accepted:
//!
//! - a layer document `{ "layers": [ { "id", "name", "style", "label", ..., "features": <GeoJSON> } ] }`
//! - bare GeoJSON (FeatureCollection, Feature or Geometry), loaded as one
//!   layer with default style
//!
//! GeoJSON is walked as a `serde_json::Value`. `MultiPolygon` members become
//! separate polygon features and unknown geometry types are kept as
//! [`Geometry::Unsupported`] so the renderer can skip them.

use std::fs;
use std::path::Path;

use geo::{Coord, LineString, MultiLineString, Point, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{LayerError, LayerResult};
use crate::model::{Feature, Geometry, LabelSettings, Layer, Style};
use crate::store::LayerStore;

#[derive(Debug, Deserialize)]
struct LayerDocument {
    layers: Vec<LayerEntry>,
}

#[derive(Debug, Deserialize)]
struct LayerEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    style: Style,
    #[serde(default)]
    label: LabelSettings,
    #[serde(default = "default_true")]
    include_in_total: bool,
    #[serde(default)]
    area_override_ha: Option<f64>,
    #[serde(default)]
    features: Value,
}

fn default_true() -> bool {
    true
}

/// Read a layer document or bare GeoJSON file into a store.
///
/// Bare GeoJSON becomes a single layer named after the file stem.
pub fn load_layer_document<P: AsRef<Path>>(path: P) -> LayerResult<LayerStore> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("layer");
    let store = parse_layer_document(&text, stem)?;
    log::info!("Loaded {} layer(s) from {}", store.len(), path.display());
    Ok(store)
}

/// Parse layer document text; `fallback_name` names a bare GeoJSON layer.
pub fn parse_layer_document(text: &str, fallback_name: &str) -> LayerResult<LayerStore> {
    let value: Value = serde_json::from_str(text)?;

    if value.get("layers").is_some() {
        let doc: LayerDocument = serde_json::from_value(value)?;
        let mut store = LayerStore::new();
        for entry in doc.layers {
            let features = if entry.features.is_null() {
                Vec::new()
            } else {
                parse_geojson(&entry.features)?
            };
            let layer = Layer {
                name: entry.name.unwrap_or_else(|| entry.id.clone()),
                id: entry.id,
                visible: entry.visible,
                features,
                style: entry.style,
                label: entry.label,
                include_in_total: entry.include_in_total,
                area_override_ha: entry.area_override_ha,
            };
            store.try_insert(layer)?;
        }
        return Ok(store);
    }

    let features = parse_geojson(&value)?;
    let mut store = LayerStore::new();
    store.insert(Layer::new(fallback_name, fallback_name).with_features(features));
    Ok(store)
}

/// Parse any GeoJSON object into features
pub fn parse_geojson(value: &Value) -> LayerResult<Vec<Feature>> {
    let kind = type_of(value)?;
    match kind {
        "FeatureCollection" => {
            let items = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid("FeatureCollection without a 'features' array"))?;
            let mut out = Vec::new();
            for item in items {
                out.extend(parse_feature(item)?);
            }
            Ok(out)
        }
        "Feature" => parse_feature(value),
        _ => Ok(parse_geometry(value)?.into_iter().map(Feature::new).collect()),
    }
}

fn parse_feature(value: &Value) -> LayerResult<Vec<Feature>> {
    if type_of(value)? != "Feature" {
        return Err(invalid("expected a Feature inside FeatureCollection"));
    }
    let properties = match value.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(g) => g,
    };
    Ok(parse_geometry(geometry)?
        .into_iter()
        .map(|g| Feature::new(g).with_properties(properties.clone()))
        .collect())
}

/// Parse a GeoJSON geometry object. A MultiPolygon yields one polygon per
/// member; every other type yields exactly one geometry.
pub fn parse_geometry(value: &Value) -> LayerResult<Vec<Geometry>> {
    let kind = type_of(value)?;
    let coords = || {
        value
            .get("coordinates")
            .ok_or_else(|| invalid(format!("{kind} without coordinates")))
    };

    let geometry = match kind {
        "Point" => Geometry::Point(Point::from(position(coords()?)?)),
        "LineString" => Geometry::LineString(line(coords()?)?),
        "Polygon" => Geometry::Polygon(polygon(coords()?)?),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString::new(
            array(coords()?)?.iter().map(line).collect::<LayerResult<Vec<_>>>()?,
        )),
        "MultiPolygon" => {
            return array(coords()?)?
                .iter()
                .map(|p| polygon(p).map(Geometry::Polygon))
                .collect();
        }
        other => Geometry::Unsupported(other.to_string()),
    };
    Ok(vec![geometry])
}

fn type_of(value: &Value) -> LayerResult<&str> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("object without a string 'type' member"))
}

fn array(value: &Value) -> LayerResult<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| invalid("coordinates must be an array"))
}

fn position(value: &Value) -> LayerResult<Coord<f64>> {
    let items = array(value)?;
    let num = |i: usize| {
        items
            .get(i)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(format!("position needs numeric x and y, got {value}")))
    };
    Ok(Coord { x: num(0)?, y: num(1)? })
}

fn line(value: &Value) -> LayerResult<LineString<f64>> {
    let coords = array(value)?
        .iter()
        .map(position)
        .collect::<LayerResult<Vec<_>>>()?;
    Ok(LineString::new(coords))
}

fn polygon(value: &Value) -> LayerResult<Polygon<f64>> {
    let mut rings = array(value)?
        .iter()
        .map(line)
        .collect::<LayerResult<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

fn invalid(msg: impl Into<String>) -> LayerError {
    LayerError::InvalidGeoJson(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SQUARE: &str = r#"{
        "type": "Feature",
        "properties": {"name": "plot"},
        "geometry": {"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[1,0],[0,0]]]}
    }"#;

    #[test]
    fn test_bare_feature_is_one_layer() {
        let store = parse_layer_document(SQUARE, "field").unwrap();
        assert_eq!(store.len(), 1);
        let layer = store.get("field").unwrap();
        assert_eq!(layer.name, "field");
        assert_eq!(layer.features.len(), 1);
        assert!(layer.features[0].geometry().is_polygon());
        assert_eq!(layer.features[0].properties["name"], "plot");
    }

    #[test]
    fn test_multipolygon_is_split() {
        let json = r#"{"type": "MultiPolygon", "coordinates": [
            [[[0,0],[1,0],[1,1],[0,0]]],
            [[[5,5],[6,5],[6,6],[5,5]]]
        ]}"#;
        let store = parse_layer_document(json, "mp").unwrap();
        let layer = store.get("mp").unwrap();
        assert_eq!(layer.polygons().count(), 2);
    }

    #[test]
    fn test_closed_linestring_loads_as_polygon() {
        let json = r#"{"type": "LineString", "coordinates": [[0,0],[1,0],[1,1],[0,0]]}"#;
        let features = parse_geojson(&serde_json::from_str(json).unwrap()).unwrap();
        assert!(features[0].geometry().is_polygon());
    }

    #[test]
    fn test_unsupported_geometry_kept_as_marker() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": null, "geometry": {"type": "MultiPoint", "coordinates": [[0,0]]}},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]}"#;
        let features = parse_geojson(&serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(*features[0].geometry(), Geometry::Unsupported("MultiPoint".into()));
    }

    #[test]
    fn test_layer_document() {
        let json = r##"{"layers": [
            {"id": "a", "name": "Block A", "include_in_total": false,
             "style": {"fill_color": "#00ff00", "dash": [3, 2]},
             "label": {"text": "A", "size": 12},
             "features": {"type": "FeatureCollection", "features": []}},
            {"id": "b", "area_override_ha": 2.5, "visible": false}
        ]}"##;
        let store = parse_layer_document(json, "ignored").unwrap();
        let names: Vec<_> = store.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Block A", "b"]);
        let a = store.get("a").unwrap();
        assert!(!a.include_in_total);
        assert_eq!(a.style.dash, vec![3.0, 2.0]);
        assert_eq!(a.label.size, 12.0);
        assert!(a.label.visible);
        let b = store.get("b").unwrap();
        assert_eq!(b.area_override_ha, Some(2.5));
        assert!(!b.visible);
        assert!(b.features.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"layers": [{"id": "a"}, {"id": "a"}]}"#;
        let err = parse_layer_document(json, "x").unwrap_err();
        assert!(matches!(err, LayerError::DuplicateLayer(_)));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(parse_layer_document("{", "x"), Err(LayerError::Json(_))));
        assert!(matches!(
            parse_layer_document(r#"{"type": "Point", "coordinates": ["a", 1]}"#, "x"),
            Err(LayerError::InvalidGeoJson(_))
        ));
        assert!(matches!(
            parse_layer_document(r#"{"layers": [{"id": "a", "style": {"fill_color": "red"}}]}"#, "x"),
            Err(LayerError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file_uses_stem() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        write!(file, "{}", SQUARE).unwrap();
        let store = load_layer_document(file.path()).unwrap();
        let stem = file.path().file_stem().unwrap().to_str().unwrap().to_string();
        assert!(store.get(&stem).is_some());
    }
}
