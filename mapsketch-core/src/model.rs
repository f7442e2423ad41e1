//! Layer data model
//!
//! A [`Layer`] is a named, styled collection of [`Feature`]s. Geometry is held
//! as `geo` types so area, centroid and distance come straight from the
//! geometry crate.

use geo::{Coord, LineString, MultiLineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::Rgb;

/// Tolerance in degrees for treating a LineString as closed
pub const CLOSED_RING_EPSILON: f64 = 1e-6;

/// Geometry variants the renderer understands
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    LineString(LineString<f64>),
    /// First ring is the outer boundary; interior rings are holes
    Polygon(Polygon<f64>),
    MultiLineString(MultiLineString<f64>),
    /// Anything else the loader met, kept by its GeoJSON type name
    Unsupported(String),
}

impl Geometry {
    /// Reclassify a closed LineString as a Polygon.
    ///
    /// A LineString with at least two coordinates whose first and last
    /// positions agree within [`CLOSED_RING_EPSILON`] on both axes becomes a
    /// single-ring polygon. Everything else is returned unchanged.
    pub fn classify(self) -> Geometry {
        match self {
            Geometry::LineString(ls) if is_closed_within(&ls, CLOSED_RING_EPSILON) => {
                Geometry::Polygon(Polygon::new(ls, Vec::new()))
            }
            other => other,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Unsupported(kind) => kind.as_str(),
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Geometry::Polygon(_))
    }

    pub fn is_lineal(&self) -> bool {
        matches!(self, Geometry::LineString(_) | Geometry::MultiLineString(_))
    }

    /// Every coordinate of the geometry, exterior rings and holes included
    pub fn coords(&self) -> Box<dyn Iterator<Item = Coord<f64>> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p.0)),
            Geometry::LineString(ls) => Box::new(ls.0.iter().copied()),
            Geometry::Polygon(poly) => Box::new(
                poly.exterior()
                    .0
                    .iter()
                    .chain(poly.interiors().iter().flat_map(|r| r.0.iter()))
                    .copied(),
            ),
            Geometry::MultiLineString(mls) => Box::new(mls.0.iter().flat_map(|ls| ls.0.iter()).copied()),
            Geometry::Unsupported(_) => Box::new(std::iter::empty()),
        }
    }
}

fn is_closed_within(ls: &LineString<f64>, eps: f64) -> bool {
    if ls.0.len() < 2 {
        return false;
    }
    let first = ls.0[0];
    let last = ls.0[ls.0.len() - 1];
    (first.x - last.x).abs() <= eps && (first.y - last.y).abs() <= eps
}

/// One geometry plus its GeoJSON properties.
///
/// The geometry is only reachable through [`Feature::new`], so every feature
/// the renderer sees has been through [`Geometry::classify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Build a feature; closed LineStrings are reclassified on the way in.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry: geometry.classify(),
            properties: Map::new(),
        }
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

/// Marker drawn for point features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSymbol {
    #[default]
    Circle,
    Square,
    Triangle,
}

/// Stroke and fill styling for a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub stroke_color: Rgb,
    pub stroke_width: f64,
    pub fill_color: Rgb,
    pub fill_opacity: f64,
    /// Alternating drawn/gap lengths in page units; empty means solid
    pub dash: Vec<f64>,
    pub point_symbol: PointSymbol,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: Rgb::new(0x33, 0x88, 0xff),
            stroke_width: 2.0,
            fill_color: Rgb::new(0x33, 0x88, 0xff),
            fill_opacity: 0.2,
            dash: Vec::new(),
            point_symbol: PointSymbol::Circle,
        }
    }
}

/// Area label settings for the polygons of a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub visible: bool,
    /// Label text; empty means "this polygon's area in hectares"
    pub text: String,
    pub color: Rgb,
    pub size: f64,
    /// Planar offset from the centroid in degrees (lng, lat)
    pub offset: [f64; 2],
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            visible: true,
            text: String::new(),
            color: Rgb::BLACK,
            size: 9.0,
            offset: [0.0, 0.0],
        }
    }
}

/// What a layer mostly holds, for legend swatches and readouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Polygonal,
    Lineal,
    Punctal,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub features: Vec<Feature>,
    pub style: Style,
    pub label: LabelSettings,
    pub include_in_total: bool,
    /// Manually entered area in hectares; supersedes the geometry area
    pub area_override_ha: Option<f64>,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            features: Vec::new(),
            style: Style::default(),
            label: LabelSettings::default(),
            include_in_total: true,
            area_override_ha: None,
        }
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn push(&mut self, geometry: Geometry) {
        self.features.push(Feature::new(geometry));
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon<f64>> {
        self.features.iter().filter_map(|f| match f.geometry() {
            Geometry::Polygon(p) => Some(p),
            _ => None,
        })
    }

    /// Open lines, with MultiLineString members flattened
    pub fn lines(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.features.iter().flat_map(feature_lines)
    }

    pub fn points(&self) -> impl Iterator<Item = &Point<f64>> {
        self.features.iter().filter_map(|f| match f.geometry() {
            Geometry::Point(p) => Some(p),
            _ => None,
        })
    }

    pub fn kind(&self) -> LayerKind {
        if self.polygons().next().is_some() {
            LayerKind::Polygonal
        } else if self.lines().next().is_some() {
            LayerKind::Lineal
        } else if self.points().next().is_some() {
            LayerKind::Punctal
        } else {
            LayerKind::Empty
        }
    }
}

fn feature_lines(feature: &Feature) -> Box<dyn Iterator<Item = &LineString<f64>> + '_> {
    match feature.geometry() {
        Geometry::LineString(ls) => Box::new(std::iter::once(ls)),
        Geometry::MultiLineString(mls) => Box::new(mls.0.iter()),
        _ => Box::new(std::iter::empty()),
    }
}
