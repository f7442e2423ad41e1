//! MapSketch Core Library
//!
//! Layer model, ordered layer store, geometry measurement and GeoJSON layer
//! loading for the MapSketch print renderer.

pub mod color;
pub mod error;
pub mod geojson;
pub mod measure;
pub mod model;
pub mod store;

// Re-export commonly used types and functions
pub use color::Rgb;
pub use error::{LayerError, LayerResult};
pub use geojson::{load_layer_document, parse_layer_document};
pub use measure::{aggregate_area_ha, layer_area_ha, layer_length_m, M2_PER_HECTARE};
pub use model::{Feature, Geometry, LabelSettings, Layer, PointSymbol, Style};
pub use store::LayerStore;

/// Version information for the MapSketch core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
