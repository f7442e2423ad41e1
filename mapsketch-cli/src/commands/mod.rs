//! Command implementations for the MapSketch CLI

pub mod render;
pub mod summary;

use crate::error::CliError;
use anyhow::Result;
use mapsketch_core::{load_layer_document, LayerStore};
use std::path::Path;

/// Read a layer document, reporting a missing file as [`CliError::FileNotFound`]
pub fn load_layers(path: &Path) -> Result<LayerStore> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    load_layer_document(path).map_err(|e| CliError::from_layer_error(path, e).into())
}
