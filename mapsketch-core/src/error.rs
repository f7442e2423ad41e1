use thiserror::Error;

/// Errors raised while building or loading layers
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),
    #[error("Duplicate layer id: {0}")]
    DuplicateLayer(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LayerResult<T> = Result<T, LayerError>;
