use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to render: no visible layer has a non-degenerate extent")]
    NoRenderableData,
    #[error("PDF error: {message}")]
    Pdf { message: String },
    #[error("Image error: {message}")]
    Image { message: String },
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn pdf<S: Into<String>>(message: S) -> Self {
        Self::Pdf { message: message.into() }
    }

    pub fn image<S: Into<String>>(message: S) -> Self {
        Self::Image { message: message.into() }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
