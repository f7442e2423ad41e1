//! Error handling for the MapSketch CLI

use mapsketch_core::LayerError;
use mapsketch_render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for MapSketch CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Layer document error in {file}: {message}")]
    Layers { file: String, message: String },

    #[error("Nothing to render: {message}")]
    NothingToRender { message: String },

    #[error("Rendering error: {message}")]
    Rendering { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat { message: message.into() }
    }

    pub fn layers<F: Into<String>, S: Into<String>>(file: F, message: S) -> Self {
        Self::Layers {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn rendering<S: Into<String>>(message: S) -> Self {
        Self::Rendering { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(format!("TOML serialization error: {}", err))
    }
}

impl From<RenderError> for CliError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NoRenderableData => Self::NothingToRender {
                message: "no visible layer has more than a single point of geometry".to_string(),
            },
            RenderError::Io(e) => Self::io(e.to_string()),
            other => Self::rendering(other.to_string()),
        }
    }
}

impl CliError {
    /// Attach the layer document path to a loader error
    pub fn from_layer_error(file: &std::path::Path, err: LayerError) -> Self {
        match err {
            LayerError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::file_not_found(file.to_path_buf())
            }
            other => Self::layers(file.display().to_string(), other.to_string()),
        }
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::InvalidFormat { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use --format with one of: pdf, svg, png, json\n\
                 • Or give --out a file name ending in one of those extensions",
            );
        }

        CliError::Layers { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • The file must be a layer document ({\"layers\": [...]}) or plain GeoJSON\n\
                 • Layer ids must be unique within a document\n\
                 • Colors are written as #RRGGBB",
            );
        }

        CliError::NothingToRender { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check that at least one layer has \"visible\": true\n\
                 • A single point cannot be framed; add more geometry",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your mapsketch.toml configuration file\n\
                 • Use 'mapsketch config --example' to generate a sample configuration",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("plots.geojson"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io { .. }));
    }

    #[test]
    fn test_no_renderable_data_maps_to_nothing_to_render() {
        let err: CliError = RenderError::NoRenderableData.into();
        assert!(matches!(err, CliError::NothingToRender { .. }));
        assert!(format_error_with_suggestions(&err).contains("visible"));
    }

    #[test]
    fn test_missing_layer_file_is_file_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = CliError::from_layer_error(std::path::Path::new("a.json"), LayerError::Io(io_err));
        assert!(matches!(err, CliError::FileNotFound { .. }));

        let err = CliError::from_layer_error(
            std::path::Path::new("a.json"),
            LayerError::DuplicateLayer("x".into()),
        );
        assert!(matches!(err, CliError::Layers { .. }));
    }
}
