//! Error types for tracemap.
//!
//! Every failure in this crate is fatal for the current run: a missing file, a code
//! absent from the location table or a degenerate arrow all abort rendering with one
//! of the variants below.

use thiserror::Error;

/// The main error type for tracemap operations.
#[derive(Error, Debug)]
pub enum TracemapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (GeoJSON or config file) errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// A country code or column that the run depends on is missing
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Malformed input records or geometries
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Arrow endpoints for which no angle can be computed
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Image generation errors
    #[error("Image generation error: {message}")]
    ImageGeneration { message: String },
}

/// Convenience type alias for Results with TracemapError
pub type Result<T> = std::result::Result<T, TracemapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TracemapError::DataNotFound {
            message: "Country code not found in location table: XX".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not found: Country code not found in location table: XX"
        );

        let err = TracemapError::InvalidParameter {
            param: "colormap".to_string(),
            message: "Unknown colormap: foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter: colormap - Unknown colormap: foo"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TracemapError = io.into();
        assert!(matches!(err, TracemapError::Io(_)));
    }
}
