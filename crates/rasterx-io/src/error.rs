//! Error types for raster discovery and decoding.

use thiserror::Error;

/// Result type for raster I/O operations.
pub type RasterIoResult<T> = Result<T, RasterIoError>;

/// Error types for raster I/O.
#[derive(Error, Debug)]
pub enum RasterIoError {
    /// No raster could be found directly or inside a container
    #[error("Could not find raster file in {path}. Collected messages: [{}]", .diagnostics.join("; "))]
    RasterNotFound {
        path: String,
        diagnostics: Vec<String>,
    },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container could not be read
    #[error("Archive error: {0}")]
    Archive(String),

    /// Raster payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// No driver recognised the file
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Malformed `/vsizip/` or `/vsitar/` locator
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// Info rendering failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tiff::TiffError> for RasterIoError {
    fn from(e: tiff::TiffError) -> Self {
        RasterIoError::Decode(format!("TIFF: {}", e))
    }
}

impl From<zip::result::ZipError> for RasterIoError {
    fn from(e: zip::result::ZipError) -> Self {
        RasterIoError::Archive(format!("zip: {}", e))
    }
}

impl RasterIoError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
