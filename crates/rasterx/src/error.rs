//! Error types for reading rasters into datasets.

use rasterx_common::CommonError;
use rasterx_grid::GridError;
use rasterx_io::RasterIoError;
use thiserror::Error;

/// Result type for read operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// Error types for read operations.
#[derive(Error, Debug)]
pub enum ReadError {
    /// A directory was given without a bounding box to select tiles
    #[error("`{0}` is a directory. Indicate `extent=(x1, x2, y1, y2)` to select tiles")]
    MissingExtent(String),

    /// Nothing to load
    #[error("No tiles to load: {0}")]
    NoTiles(String),

    /// A rendered tile pattern is not a valid glob
    #[error("Invalid tile pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A native dataset reader failed
    #[error("Native reader error: {0}")]
    Native(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Io(#[from] RasterIoError),

    #[error(transparent)]
    Grid(#[from] GridError),
}
