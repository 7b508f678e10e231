//! Error types for labeled dataset operations.

use rasterx_common::CommonError;
use thiserror::Error;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Error types for grid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Bounding box ordering violated
    #[error(transparent)]
    InvalidBoundingBox(#[from] CommonError),

    /// A dimension has no coordinate
    #[error("Missing coordinate for dimension '{0}'")]
    MissingCoordinate(String),

    /// Array shape disagrees with its coordinates
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Dimension not present in the dataset
    #[error("Unknown dimension '{0}'")]
    UnknownDimension(String),

    /// Two inputs disagree on a non-missing value
    #[error("Conflicting values for variable '{variable}' while merging")]
    MergeConflict { variable: String },

    /// Spatial dimensions were not identified and not set
    #[error("Spatial dimensions are not set; call set_spatial_dims(x, y)")]
    SpatialDimsUnset,

    /// Cell size needs at least two coordinate samples
    #[error("Dimension '{dim}' has {len} sample(s); at least 2 are needed for its cell size")]
    DegenerateAxis { dim: String, len: usize },
}
