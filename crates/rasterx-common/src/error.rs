//! Error types shared by the rasterx crates.

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Validation errors for boxes, templates and tile specifications.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommonError {
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("Invalid extent '{0}'. Expected 'x1,x2,y1,y2'")]
    InvalidExtent(String),

    #[error("Invalid tile template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("Invalid tile size: {0}")]
    InvalidTileSize(String),
}

impl CommonError {
    /// Create an InvalidTemplate error.
    pub fn invalid_template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            message: message.into(),
        }
    }
}
