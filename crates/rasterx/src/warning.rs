//! Non-fatal conditions reported alongside a read result.

use std::fmt;

use serde::Serialize;
use tracing::warn;

/// Something the caller should know about, but that did not stop the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadWarning {
    /// No file matched a tile's glob pattern; the tile was skipped
    TileNotFound { pattern: String },
    /// A container held several rasters and all of them were loaded
    AmbiguousContainer { path: String, members: Vec<String> },
}

impl ReadWarning {
    /// Log through `tracing` and hand the warning back.
    pub(crate) fn emit(self) -> Self {
        match &self {
            ReadWarning::TileNotFound { pattern } => {
                warn!(pattern = %pattern, "Tile not found");
            }
            ReadWarning::AmbiguousContainer { path, members } => {
                warn!(path = %path, members = members.len(), "Container holds more than one raster");
            }
        }
        self
    }
}

impl fmt::Display for ReadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadWarning::TileNotFound { pattern } => {
                write!(f, "Unable to find file {}", pattern)
            }
            ReadWarning::AmbiguousContainer { path, members } => write!(
                f,
                "Found more than one raster in {}: [{}]. Try providing a pattern to refine the selection",
                path,
                members.join(", ")
            ),
        }
    }
}
