//! Common types shared across the rasterx crates.

pub mod bbox;
pub mod error;
pub mod tile;

pub use bbox::BoundingBox;
pub use error::{CommonError, CommonResult};
pub use tile::{
    normalize_longitude, Hemisphere, TemplateRegistry, TileCoord, TileSize, TileSpec,
    TileTemplate,
};
