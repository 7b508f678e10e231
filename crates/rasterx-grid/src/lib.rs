//! Labeled raster datasets for rasterx.
//!
//! - [`Dataset`]: ordered variables over shared 1-d coordinates
//! - [`Dataset::sel_range`] / [`Dataset::reindex`]: label-based selection
//! - [`merge`]: outer-join merge with "no conflicts" value semantics
//! - [`SpatialDataset`]: extent and trim/pad on the spatial dimensions

pub mod attrs;
pub mod dataset;
pub mod error;
pub mod merge;
pub mod select;
pub mod spatial;

pub use attrs::{AttrValue, Attrs, FILL_VALUE};
pub use dataset::{Coordinate, Dataset, Variable};
pub use error::{GridError, GridResult};
pub use merge::merge;
pub use spatial::{identify_spatial_dims, SpatialDataset, SpatialDims, TrimOptions};
