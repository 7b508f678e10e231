//! Raster discovery for rasterx.
//!
//! - [`archive`]: list raster candidates inside zip/tar containers
//! - [`vsi`]: `/vsizip/` and `/vsitar/` locators and in-memory reads
//! - [`driver`]: GeoTIFF and SRTM `.hgt` decoders behind [`RasterDriver`]
//! - [`locator`]: probe a path directly, then as a container

pub mod archive;
pub mod driver;
pub mod error;
pub mod info;
pub mod locator;
pub mod vsi;

pub use archive::{list_members, ContainerKind};
pub use driver::{DriverRegistry, ProbeOutcome, Raster, RasterDriver};
pub use error::{RasterIoError, RasterIoResult};
pub use info::{InfoFormat, RasterInfo};
pub use locator::{get_info, probe, RasterLocator};
pub use vsi::{read_source, VirtualPath};
